/// Tile types and the level grid.
/// The grid is built once per level and only read during play; every actor
/// asks it the same question through `is_walkable`.

use crate::error::GridError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Walkable,
    Blocked,
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Walkable)
    }

    fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            '#' | '1' => Some(Tile::Blocked),
            '.' | ' ' | '0' => Some(Tile::Walkable),
            _ => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Walkable
    }
}

/// Rectangular grid indexed `[y][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    cells: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl TileGrid {
    /// Grid of one tile kind. Used as the base for generation.
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        TileGrid {
            cells: vec![vec![tile; width]; height],
            width,
            height,
        }
    }

    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.len()).ok_or(GridError::Empty)?;
        if width == 0 {
            return Err(GridError::Empty);
        }
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged { row: y, expected: width, found: row.len() });
            }
        }
        let height = rows.len();
        Ok(TileGrid { cells: rows, width, height })
    }

    /// Parse an ASCII map: `#` (or `1`) is a wall, `.`/space (or `0`) is floor.
    pub fn parse(lines: &[&str]) -> Result<Self, GridError> {
        let mut rows = Vec::with_capacity(lines.len());
        for (y, line) in lines.iter().enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (x, ch) in line.chars().enumerate() {
                let tile = Tile::from_glyph(ch)
                    .ok_or(GridError::UnknownGlyph { glyph: ch, x, y })?;
                row.push(tile);
            }
            rows.push(row);
        }
        TileGrid::from_rows(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// Out-of-bounds cells count as not walkable.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Tile::is_walkable)
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if y < self.height && x < self.width {
            self.cells[y][x] = tile;
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().flatten().filter(|t| t.is_walkable()).count()
    }
}
