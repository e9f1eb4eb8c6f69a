/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the world. Sprite handles are turned into glyphs
/// through the registry; anything unresolved draws as the placeholder.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cooldown::Millis;
use crate::domain::entity::{ActorKind, ItemKind, SpriteHandle};
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, World};
use crate::ui::sprites::{SpriteRegistry, CHEST_FRAMES};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the gap
    /// between rows matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each map tile takes two terminal columns so the grid reads square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const HEALTH_FG: Color = Color::Rgb { r: 255, g: 80, b: 110 };
const MANA_FG: Color = Color::Rgb { r: 110, g: 160, b: 255 };

/// Handles for the art the map itself needs, resolved once up front.
struct TileArt {
    wall: Option<SpriteHandle>,
    floor: Option<SpriteHandle>,
    chest: Vec<Option<SpriteHandle>>,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    art: TileArt,
}

impl Renderer {
    pub fn new(sprites: &mut SpriteRegistry) -> Self {
        let art = TileArt {
            wall: sprites.resolve("wall"),
            floor: sprites.resolve("floor"),
            chest: CHEST_FRAMES.iter().map(|name| sprites.resolve(name)).collect(),
        };
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            art,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World, sprites: &SpriteRegistry, message: &str, now: Millis) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.compose(world, sprites, message, now);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, world: &World, sprites: &SpriteRegistry, message: &str, now: Millis) {
        self.front.clear();
        self.compose_hud(world);
        self.compose_map(world, sprites, now);
        self.compose_footer(world, message);
        match world.phase {
            Phase::Playing => {}
            Phase::Paused => self.compose_banner(world, "PAUSED", "F1 Resume   Esc Quit", Color::Rgb { r: 255, g: 220, b: 50 }),
            Phase::Defeated => self.compose_banner(world, "YOU DIED", "R Restart   Esc Quit", Color::Rgb { r: 255, g: 60, b: 60 }),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &World) {
        let p = &w.player;
        let hud = format!(
            " ♥ {}/{}   ★ {}/{}   Health potions:{}  Mana potions:{}   Golems:{} ",
            p.health, p.max_health, p.mana, p.max_mana,
            w.inventory_count(ItemKind::HealthPotion),
            w.inventory_count(ItemKind::ManaPotion),
            w.living_enemies().count(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Recolor the two gauge icons.
        self.front.set(1, HUD_ROW, Cell::new('♥', HEALTH_FG, HUD_BG));
        if let Some(star) = hud.chars().position(|c| c == '★') {
            self.front.set(star, HUD_ROW, Cell::new('★', MANA_FG, HUD_BG));
        }
    }

    fn compose_map(&mut self, w: &World, sprites: &SpriteRegistry, now: Millis) {
        let wall = sprites.glyph(self.art.wall);
        let floor = sprites.glyph(self.art.floor);
        for gy in 0..w.grid.height() {
            for gx in 0..w.grid.width() {
                let (col, row) = (gx * CELL_W, MAP_ROW + gy);
                match w.grid.get(gx as i32, gy as i32) {
                    Some(Tile::Blocked) => {
                        self.front.set(col, row, Cell::new(wall.ch, wall.fg, Color::Reset));
                        self.front.set(col + 1, row, Cell::new(wall.ch, wall.fg, Color::Reset));
                    }
                    _ => self.front.set(col, row, Cell::new(floor.ch, floor.fg, Color::Reset)),
                }
            }
        }

        let last_art = self.art.chest.len().saturating_sub(1);
        for chest in &w.chests {
            let frame = chest.open_frame(now, w.timing.chest_frame_ms, w.timing.chest_frames).min(last_art);
            let handle = self.art.chest.get(frame).copied().flatten();
            let g = sprites.glyph(handle);
            self.put_tile(chest.pos.x, chest.pos.y, g.ch, g.fg);
        }

        for item in &w.items {
            let g = sprites.glyph(item.sprite);
            self.put_tile(item.pos.x, item.pos.y, g.ch, g.fg);
        }

        // Actors last, player on top.
        let mut actors: Vec<_> = w.actors().collect();
        actors.sort_by_key(|a| a.kind() == ActorKind::Player);
        for actor in actors {
            let body = actor.body();
            let g = sprites.glyph(body.sprite);
            self.put_tile(body.pos.x, body.pos.y, g.facing(body.facing), g.fg);
        }
    }

    fn put_tile(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        if x < 0 || y < 0 { return; }
        let (col, row) = (x as usize * CELL_W, MAP_ROW + y as usize);
        self.front.set(col, row, Cell::new(ch, fg, Color::Reset));
        self.front.set(col + 1, row, Cell::BLANK);
    }

    fn compose_footer(&mut self, w: &World, message: &str) {
        let msg_row = MAP_ROW + w.grid.height() + 1;
        if !message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {message} "), Color::Black, MSG_BG);
        }
        let help = " Move:←↑→↓/WASD  F:Attack+Pickup  G:Open  Q/E:Potion  Space/Click:Fire  F1:Pause  Esc:Quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_banner(&mut self, w: &World, title: &str, hint: &str, fg: Color) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let view_cols = w.grid.width() * CELL_W;
        let box_w = 28_usize.min(view_cols.max(1));
        let box_h = 5_usize;
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + w.grid.height().saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::Reset, dim));
            }
        }
        let centered = |s: &str| box_x + box_w.saturating_sub(s.chars().count()) / 2;
        self.front.put_str(centered(title), box_y + 1, title, fg, dim);
        self.front.put_str(centered(hint), box_y + 3, hint, Color::Rgb { r: 180, g: 180, b: 180 }, dim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::Pos;
    use crate::domain::tile::TileGrid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world(sprites: &mut SpriteRegistry) -> World {
        let grid = TileGrid::parse(&["######", "#....#", "#....#", "######"]).unwrap();
        let cfg = GameConfig::default();
        let mut w = World::new(grid, Pos::new(1, 1), &cfg, sprites.sprite_set(), StdRng::seed_from_u64(1)).unwrap();
        w.spawn_enemy("golem.basic", Pos::new(3, 2), cfg.enemy.stats(), vec![]).unwrap();
        w.add_chest(Pos::new(4, 1)).unwrap();
        w
    }

    fn frame(w: &World, sprites: &SpriteRegistry, renderer: &mut Renderer) {
        renderer.front.resize(80, 12);
        renderer.compose(w, sprites, "hello", 0);
    }

    #[test]
    fn map_and_actors_land_on_their_tiles() {
        let mut sprites = SpriteRegistry::with_defaults();
        let w = world(&mut sprites);
        let mut r = Renderer::new(&mut sprites);
        frame(&w, &sprites, &mut r);

        assert_eq!(r.front.get(0, MAP_ROW).ch, '█');
        assert_eq!(r.front.get(1, MAP_ROW).ch, '█');
        assert_eq!(r.front.get(CELL_W, MAP_ROW + 1).ch, '▶');
        assert_eq!(r.front.get(3 * CELL_W, MAP_ROW + 2).ch, 'G');
        assert_eq!(r.front.get(4 * CELL_W, MAP_ROW + 1).ch, '▣');
    }

    #[test]
    fn player_is_drawn_over_a_golem_on_the_same_tile() {
        let mut sprites = SpriteRegistry::with_defaults();
        let mut w = world(&mut sprites);
        w.enemies[0].body.pos = Pos::new(1, 1);
        let mut r = Renderer::new(&mut sprites);
        frame(&w, &sprites, &mut r);
        assert_eq!(r.front.get(CELL_W, MAP_ROW + 1).ch, '▶');
    }

    #[test]
    fn missing_art_draws_placeholder() {
        let mut sprites = SpriteRegistry::new();
        let w = world(&mut sprites);
        let mut r = Renderer::new(&mut sprites);
        frame(&w, &sprites, &mut r);
        assert_eq!(r.front.get(CELL_W, MAP_ROW + 1).ch, '?');
        assert_eq!(r.front.get(0, MAP_ROW).ch, '?');
    }

    #[test]
    fn hud_and_message_are_drawn() {
        let mut sprites = SpriteRegistry::with_defaults();
        let w = world(&mut sprites);
        let mut r = Renderer::new(&mut sprites);
        frame(&w, &sprites, &mut r);

        let row = |y: usize| (0..r.front.width).map(|x| r.front.get(x, y).ch).collect::<String>();
        assert!(row(HUD_ROW).contains("150/150"));
        assert!(row(HUD_ROW).contains("Golems:1"));
        assert!(row(MAP_ROW + 5).contains("hello"));
    }

    #[test]
    fn paused_world_shows_banner() {
        let mut sprites = SpriteRegistry::with_defaults();
        let mut w = world(&mut sprites);
        w.phase = Phase::Paused;
        let mut r = Renderer::new(&mut sprites);
        frame(&w, &sprites, &mut r);
        let text: String = r.front.cells.iter().map(|c| c.ch).collect();
        assert!(text.contains("PAUSED"));
    }
}
