/// Construction-time errors.
///
/// A running tick never fails: blocked moves, missing sprites and an absent
/// inventory are all silent no-ops. These types only cover building a level
/// or loading settings from bad input.

use std::path::PathBuf;

/// A map that cannot become a `TileGrid`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown map glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// An entity placed where the grid does not allow it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("spawn position ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("spawn position ({x}, {y}) is a wall")]
    Blocked { x: i32, y: i32 },

    #[error("no free tile left to place {what}")]
    NoFreeTile { what: &'static str },
}

/// `config.toml` could not be used. Always recovered from by falling back
/// to defaults; surfaced only as a log warning.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
