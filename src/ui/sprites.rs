/// Sprite registry: names → handles → terminal glyphs.
///
/// The simulation only carries `SpriteHandle`s. Missing art is never fatal:
/// an unknown name resolves to nothing (the renderer draws a placeholder)
/// and is logged once.

use std::collections::{HashMap, HashSet};

use crossterm::style::Color;
use tracing::warn;

use crate::domain::entity::{Facing, ItemKind, SpriteHandle, SpriteSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    /// Drawn instead of `ch` when facing left.
    pub flipped: char,
    pub fg: Color,
}

impl Glyph {
    pub const fn new(ch: char, fg: Color) -> Self {
        Glyph { ch, flipped: ch, fg }
    }

    pub const fn mirrored(ch: char, flipped: char, fg: Color) -> Self {
        Glyph { ch, flipped, fg }
    }

    pub fn facing(&self, facing: Facing) -> char {
        match facing {
            Facing::Right => self.ch,
            Facing::Left => self.flipped,
        }
    }
}

pub const PLACEHOLDER: Glyph = Glyph::new('?', Color::Magenta);

/// Chest animation frames, closed to fully open.
pub const CHEST_FRAMES: [&str; 3] = ["chest_0", "chest_1", "chest_2"];

pub struct SpriteRegistry {
    glyphs: Vec<Glyph>,
    names: HashMap<String, SpriteHandle>,
    warned: HashSet<String>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        SpriteRegistry { glyphs: Vec::new(), names: HashMap::new(), warned: HashSet::new() }
    }

    /// The built-in terminal art.
    pub fn with_defaults() -> Self {
        let mut reg = SpriteRegistry::new();
        reg.register("witch", Glyph::mirrored('▶', '◀', Color::Rgb { r: 200, g: 120, b: 255 }));
        reg.register("golem", Glyph::new('G', Color::Rgb { r: 170, g: 150, b: 120 }));
        reg.register("star", Glyph::new('*', Color::Rgb { r: 255, g: 230, b: 90 }));
        reg.register("heart", Glyph::new('♥', Color::Rgb { r: 255, g: 80, b: 110 }));
        reg.register("health_potion", Glyph::new('!', Color::Rgb { r: 255, g: 60, b: 60 }));
        reg.register("mana_potion", Glyph::new('!', Color::Rgb { r: 80, g: 140, b: 255 }));
        reg.register("hat", Glyph::new('^', Color::Rgb { r: 150, g: 90, b: 220 }));
        reg.register("corset", Glyph::new('%', Color::Rgb { r: 220, g: 120, b: 160 }));
        reg.register("dress", Glyph::new('&', Color::Rgb { r: 120, g: 200, b: 220 }));
        reg.register("wall", Glyph::new('█', Color::Rgb { r: 90, g: 90, b: 110 }));
        reg.register("floor", Glyph::new('·', Color::Rgb { r: 50, g: 50, b: 65 }));
        reg.register(CHEST_FRAMES[0], Glyph::new('▣', Color::Rgb { r: 190, g: 130, b: 60 }));
        reg.register(CHEST_FRAMES[1], Glyph::new('◫', Color::Rgb { r: 210, g: 150, b: 70 }));
        reg.register(CHEST_FRAMES[2], Glyph::new('□', Color::Rgb { r: 230, g: 180, b: 90 }));
        reg
    }

    /// Register (or replace) a named glyph.
    pub fn register(&mut self, name: &str, glyph: Glyph) -> SpriteHandle {
        if let Some(&handle) = self.names.get(name) {
            self.glyphs[handle.0 as usize] = glyph;
            return handle;
        }
        let handle = SpriteHandle(self.glyphs.len() as u32);
        self.glyphs.push(glyph);
        self.names.insert(name.to_string(), handle);
        handle
    }

    /// Handle for `name`; unknown names warn once and yield `None`.
    pub fn resolve(&mut self, name: &str) -> Option<SpriteHandle> {
        if let Some(&handle) = self.names.get(name) {
            return Some(handle);
        }
        if self.warned.insert(name.to_string()) {
            warn!(sprite = name, "missing sprite, drawing placeholder");
        }
        None
    }

    pub fn glyph(&self, handle: Option<SpriteHandle>) -> Glyph {
        handle
            .and_then(|h| self.glyphs.get(h.0 as usize))
            .copied()
            .unwrap_or(PLACEHOLDER)
    }

    /// Handles for everything the world spawns.
    pub fn sprite_set(&mut self) -> SpriteSet {
        let mut items = HashMap::new();
        for kind in ItemKind::ALL {
            if let Some(handle) = self.resolve(kind.sprite_key()) {
                items.insert(kind, handle);
            }
        }
        SpriteSet {
            player: self.resolve("witch"),
            enemy: self.resolve("golem"),
            projectile: self.resolve("star"),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_item() {
        let mut reg = SpriteRegistry::with_defaults();
        let set = reg.sprite_set();
        assert!(set.player.is_some());
        assert!(set.enemy.is_some());
        assert!(set.projectile.is_some());
        for kind in ItemKind::ALL {
            assert!(set.item(kind).is_some(), "{kind:?} has no sprite");
        }
        assert!(reg.warned.is_empty());
    }

    #[test]
    fn missing_sprite_falls_back_to_placeholder() {
        let mut reg = SpriteRegistry::new();
        assert_eq!(reg.resolve("witch"), None);
        assert_eq!(reg.glyph(None), PLACEHOLDER);
        assert_eq!(reg.resolve("witch"), None);
        assert_eq!(reg.warned.len(), 1);
        assert_eq!(reg.glyph(Some(SpriteHandle(40))), PLACEHOLDER);
    }

    #[test]
    fn re_register_keeps_handle() {
        let mut reg = SpriteRegistry::new();
        let a = reg.register("golem", Glyph::new('G', Color::Grey));
        let b = reg.register("golem", Glyph::new('g', Color::Grey));
        assert_eq!(a, b);
        assert_eq!(reg.glyph(Some(a)).ch, 'g');
    }

    #[test]
    fn mirrored_glyph_follows_facing() {
        let g = Glyph::mirrored('>', '<', Color::White);
        assert_eq!(g.facing(Facing::Right), '>');
        assert_eq!(g.facing(Facing::Left), '<');
        assert_eq!(Glyph::new('G', Color::White).facing(Facing::Left), 'G');
    }
}
