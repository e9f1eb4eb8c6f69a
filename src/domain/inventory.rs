/// Inventory contract and the default slot-based store.
/// The simulation only ever calls `try_consume` and `add`; `count` feeds the HUD.

use super::entity::{ItemCategory, ItemKind};

pub trait Inventory {
    /// Remove one of `kind`. False if none are held.
    fn try_consume(&mut self, kind: ItemKind) -> bool;

    /// Store `qty` of `kind`. False if there is no room.
    fn add(&mut self, kind: ItemKind, qty: u32) -> bool;

    fn count(&self, kind: ItemKind) -> u32;
}

pub const SLOT_COUNT: usize = 24;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Slot {
    pub kind: ItemKind,
    pub qty: u32,
}

/// Fixed number of slots. Potions stack into one slot per kind; every
/// other item takes a slot of its own.
#[derive(Clone, Debug)]
pub struct SlotInventory {
    slots: Vec<Option<Slot>>,
}

impl SlotInventory {
    pub fn new() -> Self {
        SlotInventory { slots: vec![None; SLOT_COUNT] }
    }

    /// Starting kit: two of each potion.
    pub fn starter() -> Self {
        let mut inv = SlotInventory::new();
        inv.add(ItemKind::HealthPotion, 2);
        inv.add(ItemKind::ManaPotion, 2);
        inv
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[Option<Slot>] {
        &self.slots
    }
}

impl Default for SlotInventory {
    fn default() -> Self {
        SlotInventory::new()
    }
}

impl Inventory for SlotInventory {
    fn try_consume(&mut self, kind: ItemKind) -> bool {
        let Some(cell) = self.slots.iter_mut().find(|s| matches!(s, Some(slot) if slot.kind == kind)) else {
            return false;
        };
        let emptied = match cell {
            Some(slot) => {
                slot.qty -= 1;
                slot.qty == 0
            }
            None => false,
        };
        if emptied {
            *cell = None;
        }
        true
    }

    fn add(&mut self, kind: ItemKind, qty: u32) -> bool {
        if qty == 0 {
            return true;
        }
        if kind.category() == ItemCategory::Potion {
            if let Some(slot) = self.slots.iter_mut().flatten().find(|s| s.kind == kind) {
                slot.qty += qty;
                return true;
            }
            return match self.slots.iter_mut().find(|s| s.is_none()) {
                Some(empty) => {
                    *empty = Some(Slot { kind, qty });
                    true
                }
                None => false,
            };
        }

        // All or nothing: one free slot per item.
        let free = self.slots.iter().filter(|s| s.is_none()).count();
        if free < qty as usize {
            return false;
        }
        for empty in self.slots.iter_mut().filter(|s| s.is_none()).take(qty as usize) {
            *empty = Some(Slot { kind, qty: 1 });
        }
        true
    }

    fn count(&self, kind: ItemKind) -> u32 {
        self.slots.iter().flatten().filter(|s| s.kind == kind).map(|s| s.qty).sum()
    }
}
