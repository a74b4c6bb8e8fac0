use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, DenseVecStorage, VecStorage};

use super::{capability::CapabilitySet, events::ListenerTable};
use crate::{
    ai::Task,
    data::items::Item,
    map::{Location, MapId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub map: Option<MapId>,
}

impl Position {
    pub const fn unplaced() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            map: None,
        }
    }

    pub const fn location(&self) -> Location {
        Location::new(self.x, self.y, self.z)
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Identity {
    pub name: String,
    pub speed: u32,
    pub alive: bool,
}

impl Component for Identity {
    type Storage = VecStorage<Self>;
}

impl Component for CapabilitySet {
    type Storage = VecStorage<Self>;
}

impl Component for ListenerTable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Attacker {
    pub attack_value: i32,
}

impl Component for Attacker {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Destructible {
    pub hp: i32,
    pub max_hp: i32,
    pub defense_value: i32,
}

impl Component for Destructible {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct MessageQueue {
    pub messages: Vec<String>,
}

impl Component for MessageQueue {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Viewshed {
    pub radius: i32,
}

impl Component for Viewshed {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub slots: Vec<Option<Item>>,
}

impl Inventory {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn has_room(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    pub fn add(&mut self, item: Item) -> Result<usize, Item> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(item);
                Ok(index)
            }
            None => Err(item),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.slots.get(index).and_then(Option::as_ref)
    }
}

impl Component for Inventory {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HungerState {
    Starving,
    Hungry,
    NotHungry,
    Full,
    Oversatiated,
}

impl HungerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            HungerState::Starving => "Starving",
            HungerState::Hungry => "Hungry",
            HungerState::NotHungry => "Not Hungry",
            HungerState::Full => "Full",
            HungerState::Oversatiated => "Oversatiated",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Stomach {
    pub fullness: i32,
    pub max_fullness: i32,
    pub depletion_rate: i32,
}

impl Stomach {
    pub fn hunger_state(&self) -> HungerState {
        let per_percent = self.max_fullness as f64 / 100.0;
        let fullness = self.fullness as f64;
        if fullness <= per_percent * 5.0 {
            HungerState::Starving
        } else if fullness <= per_percent * 25.0 {
            HungerState::Hungry
        } else if fullness >= per_percent * 95.0 {
            HungerState::Oversatiated
        } else if fullness >= per_percent * 75.0 {
            HungerState::Full
        } else {
            HungerState::NotHungry
        }
    }
}

impl Component for Stomach {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct CorpseDropper {
    pub drop_rate: i32,
}

impl Component for CorpseDropper {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Equipment {
    pub weapon: Option<usize>,
    pub armor: Option<usize>,
}

impl Equipment {
    pub fn unequip(&mut self, slot: usize) {
        if self.weapon == Some(slot) {
            self.weapon = None;
        }
        if self.armor == Some(slot) {
            self.armor = None;
        }
    }

    pub fn is_equipped(&self, slot: usize) -> bool {
        self.weapon == Some(slot) || self.armor == Some(slot)
    }
}

impl Component for Equipment {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatOption {
    Attack,
    Defense,
    MaxHp,
    Sight,
}

impl StatOption {
    pub const fn label(self) -> &'static str {
        match self {
            StatOption::Attack => "Increase attack value",
            StatOption::Defense => "Increase defense value",
            StatOption::MaxHp => "Increase max health",
            StatOption::Sight => "Increase sight range",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Experience {
    pub level: u32,
    pub experience: u32,
    pub stat_points: u32,
    pub stat_points_per_level: u32,
    pub stat_options: Vec<StatOption>,
}

impl Experience {
    pub const fn next_level_experience(&self) -> u32 {
        self.level * self.level * 10
    }
}

impl Component for Experience {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl Component for TaskList {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct FungusGrowth {
    pub remaining: u32,
}

impl Component for FungusGrowth {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct ZombieState {
    pub grown_arm: bool,
}

impl Component for ZombieState {
    type Storage = DenseVecStorage<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_terminal::prelude::WHITE;

    #[test]
    fn hunger_thresholds() {
        let mut stomach = Stomach {
            fullness: 50,
            max_fullness: 1000,
            depletion_rate: 1,
        };
        assert_eq!(stomach.hunger_state(), HungerState::Starving);
        stomach.fullness = 250;
        assert_eq!(stomach.hunger_state(), HungerState::Hungry);
        stomach.fullness = 500;
        assert_eq!(stomach.hunger_state(), HungerState::NotHungry);
        stomach.fullness = 750;
        assert_eq!(stomach.hunger_state(), HungerState::Full);
        stomach.fullness = 950;
        assert_eq!(stomach.hunger_state(), HungerState::Oversatiated);
    }

    #[test]
    fn full_inventory_returns_the_item() {
        let mut inventory = Inventory::with_slots(1);
        let rock = Item::new("rock", '*', RGB::named(WHITE));
        assert_eq!(inventory.add(rock.clone()).ok(), Some(0));
        assert!(!inventory.has_room());
        let rejected = inventory.add(rock).expect_err("no room");
        assert_eq!(rejected.name, "rock");
    }

    #[test]
    fn unequipping_a_slot_clears_both_hands() {
        let mut equipment = Equipment {
            weapon: Some(2),
            armor: Some(2),
        };
        equipment.unequip(2);
        assert_eq!(equipment, Equipment::default());
    }
}
