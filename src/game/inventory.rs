use specs::prelude::Entity;

use super::Game;
use crate::{
    data::items::Item,
    ecs::{
        capability::Capability,
        components::{Equipment, Inventory},
    },
    error::GameError,
};

impl Game {
    pub fn inventory(&self, entity: Entity) -> Vec<(usize, Item)> {
        self.ecs
            .get::<Inventory>(entity)
            .map(|inventory| {
                inventory
                    .slots
                    .into_iter()
                    .enumerate()
                    .filter_map(|(slot, item)| item.map(|item| (slot, item)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn equipment(&self, entity: Entity) -> Equipment {
        self.ecs.get(entity).unwrap_or_default()
    }

    pub fn add_item(&mut self, entity: Entity, item: Item) -> Result<usize, Item> {
        let mut rejected = None;
        let slot = self.ecs.update(entity, |inventory: &mut Inventory| {
            match inventory.add(item.clone()) {
                Ok(slot) => Some(slot),
                Err(item) => {
                    rejected = Some(item);
                    None
                }
            }
        });
        match slot {
            Some(Some(slot)) => Ok(slot),
            _ => Err(rejected.unwrap_or(item)),
        }
    }

    pub fn remove_item(&mut self, entity: Entity, slot: usize) -> Option<Item> {
        if self.ecs.has_capability(entity, Capability::Equipper) {
            self.ecs
                .update(entity, |equipment: &mut Equipment| equipment.unequip(slot));
        }
        self.ecs
            .update(entity, |inventory: &mut Inventory| {
                inventory.slots.get_mut(slot).and_then(Option::take)
            })
            .flatten()
    }

    /// Moves items from the floor stack under the entity into its inventory.
    /// `indices` refer to the stack as it was before pickup. Returns whether
    /// every requested item was taken.
    pub fn pickup_items(&mut self, entity: Entity, indices: &[usize]) -> Result<bool, GameError> {
        let at = self.ecs.location(entity)?;
        let mut wanted = indices.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut floor = self.map.take_items_at(at.x, at.y, at.z);
        let mut added = 0;
        for index in &wanted {
            let Some(offset) = index.checked_sub(added) else {
                continue;
            };
            if offset >= floor.len() {
                continue;
            }
            let item = floor.remove(offset);
            match self.add_item(entity, item) {
                Ok(_) => added += 1,
                Err(item) => {
                    floor.insert(offset, item);
                    break;
                }
            }
        }
        self.map.set_items_at(at.x, at.y, at.z, floor);
        Ok(added == indices.len())
    }

    pub fn drop_item(&mut self, entity: Entity, slot: usize) -> Result<bool, GameError> {
        let at = self.ecs.location(entity)?;
        let Some(item) = self.remove_item(entity, slot) else {
            return Ok(false);
        };
        self.send_message(entity, format!("You drop {}.", item.describe_the(false)));
        self.map.add_item(at.x, at.y, at.z, item);
        Ok(true)
    }

    pub fn eat(&mut self, entity: Entity, slot: usize) -> bool {
        let Some(item) = self
            .ecs
            .get::<Inventory>(entity)
            .and_then(|inventory| inventory.get(slot).cloned())
        else {
            return false;
        };
        let Some(edible) = item.edible.clone() else {
            return false;
        };
        self.send_message(entity, format!("You eat {}.", item.describe_the(false)));

        let mut remaining = edible.remaining_consumptions;
        if self.ecs.has_capability(entity, Capability::FoodConsumer)
            && edible.has_remaining_consumptions()
        {
            remaining = self
                .ecs
                .update(entity, |inventory: &mut Inventory| {
                    let edible = inventory
                        .slots
                        .get_mut(slot)
                        .and_then(Option::as_mut)
                        .and_then(|item| item.edible.as_mut());
                    match edible {
                        Some(edible) => {
                            edible.remaining_consumptions -= 1;
                            edible.remaining_consumptions
                        }
                        None => 0,
                    }
                })
                .unwrap_or(0);
            self.modify_fullness(entity, edible.food_value);
        }
        if remaining <= 0 {
            self.remove_item(entity, slot);
        }
        true
    }

    pub fn wield(&mut self, entity: Entity, slot: Option<usize>) -> bool {
        match slot {
            None => {
                self.ecs
                    .update(entity, |equipment: &mut Equipment| equipment.weapon = None);
                self.send_message(entity, "You are empty handed.");
                true
            }
            Some(slot) => {
                let Some(item) = self.equippable_in(entity, slot, |item| item.is_wieldable())
                else {
                    return false;
                };
                self.ecs.update(entity, |equipment: &mut Equipment| {
                    equipment.unequip(slot);
                    equipment.weapon = Some(slot);
                });
                self.send_message(
                    entity,
                    format!("You are wielding {}.", item.describe_a(false)),
                );
                true
            }
        }
    }

    pub fn wear(&mut self, entity: Entity, slot: Option<usize>) -> bool {
        match slot {
            None => {
                self.ecs
                    .update(entity, |equipment: &mut Equipment| equipment.armor = None);
                self.send_message(entity, "You are not wearing anything.");
                true
            }
            Some(slot) => {
                let Some(item) = self.equippable_in(entity, slot, |item| item.is_wearable())
                else {
                    return false;
                };
                self.ecs.update(entity, |equipment: &mut Equipment| {
                    equipment.unequip(slot);
                    equipment.armor = Some(slot);
                });
                self.send_message(
                    entity,
                    format!("You are wearing {}.", item.describe_a(false)),
                );
                true
            }
        }
    }

    fn equippable_in(
        &self,
        entity: Entity,
        slot: usize,
        accept: impl Fn(&Item) -> bool,
    ) -> Option<Item> {
        if !self.ecs.has_capability(entity, Capability::Equipper) {
            return None;
        }
        self.ecs
            .get::<Inventory>(entity)
            .and_then(|inventory| inventory.get(slot).cloned())
            .filter(|item| accept(item))
    }
}
