use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::debug;

use super::Game;
use crate::{
    ecs::{
        capability::Capability,
        components::{Attacker, Destructible, Equipment, Inventory},
        events::EventKind,
    },
    error::GameError,
};

/// `1 + floor(rand * max(0, attack - defense))`. Never below 1.
pub fn roll_damage(rng: &mut RandomNumberGenerator, attack: i32, defense: i32) -> i32 {
    let spread = (attack - defense).max(0);
    1 + (rng.rand::<f64>() * f64::from(spread)).floor() as i32
}

impl Game {
    fn equipment_modifiers(&self, entity: Entity) -> (i32, i32) {
        if !self.ecs.has_capability(entity, Capability::Equipper) {
            return (0, 0);
        }
        let (Some(equipment), Some(inventory)) = (
            self.ecs.get::<Equipment>(entity),
            self.ecs.get::<Inventory>(entity),
        ) else {
            return (0, 0);
        };
        [equipment.weapon, equipment.armor]
            .into_iter()
            .flatten()
            .filter_map(|slot| inventory.get(slot))
            .fold((0, 0), |(attack, defense), item| {
                (attack + item.attack_value(), defense + item.defense_value())
            })
    }

    pub fn attack_value(&self, entity: Entity) -> i32 {
        let base = self
            .ecs
            .get::<Attacker>(entity)
            .map_or(0, |attacker| attacker.attack_value);
        base + self.equipment_modifiers(entity).0
    }

    pub fn defense_value(&self, entity: Entity) -> i32 {
        let base = self
            .ecs
            .get::<Destructible>(entity)
            .map_or(0, |destructible| destructible.defense_value);
        base + self.equipment_modifiers(entity).1
    }

    pub fn attack(&mut self, attacker: Entity, target: Entity) -> Result<Option<i32>, GameError> {
        if !self.ecs.has_capability(target, Capability::Destructible) {
            return Ok(None);
        }
        let attack = self.attack_value(attacker);
        let defense = self.defense_value(target);
        let damage = roll_damage(&mut self.rng, attack, defense);

        let attacker_name = self.ecs.name(attacker);
        let target_name = self.ecs.name(target);
        self.send_message(
            attacker,
            format!("You strike the {target_name} for {damage} damage!"),
        );
        self.send_message(
            target,
            format!("The {attacker_name} strikes you for {damage} damage!"),
        );
        debug!(attacker = %attacker_name, target = %target_name, damage, "attack");

        self.take_damage(target, attacker, damage)?;
        Ok(Some(damage))
    }

    pub fn take_damage(
        &mut self,
        victim: Entity,
        attacker: Entity,
        damage: i32,
    ) -> Result<(), GameError> {
        let hp = self
            .ecs
            .update(victim, |destructible: &mut Destructible| {
                destructible.hp -= damage;
                destructible.hp
            })
            .ok_or(GameError::MissingComponent {
                entity: victim,
                component: "Destructible",
            })?;
        if hp > 0 {
            return Ok(());
        }
        let name = self.ecs.name(victim);
        self.send_message(attacker, format!("You kill the {name}!"));
        self.raise_event(victim, EventKind::Death, Some(attacker))?;
        self.raise_event(attacker, EventKind::Kill, Some(victim))?;
        self.kill(victim, None);
        Ok(())
    }
}
