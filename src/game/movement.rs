use specs::prelude::Entity;
use tracing::info;

use super::{Game, GameStatus};
use crate::{
    ecs::capability::Capability,
    error::GameError,
    map::{Location, Map, MapKind, Tile, boss_cave},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Attacked,
    Dug,
    Ascended,
    Descended,
    SwitchedMap,
    Rejected,
    Blocked,
}

impl MoveOutcome {
    pub const fn consumes_turn(self) -> bool {
        !matches!(self, MoveOutcome::Rejected | MoveOutcome::Blocked)
    }
}

impl Game {
    pub fn try_move(
        &mut self,
        entity: Entity,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<MoveOutcome, GameError> {
        let from = self.ecs.location(entity)?;
        let standing_on = self.map.get_tile(from.x, from.y, from.z);
        let to = Location::new(x, y, z);

        if z < from.z {
            if standing_on != Tile::StairsUp {
                self.send_message(entity, "You can't go up here!");
                return Ok(MoveOutcome::Rejected);
            }
            return self.change_level(entity, to, MoveOutcome::Ascended);
        }
        if z > from.z {
            if standing_on == Tile::HoleToCavern
                && self.ecs.has_capability(entity, Capability::PlayerActor)
            {
                self.switch_to_boss_cavern()?;
                return Ok(MoveOutcome::SwitchedMap);
            }
            if standing_on != Tile::StairsDown {
                self.send_message(entity, "You can't go down here!");
                return Ok(MoveOutcome::Rejected);
            }
            return self.change_level(entity, to, MoveOutcome::Descended);
        }

        if let Some(occupant) = self.map.get_entity_at(x, y, z) {
            let hostile = self.ecs.has_capability(entity, Capability::PlayerActor)
                || self.ecs.has_capability(occupant, Capability::PlayerActor);
            if occupant != entity
                && hostile
                && self.ecs.has_capability(entity, Capability::Attacker)
            {
                self.attack(entity, occupant)?;
                return Ok(MoveOutcome::Attacked);
            }
            return Ok(MoveOutcome::Blocked);
        }

        let tile = self.map.get_tile(x, y, z);
        if tile.is_walkable() {
            self.map.move_entity(&mut self.ecs, entity, to)?;
            self.notice_items(entity, to);
            return Ok(MoveOutcome::Moved);
        }
        if tile.is_diggable() {
            if !self.ecs.has_capability(entity, Capability::PlayerActor) {
                return Ok(MoveOutcome::Blocked);
            }
            self.map.dig(x, y, z);
            return Ok(MoveOutcome::Dug);
        }
        Ok(MoveOutcome::Blocked)
    }

    fn change_level(
        &mut self,
        entity: Entity,
        to: Location,
        outcome: MoveOutcome,
    ) -> Result<MoveOutcome, GameError> {
        // The stairs on the other side may be taken.
        if self
            .map
            .get_entity_at(to.x, to.y, to.z)
            .is_some_and(|other| other != entity)
        {
            return Ok(MoveOutcome::Blocked);
        }
        self.map.move_entity(&mut self.ecs, entity, to)?;
        let verb = match outcome {
            MoveOutcome::Ascended => "ascend",
            _ => "descend",
        };
        self.send_message(entity, format!("You {verb} to level {}!", to.z + 1));
        Ok(outcome)
    }

    fn notice_items(&mut self, entity: Entity, at: Location) {
        let message = match self.map.get_items_at(at.x, at.y, at.z) {
            [] => return,
            [item] => format!("You see {}.", item.describe_a(false)),
            _ => "There are several objects here.".to_string(),
        };
        self.send_message(entity, message);
    }

    pub fn player_move(&mut self, dx: i32, dy: i32, dz: i32) -> Result<MoveOutcome, GameError> {
        if self.status != GameStatus::Playing {
            return Ok(MoveOutcome::Rejected);
        }
        let at = self.ecs.location(self.player)?;
        let outcome = self.try_move(self.player, at.x + dx, at.y + dy, at.z + dz)?;
        if outcome.consumes_turn() {
            self.end_turn()?;
        }
        Ok(outcome)
    }

    pub fn end_turn(&mut self) -> Result<(), GameError> {
        if self.status == GameStatus::Playing && self.map.engine().is_locked() {
            self.unlock()?;
        }
        Ok(())
    }

    fn switch_to_boss_cavern(&mut self) -> Result<(), GameError> {
        let tiles = boss_cave::generate(
            self.config.boss_width,
            self.config.boss_height,
            &mut self.rng,
        );
        let id = self.allocate_map_id();
        let mut cavern = Map::new(id, MapKind::BossCavern, tiles);
        let template = self.entity_templates.create("giant zombie")?;
        let zombie = self.ecs.spawn(&template);
        cavern.add_entity_at_random_position(&mut self.ecs, zombie, 0, &mut self.rng)?;
        self.switch_map(cavern)
    }

    pub fn switch_map(&mut self, new_map: Map) -> Result<(), GameError> {
        let player = self.player;
        self.map.remove_entity(&mut self.ecs, player);
        self.ecs.set_location(player, Location::default());

        let old = std::mem::replace(&mut self.map, new_map);
        for (_, entity) in old.entities() {
            if entity != player {
                self.ecs.despawn(entity);
            }
        }

        let at = self
            .map
            .add_entity_at_random_position(&mut self.ecs, player, 0, &mut self.rng)?;
        info!(
            from = ?old.id(),
            to = ?self.map.id(),
            kind = self.map.kind().as_str(),
            x = at.x,
            y = at.y,
            "player switched map"
        );
        Ok(())
    }
}
