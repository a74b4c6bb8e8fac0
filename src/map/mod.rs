pub mod boss_cave;
pub mod builder;
pub mod fov;
pub mod tile;
pub mod volume;

use std::collections::HashMap;

use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::{debug, info};

pub use self::{
    fov::LevelFov,
    tile::Tile,
    volume::{Location, TileLayer, TileVolume},
};

use crate::{
    data::items::Item,
    ecs::{
        EcsWorld,
        capability::{Capability, CapabilityGroup},
        components::Position,
    },
    engine::Engine,
    error::MapError,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MapId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapKind {
    Cave,
    BossCavern,
}

impl MapKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MapKind::Cave => "Cave",
            MapKind::BossCavern => "Boss Cavern",
        }
    }
}

pub struct Map {
    id: MapId,
    kind: MapKind,
    tiles: TileVolume,
    fov: Vec<LevelFov>,
    entities: HashMap<Location, Entity>,
    items: HashMap<Location, Vec<Item>>,
    explored: Vec<bool>,
    engine: Engine<Entity>,
    player: Option<Entity>,
}

impl Map {
    pub fn new(id: MapId, kind: MapKind, tiles: TileVolume) -> Self {
        let fov = tiles.layers().iter().map(LevelFov::from_layer).collect();
        let cells = (tiles.width() * tiles.height() * tiles.depth()).max(0) as usize;
        info!(
            ?id,
            kind = kind.as_str(),
            width = tiles.width(),
            height = tiles.height(),
            depth = tiles.depth(),
            "map created"
        );
        Self {
            id,
            kind,
            tiles,
            fov,
            entities: HashMap::new(),
            items: HashMap::new(),
            explored: vec![false; cells],
            engine: Engine::new(),
            player: None,
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    pub fn width(&self) -> i32 {
        self.tiles.width()
    }

    pub fn height(&self) -> i32 {
        self.tiles.height()
    }

    pub fn depth(&self) -> i32 {
        self.tiles.depth()
    }

    pub fn tiles(&self) -> &TileVolume {
        &self.tiles
    }

    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        self.tiles.in_bounds(x, y, z)
    }

    pub fn get_tile(&self, x: i32, y: i32, z: i32) -> Tile {
        self.tiles.get(x, y, z)
    }

    pub fn set_tile(&mut self, x: i32, y: i32, z: i32, tile: Tile) {
        self.tiles.set(x, y, z, tile);
    }

    pub fn dig(&mut self, x: i32, y: i32, z: i32) {
        if self.get_tile(x, y, z).is_diggable() {
            self.tiles.set(x, y, z, Tile::Floor);
        }
    }

    pub fn is_empty_floor(&self, x: i32, y: i32, z: i32) -> bool {
        self.get_tile(x, y, z) == Tile::Floor && self.get_entity_at(x, y, z).is_none()
    }

    /// Loops until an empty floor cell turns up.
    pub fn random_floor_position(&self, z: i32, rng: &mut RandomNumberGenerator) -> Location {
        let width = self.width().max(1);
        let height = self.height().max(1);
        loop {
            let x = rng.range(0, width);
            let y = rng.range(0, height);
            if self.is_empty_floor(x, y, z) {
                return Location::new(x, y, z);
            }
        }
    }

    fn explored_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        Some(((z * self.height() + y) * self.width() + x) as usize)
    }

    pub fn mark_explored(&mut self, x: i32, y: i32, z: i32) {
        if let Some(idx) = self.explored_index(x, y, z) {
            self.explored[idx] = true;
        }
    }

    pub fn is_explored(&self, x: i32, y: i32, z: i32) -> bool {
        self.explored_index(x, y, z)
            .and_then(|idx| self.explored.get(idx).copied())
            .unwrap_or(false)
    }

    pub fn get_fov(&self, z: i32) -> Option<&LevelFov> {
        usize::try_from(z).ok().and_then(|z| self.fov.get(z))
    }

    pub fn engine(&self) -> &Engine<Entity> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<Entity> {
        &mut self.engine
    }

    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    pub fn get_entity_at(&self, x: i32, y: i32, z: i32) -> Option<Entity> {
        self.entities.get(&Location::new(x, y, z)).copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = (Location, Entity)> + '_ {
        self.entities.iter().map(|(loc, entity)| (*loc, *entity))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn get_entities_within_radius(
        &self,
        center_x: i32,
        center_y: i32,
        center_z: i32,
        radius: i32,
    ) -> Vec<Entity> {
        let mut found: Vec<(Location, Entity)> = self
            .entities
            .iter()
            .filter(|(loc, _)| {
                loc.z == center_z
                    && (loc.x - center_x).abs() <= radius
                    && (loc.y - center_y).abs() <= radius
            })
            .map(|(loc, entity)| (*loc, *entity))
            .collect();
        found.sort_by_key(|(loc, _)| *loc);
        found.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Moves an entity's index entry from `old` (if given) to `new`.
    ///
    /// Nothing changes unless the whole move is valid.
    pub fn update_entity_position(
        &mut self,
        entity: Entity,
        old: Option<Location>,
        new: Location,
    ) -> Result<(), MapError> {
        if !self.in_bounds(new.x, new.y, new.z) {
            return Err(MapError::OutOfBounds {
                x: new.x,
                y: new.y,
                z: new.z,
            });
        }
        if let Some(present) = self.entities.get(&new) {
            if *present != entity || old != Some(new) {
                return Err(MapError::Occupied {
                    x: new.x,
                    y: new.y,
                    z: new.z,
                });
            }
        }
        if let Some(old) = old {
            if self.entities.get(&old) == Some(&entity) {
                self.entities.remove(&old);
            }
        }
        self.entities.insert(new, entity);
        Ok(())
    }

    pub fn add_entity(&mut self, ecs: &mut EcsWorld, entity: Entity) -> Result<(), MapError> {
        let at = ecs.location(entity)?;
        self.update_entity_position(entity, None, at)?;
        ecs.update(entity, |pos: &mut Position| pos.map = Some(self.id));
        if ecs.has_capability(entity, CapabilityGroup::Actor) {
            self.engine
                .scheduler_mut()
                .add(entity, ecs.speed(entity), true);
        }
        if ecs.has_capability(entity, Capability::PlayerActor) {
            self.player = Some(entity);
        }
        Ok(())
    }

    pub fn add_entity_at_random_position(
        &mut self,
        ecs: &mut EcsWorld,
        entity: Entity,
        z: i32,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Location, MapError> {
        let at = self.random_floor_position(z, rng);
        ecs.set_location(entity, at);
        self.add_entity(ecs, entity)?;
        Ok(at)
    }

    pub fn remove_entity(&mut self, ecs: &mut EcsWorld, entity: Entity) {
        if let Ok(at) = ecs.location(entity) {
            if self.entities.get(&at) == Some(&entity) {
                self.entities.remove(&at);
            }
        }
        if ecs.has_capability(entity, CapabilityGroup::Actor) {
            self.engine.scheduler_mut().remove(entity);
        }
        if self.player == Some(entity) {
            self.player = None;
        }
        ecs.update(entity, |pos: &mut Position| {
            if pos.map == Some(self.id) {
                pos.map = None;
            }
        });
    }

    pub fn move_entity(
        &mut self,
        ecs: &mut EcsWorld,
        entity: Entity,
        to: Location,
    ) -> Result<(), MapError> {
        let from = ecs.location(entity)?;
        self.update_entity_position(entity, Some(from), to)?;
        ecs.set_location(entity, to);
        Ok(())
    }

    pub fn get_items_at(&self, x: i32, y: i32, z: i32) -> &[Item] {
        self.items
            .get(&Location::new(x, y, z))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_items_at(&mut self, x: i32, y: i32, z: i32, items: Vec<Item>) {
        let at = Location::new(x, y, z);
        if items.is_empty() {
            self.items.remove(&at);
        } else {
            self.items.insert(at, items);
        }
    }

    pub fn take_items_at(&mut self, x: i32, y: i32, z: i32) -> Vec<Item> {
        self.items
            .remove(&Location::new(x, y, z))
            .unwrap_or_default()
    }

    pub fn add_item(&mut self, x: i32, y: i32, z: i32, item: Item) {
        self.items
            .entry(Location::new(x, y, z))
            .or_default()
            .push(item);
    }

    pub fn add_item_at_random_position(
        &mut self,
        item: Item,
        z: i32,
        rng: &mut RandomNumberGenerator,
    ) -> Location {
        let at = self.random_floor_position(z, rng);
        debug!(item = %item.name, x = at.x, y = at.y, z = at.z, "placed item");
        self.add_item(at.x, at.y, at.z, item);
        at
    }

    pub fn item_stacks(&self) -> impl Iterator<Item = (Location, &[Item])> + '_ {
        self.items.iter().map(|(loc, items)| (*loc, items.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{items::item_repository, monsters::entity_repository};

    fn small_map() -> Map {
        let tiles = TileVolume::parse(&[
            &["#####", "#...#", "#.#.#", "#...#", "#####"],
            &["#####", "#...#", "#...#", "#...#", "#####"],
        ]);
        Map::new(MapId(1), MapKind::Cave, tiles)
    }

    fn newt(ecs: &mut EcsWorld, at: Location) -> Entity {
        let entity = ecs.spawn(&entity_repository().create("newt").expect("newt"));
        ecs.set_location(entity, at);
        entity
    }

    #[test]
    fn out_of_bounds_reads_null() {
        let map = small_map();
        assert_eq!(map.get_tile(-1, 0, 0), Tile::Null);
        assert_eq!(map.get_tile(0, 0, 2), Tile::Null);
        assert_eq!(map.get_tile(1, 1, 0), Tile::Floor);
    }

    #[test]
    fn digging_only_touches_walls() {
        let mut map = small_map();
        map.dig(2, 2, 0);
        assert_eq!(map.get_tile(2, 2, 0), Tile::Floor);
        map.dig(-4, 2, 0);
        assert_eq!(map.get_tile(-4, 2, 0), Tile::Null);
    }

    #[test]
    fn occupied_cells_are_rejected() {
        let mut ecs = EcsWorld::new();
        let mut map = small_map();
        let first = newt(&mut ecs, Location::new(1, 1, 0));
        let second = newt(&mut ecs, Location::new(1, 1, 0));
        map.add_entity(&mut ecs, first).expect("first fits");
        assert_eq!(
            map.add_entity(&mut ecs, second),
            Err(MapError::Occupied { x: 1, y: 1, z: 0 })
        );
        assert_eq!(map.entity_count(), 1);
        assert_eq!(map.engine().scheduler().len(), 1);
    }

    #[test]
    fn failed_moves_leave_the_index_alone() {
        let mut ecs = EcsWorld::new();
        let mut map = small_map();
        let a = newt(&mut ecs, Location::new(1, 1, 0));
        let b = newt(&mut ecs, Location::new(3, 1, 0));
        map.add_entity(&mut ecs, a).expect("a");
        map.add_entity(&mut ecs, b).expect("b");

        let err = map.move_entity(&mut ecs, a, Location::new(3, 1, 0));
        assert!(err.is_err());
        assert_eq!(map.get_entity_at(1, 1, 0), Some(a));
        let err = map.move_entity(&mut ecs, a, Location::new(9, 1, 0));
        assert_eq!(err, Err(MapError::OutOfBounds { x: 9, y: 1, z: 0 }));
        assert_eq!(ecs.location(a), Ok(Location::new(1, 1, 0)));

        map.move_entity(&mut ecs, a, Location::new(2, 1, 0))
            .expect("free cell");
        assert_eq!(map.get_entity_at(1, 1, 0), None);
        assert_eq!(map.get_entity_at(2, 1, 0), Some(a));
        assert_eq!(map.entity_count(), 2);
    }

    #[test]
    fn removing_an_actor_unschedules_it() {
        let mut ecs = EcsWorld::new();
        let mut map = small_map();
        let a = newt(&mut ecs, Location::new(1, 1, 0));
        map.add_entity(&mut ecs, a).expect("a");
        map.remove_entity(&mut ecs, a);
        assert!(map.engine().scheduler().is_empty());
        assert_eq!(map.get_entity_at(1, 1, 0), None);
        assert_eq!(ecs.position(a).and_then(|pos| pos.map), None);
    }

    #[test]
    fn radius_query_uses_a_square() {
        let mut ecs = EcsWorld::new();
        let mut map = small_map();
        let corner = newt(&mut ecs, Location::new(3, 3, 0));
        let other_level = newt(&mut ecs, Location::new(1, 1, 1));
        map.add_entity(&mut ecs, corner).expect("corner");
        map.add_entity(&mut ecs, other_level).expect("other level");
        assert_eq!(map.get_entities_within_radius(1, 1, 0, 2), vec![corner]);
        assert!(map.get_entities_within_radius(1, 1, 0, 1).is_empty());
    }

    #[test]
    fn exploration_is_sticky() {
        let mut map = small_map();
        map.mark_explored(1, 1, 0);
        map.mark_explored(40, 1, 0);
        map.dig(2, 2, 0);
        assert!(map.is_explored(1, 1, 0));
        assert!(!map.is_explored(40, 1, 0));
        assert!(!map.is_explored(1, 1, 1));
    }

    #[test]
    fn emptied_item_stacks_disappear() {
        let mut map = small_map();
        let apple = item_repository().create("apple").expect("apple");
        map.add_item(1, 1, 0, apple.clone());
        map.add_item(1, 1, 0, apple);
        assert_eq!(map.get_items_at(1, 1, 0).len(), 2);
        map.set_items_at(1, 1, 0, Vec::new());
        assert!(map.get_items_at(1, 1, 0).is_empty());
        assert_eq!(map.item_stacks().count(), 0);
    }

    #[test]
    fn random_floor_skips_occupied_cells() {
        let mut ecs = EcsWorld::new();
        let tiles = TileVolume::parse(&[&["###", "#..", "###"]]);
        let mut map = Map::new(MapId(2), MapKind::Cave, tiles);
        let a = newt(&mut ecs, Location::new(1, 1, 0));
        map.add_entity(&mut ecs, a).expect("a");
        let mut rng = RandomNumberGenerator::seeded(11);
        for _ in 0..20 {
            assert_eq!(map.random_floor_position(0, &mut rng), Location::new(2, 1, 0));
        }
    }
}
