pub mod combat;
pub mod events;
pub mod inventory;
pub mod messages;
pub mod movement;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;
use tracing::{debug, info, warn};

pub use movement::MoveOutcome;

use crate::{
    ai,
    config::GameConfig,
    data::{
        Repository,
        items::{EQUIPMENT, Item, item_repository},
        monsters::{EntityTemplate, entity_repository, player_template},
    },
    ecs::{
        EcsWorld,
        capability::Capability,
        components::{Destructible, Experience, HungerState, Identity, Stomach, Viewshed},
    },
    error::GameError,
    map::{Location, Map, MapId, MapKind, Tile, TileVolume, builder::Builder},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub level: u32,
    pub experience: u32,
    pub depth: i32,
    pub hunger: HungerState,
}

pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) ecs: EcsWorld,
    pub(crate) map: Map,
    pub(crate) rng: RandomNumberGenerator,
    pub(crate) entity_templates: Repository<EntityTemplate>,
    pub(crate) item_templates: Repository<Item>,
    pub(crate) player: Entity,
    pub(crate) status: GameStatus,
    pub(crate) next_map_id: u32,
    pub(crate) stat_prompt: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let seed = config.resolved_seed();
        info!(seed, ?config, "starting new game");
        let mut rng = RandomNumberGenerator::seeded(seed);
        let tiles = Builder::new(config.width, config.height, config.depth, &mut rng).into_tiles();
        let mut game = Self::assemble(config, rng, tiles, None)?;
        game.populate()?;
        game.start()?;
        Ok(game)
    }

    pub fn from_tiles(
        config: GameConfig,
        tiles: TileVolume,
        player_at: Location,
    ) -> Result<Self, GameError> {
        let rng = RandomNumberGenerator::seeded(config.resolved_seed());
        let mut game = Self::assemble(config, rng, tiles, Some(player_at))?;
        game.start()?;
        Ok(game)
    }

    fn assemble(
        config: GameConfig,
        mut rng: RandomNumberGenerator,
        tiles: TileVolume,
        player_at: Option<Location>,
    ) -> Result<Self, GameError> {
        let mut ecs = EcsWorld::new();
        let mut map = Map::new(MapId(0), MapKind::Cave, tiles);
        let player = ecs.spawn(&player_template());
        match player_at {
            Some(at) => {
                ecs.set_location(player, at);
                map.add_entity(&mut ecs, player)?;
            }
            None => {
                map.add_entity_at_random_position(&mut ecs, player, 0, &mut rng)?;
            }
        }
        Ok(Self {
            config,
            ecs,
            map,
            rng,
            entity_templates: entity_repository(),
            item_templates: item_repository(),
            player,
            status: GameStatus::Playing,
            next_map_id: 1,
            stat_prompt: false,
        })
    }

    fn populate(&mut self) -> Result<(), GameError> {
        let depth = self.map.depth();
        for z in 0..depth {
            for _ in 0..self.config.monsters_per_level {
                let Some(template) = self.entity_templates.create_random(&mut self.rng) else {
                    break;
                };
                let entity = self.ecs.spawn(&template);
                self.map
                    .add_entity_at_random_position(&mut self.ecs, entity, z, &mut self.rng)?;
                // Deeper monsters start stronger.
                for _ in 0..z {
                    let needed = self.experience_to_next_level(entity);
                    self.give_experience(entity, needed)?;
                }
            }
            for _ in 0..self.config.items_per_level {
                let Some(item) = self.item_templates.create_random(&mut self.rng) else {
                    break;
                };
                self.map.add_item_at_random_position(item, z, &mut self.rng);
            }
        }
        for name in EQUIPMENT {
            let item = self.item_templates.create(name)?;
            let z = self.rng.range(0, depth.max(1));
            self.map.add_item_at_random_position(item, z, &mut self.rng);
        }
        let hole = self.map.random_floor_position(depth - 1, &mut self.rng);
        self.map.set_tile(hole.x, hole.y, hole.z, Tile::HoleToCavern);
        debug!(
            entities = self.map.entity_count(),
            x = hole.x,
            y = hole.y,
            z = hole.z,
            "dungeon populated"
        );
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.unlock()
    }

    pub fn unlock(&mut self) -> Result<(), GameError> {
        if self.status != GameStatus::Playing {
            return Ok(());
        }
        self.map.engine_mut().unlock()?;
        self.run_until_locked()
    }

    fn run_until_locked(&mut self) -> Result<(), GameError> {
        while !self.map.engine().is_locked() {
            if self.status != GameStatus::Playing || self.map.player().is_none() {
                self.map.engine_mut().lock();
                break;
            }
            let Some(actor) = self.map.engine_mut().next_actor() else {
                break;
            };
            self.act(actor)?;
        }
        Ok(())
    }

    fn act(&mut self, entity: Entity) -> Result<(), GameError> {
        if !self.ecs.exists(entity) || !self.ecs.is_alive(entity) {
            return Ok(());
        }
        match self.ecs.capabilities(entity).actor_kind() {
            Some(Capability::PlayerActor) => {
                self.add_turn_hunger(entity);
                self.map.engine_mut().lock();
                Ok(())
            }
            Some(Capability::FungusActor) => ai::fungus_act(self, entity),
            Some(Capability::TaskActor) => ai::task_act(self, entity),
            Some(Capability::GiantZombieActor) => ai::zombie_act(self, entity),
            other => {
                warn!(entity = %self.ecs.name(entity), ?other, "scheduled entity cannot act");
                Ok(())
            }
        }
    }

    /// Ends an entity. Only the first call for an entity has any effect.
    ///
    /// The player stays in the world so the final screen can show it; the game
    /// is lost and the engine stops. Anything else leaves its map and the world.
    pub fn kill(&mut self, entity: Entity, message: Option<&str>) {
        let was_alive = self
            .ecs
            .update(entity, |identity: &mut Identity| {
                std::mem::replace(&mut identity.alive, false)
            })
            .unwrap_or(false);
        if !was_alive {
            return;
        }
        self.send_message(entity, message.unwrap_or("You have died!"));
        if self.ecs.has_capability(entity, Capability::PlayerActor) {
            info!("player died, game lost");
            self.send_message(entity, "Press [Enter] to continue!");
            self.status = GameStatus::Lost;
            self.map.engine_mut().lock();
        } else {
            debug!(entity = %self.ecs.name(entity), "entity killed");
            self.map.remove_entity(&mut self.ecs, entity);
            self.ecs.despawn(entity);
        }
    }

    pub fn spawn_entity(&mut self, name: &str, at: Location) -> Result<Entity, GameError> {
        let template = self.entity_templates.create(name)?;
        let entity = self.ecs.spawn(&template);
        self.ecs.set_location(entity, at);
        if let Err(err) = self.map.add_entity(&mut self.ecs, entity) {
            self.ecs.despawn(entity);
            return Err(err.into());
        }
        Ok(entity)
    }

    pub(crate) fn allocate_map_id(&mut self) -> MapId {
        let id = MapId(self.next_map_id);
        self.next_map_id += 1;
        id
    }

    pub fn refresh_player_view(&mut self) -> Vec<Point> {
        let Ok(at) = self.ecs.location(self.player) else {
            return Vec::new();
        };
        let radius = self
            .ecs
            .get::<Viewshed>(self.player)
            .map_or(0, |viewshed| viewshed.radius);
        let visible = self
            .map
            .get_fov(at.z)
            .map(|fov| fov.visible_points(at.x, at.y, radius))
            .unwrap_or_default();
        for point in &visible {
            self.map.mark_explored(point.x, point.y, at.z);
        }
        visible
    }

    pub fn player_stats(&self) -> Option<PlayerStats> {
        let destructible = self.ecs.get::<Destructible>(self.player)?;
        let experience = self.ecs.get::<Experience>(self.player)?;
        let stomach = self.ecs.get::<Stomach>(self.player)?;
        let depth = self.ecs.location(self.player).map_or(0, |at| at.z);
        Some(PlayerStats {
            hp: destructible.hp,
            max_hp: destructible.max_hp,
            attack: self.attack_value(self.player),
            defense: self.defense_value(self.player),
            level: experience.level,
            experience: experience.experience,
            depth,
            hunger: stomach.hunger_state(),
        })
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }
}
