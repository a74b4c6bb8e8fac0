pub mod capability;
pub mod components;
pub mod events;

use specs::prelude::{Builder, Component, Entity, World as SpecsWorld, WorldExt};
use tracing::trace;

use crate::{
    data::monsters::EntityTemplate,
    error::{GameError, MapError},
    map::Location,
};

use self::{
    capability::{Capability, CapabilityQuery, CapabilitySet},
    components::{
        Attacker, CorpseDropper, Destructible, Equipment, Experience, FungusGrowth, Identity,
        Inventory, MessageQueue, Position, Renderable, StatOption, Stomach, TaskList, Viewshed,
        ZombieState,
    },
    events::{EventHandler, EventKind, ListenerTable},
};

const FUNGUS_GROWTHS: u32 = 5;

pub struct EcsWorld {
    specs_world: SpecsWorld,
}

impl Default for EcsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsWorld {
    pub fn new() -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        Self { specs_world }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Identity>();
        world.register::<CapabilitySet>();
        world.register::<ListenerTable>();
        world.register::<Attacker>();
        world.register::<Destructible>();
        world.register::<MessageQueue>();
        world.register::<Viewshed>();
        world.register::<Inventory>();
        world.register::<Stomach>();
        world.register::<CorpseDropper>();
        world.register::<Equipment>();
        world.register::<Experience>();
        world.register::<TaskList>();
        world.register::<FungusGrowth>();
        world.register::<ZombieState>();
    }

    pub fn spawn(&mut self, template: &EntityTemplate) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position::unplaced())
            .with(Renderable {
                glyph: template.glyph as u16,
                color: template.color,
            })
            .with(Identity {
                name: template.name.clone(),
                speed: template.speed,
                alive: true,
            })
            .with(CapabilitySet::default())
            .with(ListenerTable::default())
            .build();

        for &capability in &template.capabilities {
            let attached = self
                .update(entity, |set: &mut CapabilitySet| set.attach(capability))
                .unwrap_or(false);
            if !attached {
                continue;
            }
            self.update(entity, |table: &mut ListenerTable| {
                for &(kind, handler) in capability.listeners() {
                    table.register(kind, handler);
                }
            });
            self.init_capability(entity, capability, template);
        }

        trace!(name = %template.name, ?entity, "spawned entity");
        entity
    }

    fn init_capability(&mut self, entity: Entity, capability: Capability, template: &EntityTemplate) {
        match capability {
            Capability::FungusActor => self.insert_once(
                entity,
                FungusGrowth {
                    remaining: FUNGUS_GROWTHS,
                },
            ),
            Capability::TaskActor => self.insert_once(
                entity,
                TaskList {
                    tasks: template.tasks.clone(),
                },
            ),
            Capability::GiantZombieActor => {
                self.insert_once(
                    entity,
                    TaskList {
                        tasks: template.tasks.clone(),
                    },
                );
                self.insert_once(entity, ZombieState::default());
            }
            Capability::Attacker => self.insert_once(
                entity,
                Attacker {
                    attack_value: template.attack_value,
                },
            ),
            Capability::Destructible => self.insert_once(
                entity,
                Destructible {
                    hp: template.hp.unwrap_or(template.max_hp),
                    max_hp: template.max_hp,
                    defense_value: template.defense_value,
                },
            ),
            Capability::MessageRecipient => self.insert_once(entity, MessageQueue::default()),
            Capability::Sight => self.insert_once(
                entity,
                Viewshed {
                    radius: template.sight_radius,
                },
            ),
            Capability::InventoryHolder => {
                self.insert_once(entity, Inventory::with_slots(template.inventory_slots))
            }
            Capability::FoodConsumer => self.insert_once(
                entity,
                Stomach {
                    fullness: template.fullness.unwrap_or(template.max_fullness / 2),
                    max_fullness: template.max_fullness,
                    depletion_rate: template.fullness_depletion_rate,
                },
            ),
            Capability::CorpseDropper => self.insert_once(
                entity,
                CorpseDropper {
                    drop_rate: template.corpse_drop_rate,
                },
            ),
            Capability::Equipper => self.insert_once(entity, Equipment::default()),
            Capability::ExperienceGainer => {
                // Options come from whatever is attached at this point.
                let mut stat_options = Vec::new();
                if self.has_capability(entity, Capability::Attacker) {
                    stat_options.push(StatOption::Attack);
                }
                if self.has_capability(entity, Capability::Destructible) {
                    stat_options.push(StatOption::Defense);
                    stat_options.push(StatOption::MaxHp);
                }
                if self.has_capability(entity, Capability::Sight) {
                    stat_options.push(StatOption::Sight);
                }
                self.insert_once(
                    entity,
                    Experience {
                        level: template.level,
                        experience: 0,
                        stat_points: 0,
                        stat_points_per_level: template.stat_points_per_level,
                        stat_options,
                    },
                );
            }
            Capability::PlayerActor
            | Capability::RandomStatGainer
            | Capability::PlayerStatGainer => {}
        }
    }

    pub fn insert_once<T: Component>(&mut self, entity: Entity, component: T) {
        let mut storage = self.specs_world.write_component::<T>();
        if !storage.contains(entity) {
            let inserted = storage.insert(entity, component);
            debug_assert!(inserted.is_ok(), "component inserted on a dead entity");
        }
    }

    pub fn get<T: Component + Clone>(&self, entity: Entity) -> Option<T> {
        let storage = self.specs_world.read_component::<T>();
        storage.get(entity).cloned()
    }

    pub fn contains<T: Component>(&self, entity: Entity) -> bool {
        let storage = self.specs_world.read_component::<T>();
        storage.contains(entity)
    }

    pub fn update<T: Component, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut storage = self.specs_world.write_component::<T>();
        storage.get_mut(entity).map(f)
    }

    pub fn require<T: Component + Clone>(
        &self,
        entity: Entity,
        component: &'static str,
    ) -> Result<T, GameError> {
        self.get(entity)
            .ok_or(GameError::MissingComponent { entity, component })
    }

    pub fn has_capability(&self, entity: Entity, query: impl Into<CapabilityQuery>) -> bool {
        let storage = self.specs_world.read_component::<CapabilitySet>();
        storage.get(entity).is_some_and(|set| set.has(query))
    }

    pub fn capabilities(&self, entity: Entity) -> CapabilitySet {
        self.get(entity).unwrap_or_default()
    }

    pub fn handlers(&self, entity: Entity, kind: EventKind) -> Vec<EventHandler> {
        let storage = self.specs_world.read_component::<ListenerTable>();
        storage
            .get(entity)
            .map(|table| table.handlers(kind))
            .unwrap_or_default()
    }

    pub fn name(&self, entity: Entity) -> String {
        let storage = self.specs_world.read_component::<Identity>();
        storage
            .get(entity)
            .map(|identity| identity.name.clone())
            .unwrap_or_else(|| "thing".to_string())
    }

    pub fn speed(&self, entity: Entity) -> u32 {
        let storage = self.specs_world.read_component::<Identity>();
        storage.get(entity).map_or(1000, |identity| identity.speed)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let storage = self.specs_world.read_component::<Identity>();
        storage.get(entity).is_some_and(|identity| identity.alive)
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.get(entity)
    }

    pub fn location(&self, entity: Entity) -> Result<Location, MapError> {
        self.position(entity)
            .map(|pos| pos.location())
            .ok_or(MapError::NotPlaced(entity))
    }

    pub fn set_location(&mut self, entity: Entity, location: Location) {
        self.update(entity, |pos: &mut Position| {
            pos.x = location.x;
            pos.y = location.y;
            pos.z = location.z;
        });
    }

    pub fn despawn(&mut self, entity: Entity) {
        if self.specs_world.delete_entity(entity).is_ok() {
            trace!(?entity, "despawned entity");
        }
        self.specs_world.maintain();
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.specs_world.is_alive(entity)
    }
}
