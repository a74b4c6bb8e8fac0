use bracket_terminal::prelude::{GREEN, LIGHT_GREEN, RGB, WHITE, YELLOW};

use super::Repository;
use crate::{ai::Task, ecs::capability::Capability};

#[derive(Clone, Debug)]
pub struct EntityTemplate {
    pub name: String,
    pub glyph: char,
    pub color: RGB,
    pub speed: u32,
    pub capabilities: Vec<Capability>,
    pub attack_value: i32,
    pub max_hp: i32,
    pub hp: Option<i32>,
    pub defense_value: i32,
    pub sight_radius: i32,
    pub inventory_slots: usize,
    pub max_fullness: i32,
    pub fullness: Option<i32>,
    pub fullness_depletion_rate: i32,
    pub corpse_drop_rate: i32,
    pub level: u32,
    pub stat_points_per_level: u32,
    pub tasks: Vec<Task>,
}

impl Default for EntityTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            glyph: ' ',
            color: RGB::named(WHITE),
            speed: 1000,
            capabilities: Vec::new(),
            attack_value: 1,
            max_hp: 10,
            hp: None,
            defense_value: 0,
            sight_radius: 5,
            inventory_slots: 10,
            max_fullness: 1000,
            fullness: None,
            fullness_depletion_rate: 1,
            corpse_drop_rate: 100,
            level: 1,
            stat_points_per_level: 1,
            tasks: vec![Task::Wander],
        }
    }
}

impl EntityTemplate {
    fn new(name: &str, glyph: char, color: RGB, capabilities: &[Capability]) -> Self {
        Self {
            name: name.to_string(),
            glyph,
            color,
            capabilities: capabilities.to_vec(),
            ..Default::default()
        }
    }
}

pub fn player_template() -> EntityTemplate {
    EntityTemplate {
        max_hp: 40,
        attack_value: 10,
        sight_radius: 6,
        inventory_slots: 22,
        ..EntityTemplate::new(
            "You",
            '@',
            RGB::named(WHITE),
            &[
                Capability::PlayerActor,
                Capability::PlayerStatGainer,
                Capability::Attacker,
                Capability::Destructible,
                Capability::InventoryHolder,
                Capability::FoodConsumer,
                Capability::Sight,
                Capability::MessageRecipient,
                Capability::Equipper,
                Capability::ExperienceGainer,
            ],
        )
    }
}

pub fn entity_repository() -> Repository<EntityTemplate> {
    use Capability::*;

    let mut repo = Repository::new("entities");
    repo.define(
        "fungus",
        EntityTemplate {
            max_hp: 10,
            speed: 250,
            ..EntityTemplate::new(
                "fungus",
                'F',
                RGB::named(GREEN),
                &[FungusActor, Destructible, ExperienceGainer, RandomStatGainer],
            )
        },
    );
    repo.define(
        "bat",
        EntityTemplate {
            max_hp: 5,
            attack_value: 4,
            speed: 2000,
            ..EntityTemplate::new(
                "bat",
                'B',
                RGB::named(WHITE),
                &[
                    TaskActor,
                    Attacker,
                    Destructible,
                    CorpseDropper,
                    ExperienceGainer,
                    RandomStatGainer,
                ],
            )
        },
    );
    repo.define(
        "newt",
        EntityTemplate {
            max_hp: 3,
            attack_value: 2,
            ..EntityTemplate::new(
                "newt",
                ':',
                RGB::named(YELLOW),
                &[
                    TaskActor,
                    Attacker,
                    Destructible,
                    CorpseDropper,
                    ExperienceGainer,
                    RandomStatGainer,
                ],
            )
        },
    );
    repo.define(
        "kobold",
        EntityTemplate {
            max_hp: 6,
            attack_value: 4,
            sight_radius: 5,
            tasks: vec![Task::Hunt, Task::Wander],
            ..EntityTemplate::new(
                "kobold",
                'k',
                RGB::named(WHITE),
                &[
                    TaskActor,
                    Sight,
                    Attacker,
                    Destructible,
                    CorpseDropper,
                    ExperienceGainer,
                    RandomStatGainer,
                ],
            )
        },
    );
    repo.define_unique(
        "giant zombie",
        EntityTemplate {
            max_hp: 30,
            attack_value: 8,
            defense_value: 5,
            level: 5,
            sight_radius: 6,
            tasks: vec![Task::GrowArm, Task::SpawnSlime, Task::Hunt, Task::Wander],
            ..EntityTemplate::new(
                "giant zombie",
                'Z',
                RGB::from_u8(170, 170, 170),
                &[
                    GiantZombieActor,
                    Sight,
                    Attacker,
                    Destructible,
                    CorpseDropper,
                    ExperienceGainer,
                ],
            )
        },
    );
    repo.define_unique(
        "slime",
        EntityTemplate {
            max_hp: 10,
            attack_value: 5,
            sight_radius: 3,
            tasks: vec![Task::Hunt, Task::Wander],
            ..EntityTemplate::new(
                "slime",
                's',
                RGB::named(LIGHT_GREEN),
                &[
                    TaskActor,
                    Sight,
                    Attacker,
                    Destructible,
                    CorpseDropper,
                    ExperienceGainer,
                    RandomStatGainer,
                ],
            )
        },
    );
    repo
}
