use specs::prelude::Entity;
use tracing::{debug, info};

use super::{Game, GameStatus};
use crate::{
    ecs::{
        capability::Capability,
        components::{
            Attacker, CorpseDropper, Destructible, Experience, Renderable, StatOption, Stomach,
            Viewshed,
        },
        events::{EventHandler, EventKind},
    },
    error::GameError,
};

impl Game {
    /// Runs every handler the entity registered for `kind`, in registration
    /// order. `other` is the killer for `Death` and the victim for `Kill`.
    pub fn raise_event(
        &mut self,
        entity: Entity,
        kind: EventKind,
        other: Option<Entity>,
    ) -> Result<(), GameError> {
        for handler in self.ecs.handlers(entity, kind) {
            self.handle_event(entity, handler, other)?;
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        entity: Entity,
        handler: EventHandler,
        other: Option<Entity>,
    ) -> Result<(), GameError> {
        match handler {
            EventHandler::RestoreHealth => {
                self.ecs.update(entity, |destructible: &mut Destructible| {
                    destructible.hp = destructible.max_hp
                });
            }
            EventHandler::DropCorpse => self.drop_corpse(entity)?,
            EventHandler::AwardExperience => {
                if let Some(victim) = other {
                    self.award_kill_experience(entity, victim)?;
                }
            }
            EventHandler::SpendStatPointsRandomly => self.spend_stat_points_randomly(entity),
            EventHandler::PromptStatChoice => self.stat_prompt = true,
            EventHandler::DeclareVictory => {
                info!(entity = %self.ecs.name(entity), "boss defeated, game won");
                self.status = GameStatus::Won;
                self.map.engine_mut().lock();
            }
        }
        Ok(())
    }

    fn drop_corpse(&mut self, entity: Entity) -> Result<(), GameError> {
        let rate = self
            .ecs
            .get::<CorpseDropper>(entity)
            .map_or(0, |dropper| dropper.drop_rate);
        if self.rng.range(0, 101) > rate {
            return Ok(());
        }
        let at = self.ecs.location(entity)?;
        let mut corpse = self.item_templates.create("corpse")?;
        corpse.name = format!("{} corpse", self.ecs.name(entity));
        if let Some(renderable) = self.ecs.get::<Renderable>(entity) {
            corpse.color = renderable.color;
        }
        self.map.add_item(at.x, at.y, at.z, corpse);
        Ok(())
    }

    fn award_kill_experience(&mut self, killer: Entity, victim: Entity) -> Result<(), GameError> {
        let max_hp = self
            .ecs
            .get::<Destructible>(victim)
            .map_or(0, |destructible| destructible.max_hp);
        let mut exp = max_hp + self.defense_value(victim);
        if self.ecs.has_capability(victim, Capability::Attacker) {
            exp += self.attack_value(victim);
        }
        if let (Some(mine), Some(theirs)) = (
            self.ecs.get::<Experience>(killer),
            self.ecs.get::<Experience>(victim),
        ) {
            exp -= (mine.level as i32 - theirs.level as i32) * 3;
        }
        if exp > 0 {
            self.give_experience(killer, exp as u32)?;
        }
        Ok(())
    }

    pub fn give_experience(&mut self, entity: Entity, points: u32) -> Result<(), GameError> {
        let gained = self
            .ecs
            .update(entity, |experience: &mut Experience| {
                let mut points = points;
                let mut levels = 0;
                while points > 0 {
                    let threshold = experience.next_level_experience();
                    if experience.experience + points >= threshold {
                        let used = threshold.saturating_sub(experience.experience);
                        points -= used;
                        experience.experience += used;
                        experience.level += 1;
                        experience.stat_points += experience.stat_points_per_level;
                        levels += 1;
                    } else {
                        experience.experience += points;
                        points = 0;
                    }
                }
                (levels, experience.level)
            });
        let Some((levels, level)) = gained else {
            return Ok(());
        };
        if levels > 0 {
            debug!(entity = %self.ecs.name(entity), level, "level up");
            self.send_message(entity, format!("You advance to level {level}."));
            self.raise_event(entity, EventKind::GainLevel, None)?;
        }
        Ok(())
    }

    pub fn experience_to_next_level(&self, entity: Entity) -> u32 {
        self.ecs.get::<Experience>(entity).map_or(0, |experience| {
            experience
                .next_level_experience()
                .saturating_sub(experience.experience)
        })
    }

    fn spend_stat_points_randomly(&mut self, entity: Entity) {
        let Some(experience) = self.ecs.get::<Experience>(entity) else {
            return;
        };
        for _ in 0..experience.stat_points {
            if let Some(&option) = self.rng.random_slice_entry(&experience.stat_options) {
                self.apply_stat_option(entity, option);
            }
        }
        self.ecs
            .update(entity, |experience: &mut Experience| experience.stat_points = 0);
    }

    pub fn apply_stat_option(&mut self, entity: Entity, option: StatOption) {
        match option {
            StatOption::Attack => self.increase_attack_value(entity, 2),
            StatOption::Defense => {
                self.ecs.update(entity, |destructible: &mut Destructible| {
                    destructible.defense_value += 2
                });
                self.send_message(entity, "You look tougher!");
            }
            StatOption::MaxHp => {
                self.ecs.update(entity, |destructible: &mut Destructible| {
                    destructible.max_hp += 10;
                    destructible.hp += 10;
                });
                self.send_message(entity, "You look healthier!");
            }
            StatOption::Sight => {
                self.ecs
                    .update(entity, |viewshed: &mut Viewshed| viewshed.radius += 1);
                self.send_message(entity, "You are more aware of your surroundings!");
            }
        }
    }

    pub fn increase_attack_value(&mut self, entity: Entity, value: i32) {
        self.ecs
            .update(entity, |attacker: &mut Attacker| attacker.attack_value += value);
        self.send_message(entity, "You look stronger!");
    }

    pub fn stat_choice_pending(&self) -> bool {
        self.stat_prompt
            && self
                .ecs
                .get::<Experience>(self.player)
                .is_some_and(|experience| experience.stat_points > 0)
    }

    pub fn apply_stat_choice(&mut self, index: usize) -> bool {
        let Some(experience) = self.ecs.get::<Experience>(self.player) else {
            return false;
        };
        let Some(&option) = experience.stat_options.get(index) else {
            return false;
        };
        if experience.stat_points == 0 {
            return false;
        }
        self.apply_stat_option(self.player, option);
        let remaining = self
            .ecs
            .update(self.player, |experience: &mut Experience| {
                experience.stat_points -= 1;
                experience.stat_points
            })
            .unwrap_or(0);
        if remaining == 0 {
            self.stat_prompt = false;
        }
        true
    }

    pub fn modify_fullness(&mut self, entity: Entity, points: i32) {
        let Some((fullness, max)) = self.ecs.update(entity, |stomach: &mut Stomach| {
            stomach.fullness += points;
            (stomach.fullness, stomach.max_fullness)
        }) else {
            return;
        };
        if fullness <= 0 {
            self.kill(entity, Some("You have died of starvation!"));
        } else if fullness > max {
            self.kill(entity, Some("You choke and die!"));
        }
    }

    pub(crate) fn add_turn_hunger(&mut self, entity: Entity) {
        if let Some(stomach) = self.ecs.get::<Stomach>(entity) {
            self.modify_fullness(entity, -stomach.depletion_rate);
        }
    }
}
