use specs::prelude::Entity;

use super::Game;
use crate::{
    ecs::{capability::Capability, components::MessageQueue},
    map::Location,
};

impl Game {
    pub fn send_message(&mut self, recipient: Entity, message: impl Into<String>) {
        if !self
            .ecs
            .has_capability(recipient, Capability::MessageRecipient)
        {
            return;
        }
        let message = message.into();
        self.ecs
            .update(recipient, |queue: &mut MessageQueue| queue.messages.push(message));
    }

    pub fn send_message_nearby(&mut self, at: Location, message: &str) {
        let radius = self.config.message_radius;
        for entity in self
            .map
            .get_entities_within_radius(at.x, at.y, at.z, radius)
        {
            self.send_message(entity, message);
        }
    }

    pub fn messages(&self, entity: Entity) -> Vec<String> {
        self.ecs
            .get::<MessageQueue>(entity)
            .map(|queue| queue.messages)
            .unwrap_or_default()
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        self.ecs
            .update(self.player, |queue: &mut MessageQueue| {
                std::mem::take(&mut queue.messages)
            })
            .unwrap_or_default()
    }
}
