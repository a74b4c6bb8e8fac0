use smallvec::SmallVec;

use super::events::{EventHandler, EventKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    PlayerActor,
    FungusActor,
    TaskActor,
    GiantZombieActor,
    Attacker,
    Destructible,
    MessageRecipient,
    Sight,
    InventoryHolder,
    FoodConsumer,
    CorpseDropper,
    Equipper,
    ExperienceGainer,
    RandomStatGainer,
    PlayerStatGainer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityGroup {
    Actor,
    Attacker,
    Sight,
    StatGainer,
}

impl Capability {
    pub const fn group(self) -> Option<CapabilityGroup> {
        match self {
            Capability::PlayerActor
            | Capability::FungusActor
            | Capability::TaskActor
            | Capability::GiantZombieActor => Some(CapabilityGroup::Actor),
            Capability::Attacker => Some(CapabilityGroup::Attacker),
            Capability::Sight => Some(CapabilityGroup::Sight),
            Capability::RandomStatGainer | Capability::PlayerStatGainer => {
                Some(CapabilityGroup::StatGainer)
            }
            _ => None,
        }
    }

    pub const fn listeners(self) -> &'static [(EventKind, EventHandler)] {
        match self {
            Capability::GiantZombieActor => &[(EventKind::Death, EventHandler::DeclareVictory)],
            Capability::Destructible => &[(EventKind::GainLevel, EventHandler::RestoreHealth)],
            Capability::CorpseDropper => &[(EventKind::Death, EventHandler::DropCorpse)],
            Capability::ExperienceGainer => &[(EventKind::Kill, EventHandler::AwardExperience)],
            Capability::RandomStatGainer => {
                &[(EventKind::GainLevel, EventHandler::SpendStatPointsRandomly)]
            }
            Capability::PlayerStatGainer => {
                &[(EventKind::GainLevel, EventHandler::PromptStatChoice)]
            }
            _ => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapabilityQuery {
    Capability(Capability),
    Group(CapabilityGroup),
}

impl From<Capability> for CapabilityQuery {
    fn from(capability: Capability) -> Self {
        CapabilityQuery::Capability(capability)
    }
}

impl From<CapabilityGroup> for CapabilityQuery {
    fn from(group: CapabilityGroup) -> Self {
        CapabilityQuery::Group(group)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CapabilitySet {
    attached: SmallVec<[Capability; 12]>,
    groups: SmallVec<[CapabilityGroup; 4]>,
}

impl CapabilitySet {
    pub fn attach(&mut self, capability: Capability) -> bool {
        if self.attached.contains(&capability) {
            return false;
        }
        self.attached.push(capability);
        if let Some(group) = capability.group() {
            if !self.groups.contains(&group) {
                self.groups.push(group);
            }
        }
        true
    }

    pub fn has(&self, query: impl Into<CapabilityQuery>) -> bool {
        match query.into() {
            CapabilityQuery::Capability(capability) => self.attached.contains(&capability),
            CapabilityQuery::Group(group) => self.groups.contains(&group),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.attached.iter().copied()
    }

    pub fn actor_kind(&self) -> Option<Capability> {
        self.iter()
            .find(|capability| capability.group() == Some(CapabilityGroup::Actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_their_members() {
        let mut set = CapabilitySet::default();
        set.attach(Capability::TaskActor);
        set.attach(Capability::Destructible);
        assert!(set.has(CapabilityGroup::Actor));
        assert!(set.has(Capability::TaskActor));
        assert!(!set.has(Capability::PlayerActor));
        assert!(!set.has(CapabilityGroup::StatGainer));
        assert_eq!(set.actor_kind(), Some(Capability::TaskActor));
    }

    #[test]
    fn attaching_twice_is_a_no_op() {
        let mut set = CapabilitySet::default();
        assert!(set.attach(Capability::Sight));
        assert!(!set.attach(Capability::Sight));
        assert_eq!(set.iter().count(), 1);
    }
}
