#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Death,
    Kill,
    GainLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventHandler {
    RestoreHealth,
    DropCorpse,
    AwardExperience,
    SpendStatPointsRandomly,
    PromptStatChoice,
    DeclareVictory,
}

#[derive(Clone, Debug, Default)]
pub struct ListenerTable {
    entries: Vec<(EventKind, EventHandler)>,
}

impl ListenerTable {
    pub fn register(&mut self, kind: EventKind, handler: EventHandler) {
        self.entries.push((kind, handler));
    }

    pub fn handlers(&self, kind: EventKind) -> Vec<EventHandler> {
        self.entries
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .map(|(_, handler)| *handler)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_keep_registration_order() {
        let mut table = ListenerTable::default();
        table.register(EventKind::GainLevel, EventHandler::PromptStatChoice);
        table.register(EventKind::Death, EventHandler::DropCorpse);
        table.register(EventKind::GainLevel, EventHandler::RestoreHealth);
        assert_eq!(
            table.handlers(EventKind::GainLevel),
            vec![EventHandler::PromptStatChoice, EventHandler::RestoreHealth]
        );
        assert!(table.handlers(EventKind::Kill).is_empty());
    }
}
