pub mod items;
pub mod monsters;

use bracket_random::prelude::RandomNumberGenerator;

use crate::error::GameError;

#[derive(Clone, Debug)]
pub struct Repository<T> {
    name: &'static str,
    templates: Vec<(String, T, bool)>,
}

impl<T: Clone> Repository<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            templates: Vec::new(),
        }
    }

    pub fn define(&mut self, name: &str, template: T) {
        self.insert(name, template, true);
    }

    pub fn define_unique(&mut self, name: &str, template: T) {
        self.insert(name, template, false);
    }

    fn insert(&mut self, name: &str, template: T, random: bool) {
        self.templates.retain(|(existing, _, _)| existing != name);
        self.templates.push((name.to_string(), template, random));
    }

    pub fn create(&self, name: &str) -> Result<T, GameError> {
        self.templates
            .iter()
            .find(|(existing, _, _)| existing == name)
            .map(|(_, template, _)| template.clone())
            .ok_or_else(|| GameError::UnknownTemplate {
                repository: self.name,
                name: name.to_string(),
            })
    }

    pub fn create_random(&self, rng: &mut RandomNumberGenerator) -> Option<T> {
        let pool: Vec<&T> = self
            .templates
            .iter()
            .filter(|(_, _, random)| *random)
            .map(|(_, template, _)| template)
            .collect();
        if pool.is_empty() {
            return None;
        }
        let idx = rng.range(0, pool.len() as i32) as usize;
        Some(pool[idx].clone())
    }

    pub fn is_random(&self, name: &str) -> bool {
        self.templates
            .iter()
            .any(|(existing, _, random)| existing == name && *random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_reported() {
        let repo: Repository<u8> = Repository::new("numbers");
        let err = repo.create("seven").unwrap_err();
        assert!(err.to_string().contains("seven"));
    }

    #[test]
    fn random_creation_skips_unique_templates() {
        let mut repo = Repository::new("numbers");
        repo.define("one", 1);
        repo.define_unique("two", 2);
        let mut rng = RandomNumberGenerator::seeded(4);
        for _ in 0..50 {
            assert_eq!(repo.create_random(&mut rng), Some(1));
        }
        assert_eq!(repo.create("two").ok(), Some(2));
    }
}
