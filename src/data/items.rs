use bracket_terminal::prelude::{GREEN, LIGHT_GREEN, ORANGE, RED, RGB, WHITE};

use super::Repository;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemCapability {
    Edible,
    Equippable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edible {
    pub food_value: i32,
    pub max_consumptions: i32,
    pub remaining_consumptions: i32,
}

impl Edible {
    pub fn new(food_value: i32, consumptions: i32) -> Self {
        Self {
            food_value,
            max_consumptions: consumptions,
            remaining_consumptions: consumptions,
        }
    }

    pub fn has_remaining_consumptions(&self) -> bool {
        self.remaining_consumptions > 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Equippable {
    pub attack_value: i32,
    pub defense_value: i32,
    pub wieldable: bool,
    pub wearable: bool,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub name: String,
    pub glyph: u16,
    pub color: RGB,
    pub edible: Option<Edible>,
    pub equippable: Option<Equippable>,
}

impl Item {
    pub fn new(name: impl Into<String>, glyph: char, color: RGB) -> Self {
        Self {
            name: name.into(),
            glyph: glyph as u16,
            color,
            edible: None,
            equippable: None,
        }
    }

    pub fn with_edible(mut self, food_value: i32, consumptions: i32) -> Self {
        self.edible = Some(Edible::new(food_value, consumptions));
        self
    }

    pub fn with_equippable(mut self, equippable: Equippable) -> Self {
        self.equippable = Some(equippable);
        self
    }

    pub fn has_capability(&self, capability: ItemCapability) -> bool {
        match capability {
            ItemCapability::Edible => self.edible.is_some(),
            ItemCapability::Equippable => self.equippable.is_some(),
        }
    }

    pub fn is_wieldable(&self) -> bool {
        self.equippable.as_ref().is_some_and(|e| e.wieldable)
    }

    pub fn is_wearable(&self) -> bool {
        self.equippable.as_ref().is_some_and(|e| e.wearable)
    }

    pub fn attack_value(&self) -> i32 {
        self.equippable.as_ref().map_or(0, |e| e.attack_value)
    }

    pub fn defense_value(&self) -> i32 {
        self.equippable.as_ref().map_or(0, |e| e.defense_value)
    }

    pub fn describe(&self) -> String {
        match &self.edible {
            Some(edible) if edible.remaining_consumptions != edible.max_consumptions => {
                format!("partly eaten {}", self.name)
            }
            _ => self.name.clone(),
        }
    }

    pub fn describe_a(&self, capitalize: bool) -> String {
        let text = self.describe();
        let vowel = text
            .chars()
            .next()
            .is_some_and(|ch| "aeiou".contains(ch.to_ascii_lowercase()));
        let article = match (vowel, capitalize) {
            (true, true) => "An",
            (true, false) => "an",
            (false, true) => "A",
            (false, false) => "a",
        };
        format!("{article} {text}")
    }

    pub fn describe_the(&self, capitalize: bool) -> String {
        let article = if capitalize { "The" } else { "the" };
        format!("{article} {}", self.describe())
    }
}

fn weapon(attack_value: i32, defense_value: i32) -> Equippable {
    Equippable {
        attack_value,
        defense_value,
        wieldable: true,
        wearable: false,
    }
}

fn armor(defense_value: i32) -> Equippable {
    Equippable {
        defense_value,
        wearable: true,
        ..Default::default()
    }
}

pub const EQUIPMENT: [&str; 6] = ["dagger", "sword", "staff", "tunic", "chainmail", "platemail"];

pub fn item_repository() -> Repository<Item> {
    let mut repo = Repository::new("items");
    repo.define(
        "apple",
        Item::new("apple", '%', RGB::named(RED)).with_edible(50, 1),
    );
    repo.define(
        "melon",
        Item::new("melon", '%', RGB::named(LIGHT_GREEN)).with_edible(35, 4),
    );
    repo.define(
        "pumpkin",
        Item::new("pumpkin", '%', RGB::named(ORANGE))
            .with_edible(50, 1)
            .with_equippable(Equippable {
                attack_value: 2,
                defense_value: 2,
                wieldable: true,
                wearable: true,
            }),
    );
    repo.define("rock", Item::new("rock", '*', RGB::named(WHITE)));
    repo.define_unique(
        "corpse",
        Item::new("corpse", '%', RGB::named(RED)).with_edible(75, 1),
    );
    repo.define_unique(
        "dagger",
        Item::new("dagger", ')', RGB::from_u8(128, 128, 128)).with_equippable(weapon(5, 0)),
    );
    repo.define_unique(
        "sword",
        Item::new("sword", ')', RGB::named(WHITE)).with_equippable(weapon(10, 0)),
    );
    repo.define_unique(
        "staff",
        Item::new("staff", ')', RGB::from_u8(255, 255, 0)).with_equippable(weapon(5, 3)),
    );
    repo.define_unique(
        "tunic",
        Item::new("tunic", '[', RGB::named(GREEN)).with_equippable(armor(2)),
    );
    repo.define_unique(
        "chainmail",
        Item::new("chainmail", '[', RGB::named(WHITE)).with_equippable(armor(4)),
    );
    repo.define_unique(
        "platemail",
        Item::new("platemail", '[', RGB::from_u8(240, 248, 255)).with_equippable(armor(6)),
    );
    repo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_follow_the_first_letter() {
        let repo = item_repository();
        let apple = repo.create("apple").expect("apple");
        let rock = repo.create("rock").expect("rock");
        assert_eq!(apple.describe_a(false), "an apple");
        assert_eq!(rock.describe_a(true), "A rock");
        assert_eq!(rock.describe_the(false), "the rock");
    }

    #[test]
    fn partly_eaten_after_first_bite() {
        let mut melon = item_repository().create("melon").expect("melon");
        if let Some(edible) = melon.edible.as_mut() {
            edible.remaining_consumptions -= 1;
        }
        assert_eq!(melon.describe(), "partly eaten melon");
        assert_eq!(melon.describe_a(false), "a partly eaten melon");
    }

    #[test]
    fn equipment_is_never_rolled_randomly() {
        let repo = item_repository();
        for name in EQUIPMENT {
            assert!(!repo.is_random(name), "{name}");
        }
        assert!(!repo.is_random("corpse"));
        assert!(repo.is_random("apple"));
    }
}
