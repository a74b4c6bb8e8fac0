use bracket_terminal::prelude::{BLACK, BLUE, CYAN, RGB, WHITE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Null,
    Floor,
    Wall,
    StairsUp,
    StairsDown,
    HoleToCavern,
    Water,
}

impl Tile {
    pub const fn glyph(&self) -> u16 {
        let ch = match self {
            Tile::Null => b' ',
            Tile::Floor => b'.',
            Tile::Wall => b'#',
            Tile::StairsUp => b'<',
            Tile::StairsDown => b'>',
            Tile::HoleToCavern => b'O',
            Tile::Water => b'~',
        };
        ch as u16
    }

    pub fn fg(&self) -> RGB {
        match self {
            Tile::Wall => RGB::named(CYAN),
            Tile::Water => RGB::named(BLUE),
            _ => RGB::named(WHITE),
        }
    }

    pub fn bg(&self) -> RGB {
        RGB::named(BLACK)
    }

    pub const fn is_walkable(&self) -> bool {
        matches!(
            self,
            Tile::Floor | Tile::StairsUp | Tile::StairsDown | Tile::HoleToCavern
        )
    }

    pub const fn is_diggable(&self) -> bool {
        matches!(self, Tile::Wall)
    }

    pub const fn is_blocking_light(&self) -> bool {
        matches!(self, Tile::Null | Tile::Wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_tile_is_inert_and_opaque() {
        assert!(!Tile::Null.is_walkable());
        assert!(!Tile::Null.is_diggable());
        assert!(Tile::Null.is_blocking_light());
    }

    #[test]
    fn water_is_transparent_but_impassable() {
        assert!(!Tile::Water.is_walkable());
        assert!(!Tile::Water.is_diggable());
        assert!(!Tile::Water.is_blocking_light());
    }

    #[test]
    fn only_walls_can_be_dug() {
        let diggable: Vec<Tile> = [
            Tile::Null,
            Tile::Floor,
            Tile::Wall,
            Tile::StairsUp,
            Tile::StairsDown,
            Tile::HoleToCavern,
            Tile::Water,
        ]
        .into_iter()
        .filter(Tile::is_diggable)
        .collect();
        assert_eq!(diggable, vec![Tile::Wall]);
    }
}
