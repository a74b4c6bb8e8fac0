use super::tile::Tile;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

#[derive(Clone, Debug)]
pub struct TileLayer {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl TileLayer {
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![tile; size],
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.idx(x, y).map_or(Tile::Null, |idx| self.tiles[idx])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(idx) = self.idx(x, y) {
            self.tiles[idx] = tile;
        }
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}

#[derive(Clone, Debug)]
pub struct TileVolume {
    width: i32,
    height: i32,
    levels: Vec<TileLayer>,
}

impl TileVolume {
    pub fn filled(width: i32, height: i32, depth: i32, tile: Tile) -> Self {
        let levels = (0..depth.max(0))
            .map(|_| TileLayer::filled(width, height, tile))
            .collect();
        Self {
            width,
            height,
            levels,
        }
    }

    /// Panics if the layers disagree on their dimensions.
    pub fn from_layers(levels: Vec<TileLayer>) -> Self {
        let (width, height) = levels
            .first()
            .map(|layer| (layer.width, layer.height))
            .unwrap_or((0, 0));
        assert!(
            levels
                .iter()
                .all(|layer| layer.width == width && layer.height == height),
            "tile layers must share dimensions"
        );
        Self {
            width,
            height,
            levels,
        }
    }

    pub fn parse(levels: &[&[&str]]) -> Self {
        let layers = levels
            .iter()
            .map(|rows| {
                let height = rows.len() as i32;
                let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
                let mut layer = TileLayer::filled(width, height, Tile::Wall);
                for (y, row) in rows.iter().enumerate() {
                    for (x, ch) in row.chars().enumerate() {
                        let tile = match ch {
                            '.' => Tile::Floor,
                            '<' => Tile::StairsUp,
                            '>' => Tile::StairsDown,
                            'O' => Tile::HoleToCavern,
                            '~' => Tile::Water,
                            _ => Tile::Wall,
                        };
                        layer.set(x as i32, y as i32, tile);
                    }
                }
                layer
            })
            .collect();
        Self::from_layers(layers)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn depth(&self) -> i32 {
        self.levels.len() as i32
    }

    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        z >= 0 && z < self.depth() && x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Tile {
        if z < 0 {
            return Tile::Null;
        }
        self.levels
            .get(z as usize)
            .map_or(Tile::Null, |layer| layer.get(x, y))
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, tile: Tile) {
        if z < 0 {
            return;
        }
        if let Some(layer) = self.levels.get_mut(z as usize) {
            layer.set(x, y, tile);
        }
    }

    pub fn layer(&self, z: i32) -> Option<&TileLayer> {
        if z < 0 {
            return None;
        }
        self.levels.get(z as usize)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_rows_as_y() {
        let volume = TileVolume::parse(&[&["#.#", "..>"]]);
        assert_eq!(volume.width(), 3);
        assert_eq!(volume.height(), 2);
        assert_eq!(volume.get(1, 0, 0), Tile::Floor);
        assert_eq!(volume.get(2, 1, 0), Tile::StairsDown);
        assert_eq!(volume.get(0, 0, 0), Tile::Wall);
    }

    #[test]
    fn outside_reads_are_null_and_writes_are_ignored() {
        let mut volume = TileVolume::filled(4, 4, 2, Tile::Floor);
        volume.set(-1, 0, 0, Tile::Wall);
        volume.set(0, 0, 5, Tile::Wall);
        assert_eq!(volume.get(4, 0, 0), Tile::Null);
        assert_eq!(volume.get(0, 0, 2), Tile::Null);
        assert_eq!(volume.get(0, 0, -1), Tile::Null);
        assert_eq!(volume.layer(0).map(|l| l.count(Tile::Wall)), Some(0));
    }
}
