use std::collections::HashSet;

use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, warn};

use super::tile::Tile;
use super::volume::{TileLayer, TileVolume};

/// Regions with this many cells or fewer are erased.
pub const MIN_REGION_SIZE: usize = 20;

const SMOOTHING_PASSES: usize = 3;
const OPEN_PROBABILITY: f64 = 0.5;
const BORN: [usize; 4] = [5, 6, 7, 8];
const SURVIVE: [usize; 5] = [4, 5, 6, 7, 8];

pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut RandomNumberGenerator) {
    for i in (1..items.len()).rev() {
        let j = rng.range(0, i as i32 + 1) as usize;
        items.swap(i, j);
    }
}

pub(crate) fn neighbor_offsets(rng: &mut RandomNumberGenerator) -> [(i32, i32); 8] {
    let mut offsets = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
    shuffle(&mut offsets, rng);
    offsets
}

fn cellular_cave(width: i32, height: i32, rng: &mut RandomNumberGenerator) -> TileLayer {
    let w = width.max(0) as usize;
    let h = height.max(0) as usize;
    let mut alive = vec![false; w * h];
    for cell in alive.iter_mut() {
        *cell = rng.rand::<f64>() < OPEN_PROBABILITY;
    }

    for _ in 0..SMOOTHING_PASSES {
        let mut next = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                let mut count = 0;
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0 || ny < 0 || nx >= width || ny >= height {
                            continue;
                        }
                        if alive[ny as usize * w + nx as usize] {
                            count += 1;
                        }
                    }
                }
                let idx = y * w + x;
                next[idx] = if alive[idx] {
                    SURVIVE.contains(&count)
                } else {
                    BORN.contains(&count)
                };
            }
        }
        alive = next;
    }

    let mut layer = TileLayer::filled(width, height, Tile::Wall);
    for y in 0..h {
        for x in 0..w {
            if alive[y * w + x] {
                layer.set(x as i32, y as i32, Tile::Floor);
            }
        }
    }
    layer
}

pub struct Builder {
    width: i32,
    height: i32,
    depth: i32,
    tiles: TileVolume,
    regions: Vec<Vec<u32>>,
}

impl Builder {
    pub fn new(width: i32, height: i32, depth: i32, rng: &mut RandomNumberGenerator) -> Self {
        let layers = (0..depth.max(1))
            .map(|_| cellular_cave(width, height, rng))
            .collect();
        Self::from_volume(TileVolume::from_layers(layers), rng)
    }

    pub fn from_volume(tiles: TileVolume, rng: &mut RandomNumberGenerator) -> Self {
        let (width, height, depth) = (tiles.width(), tiles.height(), tiles.depth());
        let cells = (width.max(0) * height.max(0)) as usize;
        let mut builder = Self {
            width,
            height,
            depth,
            tiles,
            regions: vec![vec![0; cells]; depth.max(0) as usize],
        };
        for z in 0..depth {
            builder.setup_regions(z, rng);
        }
        builder.connect_all_regions(rng);
        builder
    }

    pub fn tiles(&self) -> &TileVolume {
        &self.tiles
    }

    pub fn into_tiles(self) -> TileVolume {
        self.tiles
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn region(&self, x: i32, y: i32, z: i32) -> u32 {
        self.region_idx(x, y, z)
            .map_or(0, |(z, idx)| self.regions[z][idx])
    }

    fn region_idx(&self, x: i32, y: i32, z: i32) -> Option<(usize, usize)> {
        if self.tiles.in_bounds(x, y, z) {
            Some((z as usize, (y * self.width + x) as usize))
        } else {
            None
        }
    }

    fn set_region(&mut self, x: i32, y: i32, z: i32, region: u32) {
        if let Some((z, idx)) = self.region_idx(x, y, z) {
            self.regions[z][idx] = region;
        }
    }

    fn can_fill_region(&self, x: i32, y: i32, z: i32) -> bool {
        match self.region_idx(x, y, z) {
            Some((level, idx)) => {
                self.regions[level][idx] == 0 && self.tiles.get(x, y, z).is_walkable()
            }
            None => false,
        }
    }

    fn fill_region(
        &mut self,
        region: u32,
        x: i32,
        y: i32,
        z: i32,
        rng: &mut RandomNumberGenerator,
    ) -> usize {
        let mut filled = 1;
        let mut pending = vec![(x, y)];
        self.set_region(x, y, z, region);
        while let Some((cx, cy)) = pending.pop() {
            for (dx, dy) in neighbor_offsets(rng) {
                let (nx, ny) = (cx + dx, cy + dy);
                if self.can_fill_region(nx, ny, z) {
                    self.set_region(nx, ny, z, region);
                    pending.push((nx, ny));
                    filled += 1;
                }
            }
        }
        filled
    }

    fn remove_region(&mut self, region: u32, z: i32) {
        for x in 0..self.width {
            for y in 0..self.height {
                if self.region(x, y, z) == region {
                    self.set_region(x, y, z, 0);
                    self.tiles.set(x, y, z, Tile::Wall);
                }
            }
        }
    }

    fn setup_regions(&mut self, z: i32, rng: &mut RandomNumberGenerator) {
        let mut region = 1;
        let mut removed = 0;
        for x in 0..self.width {
            for y in 0..self.height {
                if !self.can_fill_region(x, y, z) {
                    continue;
                }
                let filled = self.fill_region(region, x, y, z, rng);
                if filled <= MIN_REGION_SIZE {
                    self.remove_region(region, z);
                    removed += 1;
                } else {
                    region += 1;
                }
            }
        }
        let kept = region - 1;
        debug!(z, kept, removed, "labelled cave regions");
        if kept == 0 {
            warn!(z, "level has no region large enough to keep");
        }
    }

    fn find_region_overlaps(
        &self,
        z: i32,
        upper: u32,
        lower: u32,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<(i32, i32)> {
        let mut matches = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                if self.tiles.get(x, y, z) == Tile::Floor
                    && self.tiles.get(x, y, z + 1) == Tile::Floor
                    && self.region(x, y, z) == upper
                    && self.region(x, y, z + 1) == lower
                {
                    matches.push((x, y));
                }
            }
        }
        shuffle(&mut matches, rng);
        matches
    }

    fn connect_regions(
        &mut self,
        z: i32,
        upper: u32,
        lower: u32,
        rng: &mut RandomNumberGenerator,
    ) -> bool {
        let overlap = self.find_region_overlaps(z, upper, lower, rng);
        let Some(&(x, y)) = overlap.first() else {
            return false;
        };
        self.tiles.set(x, y, z, Tile::StairsDown);
        self.tiles.set(x, y, z + 1, Tile::StairsUp);
        debug!(x, y, z, upper, lower, "placed stairs");
        true
    }

    fn connect_all_regions(&mut self, rng: &mut RandomNumberGenerator) {
        for z in 0..self.depth - 1 {
            let mut attempted: HashSet<(u32, u32)> = HashSet::new();
            for x in 0..self.width {
                for y in 0..self.height {
                    let key = (self.region(x, y, z), self.region(x, y, z + 1));
                    if self.tiles.get(x, y, z) == Tile::Floor
                        && self.tiles.get(x, y, z + 1) == Tile::Floor
                        && !attempted.contains(&key)
                    {
                        if !self.connect_regions(z, key.0, key.1, rng) {
                            warn!(z, upper = key.0, lower = key.1, "regions share no floor");
                        }
                        attempted.insert(key);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn region_members(builder: &Builder, z: i32) -> BTreeMap<u32, Vec<(i32, i32)>> {
        let mut members: BTreeMap<u32, Vec<(i32, i32)>> = BTreeMap::new();
        for x in 0..builder.width() {
            for y in 0..builder.height() {
                let region = builder.region(x, y, z);
                if region != 0 {
                    members.entry(region).or_default().push((x, y));
                }
            }
        }
        members
    }

    #[test]
    fn small_pockets_are_walled_up() {
        // a 5x5 room (25 cells) and a 3x3 pocket (9 cells)
        let volume = TileVolume::parse(&[&[
            "############",
            "#.....######",
            "#.....######",
            "#.....##...#",
            "#.....##...#",
            "#.....##...#",
            "############",
        ]]);
        let mut rng = RandomNumberGenerator::seeded(7);
        let builder = Builder::from_volume(volume, &mut rng);
        let members = region_members(&builder, 0);
        assert_eq!(members.len(), 1);
        assert_eq!(members[&1].len(), 25);
        assert_eq!(builder.tiles().get(9, 4, 0), Tile::Wall);
        assert_eq!(builder.region(9, 4, 0), 0);
    }

    #[test]
    fn region_of_exactly_threshold_is_removed() {
        // 4x5 = 20 cells
        let volume = TileVolume::parse(&[&[
            "######", "#....#", "#....#", "#....#", "#....#", "#....#", "######",
        ]]);
        let mut rng = RandomNumberGenerator::seeded(1);
        let builder = Builder::from_volume(volume, &mut rng);
        assert!(region_members(&builder, 0).is_empty());
        assert_eq!(builder.tiles().layer(0).map(|l| l.count(Tile::Floor)), Some(0));
    }

    #[test]
    fn diagonal_contact_joins_regions() {
        let volume = TileVolume::parse(&[&[
            "###########",
            "#....######",
            "#....######",
            "#....######",
            "#####......",
            "#####......",
            "#####......",
        ]]);
        let mut rng = RandomNumberGenerator::seeded(3);
        let builder = Builder::from_volume(volume, &mut rng);
        let members = region_members(&builder, 0);
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn fill_order_does_not_change_membership() {
        let level: [&str; 8] = [
            "##############",
            "#.....##.....#",
            "#.....##.....#",
            "#.....##.....#",
            "#.....##.....#",
            "#.....##.....#",
            "#.....##.....#",
            "##############",
        ];
        let labelled = |seed| {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let builder = Builder::from_volume(TileVolume::parse(&[&level]), &mut rng);
            region_members(&builder, 0)
        };
        let first = labelled(5);
        assert_eq!(first.len(), 2);
        for seed in [6, 7, 8] {
            assert_eq!(labelled(seed), first);
        }
    }

    #[test]
    fn overlapping_regions_get_one_stair_pair() {
        let level = [
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ];
        let volume = TileVolume::parse(&[&level, &level]);
        let mut rng = RandomNumberGenerator::seeded(11);
        let builder = Builder::from_volume(volume, &mut rng);
        let tiles = builder.tiles();
        let down = tiles.layer(0).map(|l| l.count(Tile::StairsDown));
        let up = tiles.layer(1).map(|l| l.count(Tile::StairsUp));
        assert_eq!(down, Some(1));
        assert_eq!(up, Some(1));
        for x in 0..tiles.width() {
            for y in 0..tiles.height() {
                if tiles.get(x, y, 0) == Tile::StairsDown {
                    assert_eq!(tiles.get(x, y, 1), Tile::StairsUp);
                }
            }
        }
    }

    #[test]
    fn disjoint_regions_stay_unconnected() {
        let upper = [
            "##############",
            "#......#######",
            "#......#######",
            "#......#######",
            "#......#######",
            "##############",
        ];
        let lower = [
            "##############",
            "#######......#",
            "#######......#",
            "#######......#",
            "#######......#",
            "##############",
        ];
        let volume = TileVolume::parse(&[&upper, &lower]);
        let mut rng = RandomNumberGenerator::seeded(5);
        let builder = Builder::from_volume(volume, &mut rng);
        assert_eq!(
            builder.tiles().layer(0).map(|l| l.count(Tile::StairsDown)),
            Some(0)
        );
    }

    #[test]
    fn generated_caves_keep_only_large_regions() {
        let mut rng = RandomNumberGenerator::seeded(42);
        let builder = Builder::new(60, 30, 3, &mut rng);
        for z in 0..builder.depth() {
            let members = region_members(&builder, z);
            for cells in members.values() {
                assert!(cells.len() > MIN_REGION_SIZE);
            }
            for x in 0..builder.width() {
                for y in 0..builder.height() {
                    if builder.tiles().get(x, y, z).is_walkable() {
                        assert_ne!(builder.region(x, y, z), 0, "stray floor at {x},{y},{z}");
                    }
                }
            }
        }
    }
}
