use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{field_of_view, Algorithm2D, BaseMap, DistanceAlg};
use smallvec::SmallVec;

use super::volume::TileLayer;

/// Field-of-view oracle for one depth level.
///
/// The light-blocking predicate is captured when the oracle is built and is
/// never refreshed, so cells dug open afterwards still block sight here.
#[derive(Clone, Debug)]
pub struct LevelFov {
    width: i32,
    height: i32,
    blocks_light: Vec<bool>,
}

impl LevelFov {
    pub fn from_layer(layer: &TileLayer) -> Self {
        let blocks_light = layer
            .tiles
            .iter()
            .map(|tile| tile.is_blocking_light())
            .collect::<Vec<bool>>();

        Self {
            width: layer.width,
            height: layer.height,
            blocks_light,
        }
    }

    pub fn blocks_light(&self, point: Point) -> bool {
        if !self.contains(point) {
            return true;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.blocks_light.get(idx).copied().unwrap_or(true)
    }

    fn contains(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn compute<F>(&self, origin_x: i32, origin_y: i32, radius: i32, mut visit: F)
    where
        F: FnMut(i32, i32, i32, f32),
    {
        let origin = Point::new(origin_x, origin_y);
        if !self.contains(origin) || radius < 0 {
            return;
        }
        let mut cells = field_of_view(origin, radius, self);
        cells.retain(|point| self.contains(*point));
        cells.sort_by_key(|point| (point.y, point.x));
        cells.dedup();
        for point in cells {
            let distance = DistanceAlg::Pythagoras.distance2d(origin, point).round() as i32;
            visit(point.x, point.y, distance, 1.0);
        }
    }

    pub fn visible_points(&self, origin_x: i32, origin_y: i32, radius: i32) -> Vec<Point> {
        let mut points = Vec::new();
        self.compute(origin_x, origin_y, radius, |x, y, _, _| {
            points.push(Point::new(x, y))
        });
        points
    }
}

impl BaseMap for LevelFov {
    fn is_opaque(&self, idx: usize) -> bool {
        let point = self.index_to_point2d(idx);
        self.blocks_light(point)
    }

    fn get_available_exits(&self, _idx: usize) -> SmallVec<[(usize, f32); 10]> {
        SmallVec::new()
    }
}

impl Algorithm2D for LevelFov {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tile::Tile;
    use crate::map::volume::TileVolume;

    #[test]
    fn walls_hide_cells_behind_them() {
        let volume = TileVolume::parse(&[&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#######",
        ]]);
        let fov = LevelFov::from_layer(volume.layer(0).expect("level"));
        let seen = fov.visible_points(1, 1, 8);
        assert!(seen.contains(&Point::new(2, 2)));
        assert!(seen.contains(&Point::new(3, 1)));
        assert!(!seen.contains(&Point::new(5, 1)));
    }

    #[test]
    fn snapshot_ignores_later_tile_changes() {
        let mut volume = TileVolume::parse(&[&["#####", "#.#.#", "#####"]]);
        let fov = LevelFov::from_layer(volume.layer(0).expect("level"));
        volume.set(2, 1, 0, Tile::Floor);
        assert!(fov.blocks_light(Point::new(2, 1)));
        assert!(!fov.visible_points(1, 1, 5).contains(&Point::new(3, 1)));
    }

    #[test]
    fn origin_outside_level_sees_nothing() {
        let volume = TileVolume::filled(5, 5, 1, Tile::Floor);
        let fov = LevelFov::from_layer(volume.layer(0).expect("level"));
        assert!(fov.visible_points(-1, 2, 3).is_empty());
    }
}
