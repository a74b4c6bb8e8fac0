use bracket_random::prelude::RandomNumberGenerator;
use tracing::debug;

use super::tile::Tile;
use super::volume::{TileLayer, TileVolume};

const MIN_LAKES: i32 = 3;
const MAX_LAKES: i32 = 6;
const MAX_LAKE_RADIUS: i32 = 2;

pub fn fill_circle(layer: &mut TileLayer, center_x: i32, center_y: i32, radius: i32, tile: Tile) {
    let mut x = radius;
    let mut y = 0;
    let mut x_change = 1 - (radius << 1);
    let mut y_change = 0;
    let mut radius_error = 0;

    while x >= y {
        for i in (center_x - x)..=(center_x + x) {
            layer.set(i, center_y + y, tile);
            layer.set(i, center_y - y, tile);
        }
        for i in (center_x - y)..=(center_x + y) {
            layer.set(i, center_y + x, tile);
            layer.set(i, center_y - x, tile);
        }

        y += 1;
        radius_error += y_change;
        y_change += 2;
        if (radius_error << 1) + x_change > 0 {
            x -= 1;
            radius_error += x_change;
            x_change += 2;
        }
    }
}

pub fn generate(width: i32, height: i32, rng: &mut RandomNumberGenerator) -> TileVolume {
    let mut layer = TileLayer::filled(width, height, Tile::Wall);
    let radius = (width.min(height) - 2) / 2;
    fill_circle(&mut layer, width / 2, height / 2, radius, Tile::Floor);

    let lakes = rng.range(MIN_LAKES, MAX_LAKES + 1);
    let span_x = (width - MAX_LAKE_RADIUS * 2).max(1);
    let span_y = (height - MAX_LAKE_RADIUS * 2).max(1);
    for _ in 0..lakes {
        let center_x = rng.range(0, span_x) + MAX_LAKE_RADIUS;
        let center_y = rng.range(0, span_y) + MAX_LAKE_RADIUS;
        let lake_radius = rng.range(1, MAX_LAKE_RADIUS + 1);
        fill_circle(&mut layer, center_x, center_y, lake_radius, Tile::Water);
    }
    debug!(width, height, radius, lakes, "carved boss cavern");

    TileVolume::from_layers(vec![layer])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_of_radius_one_fills_a_three_by_three() {
        let mut layer = TileLayer::filled(5, 5, Tile::Wall);
        fill_circle(&mut layer, 2, 2, 1, Tile::Floor);
        assert_eq!(layer.get(2, 2), Tile::Floor);
        assert_eq!(layer.get(1, 2), Tile::Floor);
        assert_eq!(layer.get(2, 1), Tile::Floor);
        assert_eq!(layer.get(0, 2), Tile::Wall);
        assert_eq!(layer.get(2, 4), Tile::Wall);
    }

    #[test]
    fn cavern_is_single_level_with_water_and_floor() {
        let mut rng = RandomNumberGenerator::seeded(99);
        let volume = generate(80, 24, &mut rng);
        assert_eq!(volume.depth(), 1);
        let layer = volume.layer(0).expect("boss level");
        assert!(layer.count(Tile::Floor) > 200);
        assert!(layer.count(Tile::Water) > 0);
        assert_eq!(layer.count(Tile::StairsDown) + layer.count(Tile::StairsUp), 0);
        assert!((0..80).all(|x| layer.get(x, 0) != Tile::Floor));
        assert_eq!(layer.get(0, 0), Tile::Wall);
    }

    #[test]
    fn central_disc_reaches_its_radius() {
        let mut layer = TileLayer::filled(30, 30, Tile::Wall);
        fill_circle(&mut layer, 15, 15, 10, Tile::Floor);
        assert_eq!(layer.get(5, 15), Tile::Floor);
        assert_eq!(layer.get(15, 25), Tile::Floor);
        assert_eq!(layer.get(4, 15), Tile::Wall);
    }
}
