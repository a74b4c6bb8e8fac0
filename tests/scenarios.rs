use std::collections::{HashMap, HashSet};

use bracket_random::prelude::RandomNumberGenerator;
use cavern_crawl::{
    Game, GameConfig, MoveOutcome,
    ecs::components::{Position, Stomach},
    engine::SpeedScheduler,
    map::{Location, MapKind, Tile, TileVolume, builder::Builder},
};

fn config(seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    }
}

#[test]
fn dig_then_walk() {
    let tiles = TileVolume::parse(&[&["######", "#..###", "######"]]);
    let mut game = Game::from_tiles(config(1), tiles, Location::new(2, 1, 0)).expect("game");
    let player = game.player();
    let hunger_before = game
        .ecs()
        .get::<Stomach>(player)
        .expect("stomach")
        .fullness;

    assert_eq!(game.player_move(1, 0, 0).expect("dig"), MoveOutcome::Dug);
    assert_eq!(game.map().get_tile(3, 1, 0), Tile::Floor);
    assert!(game.map().get_tile(3, 1, 0).is_walkable());
    // Digging used up the turn, so the player has ticked hunger again.
    let hunger_after = game
        .ecs()
        .get::<Stomach>(player)
        .expect("stomach")
        .fullness;
    assert_eq!(hunger_after, hunger_before - 1);
    assert_eq!(game.ecs().location(player), Ok(Location::new(2, 1, 0)));

    assert_eq!(game.player_move(1, 0, 0).expect("walk"), MoveOutcome::Moved);
    assert_eq!(game.ecs().location(player), Ok(Location::new(3, 1, 0)));
}

#[test]
fn hole_leads_to_a_fresh_boss_cavern() {
    let tiles = TileVolume::parse(&[
        &["#####", "#.>.#", "#####"],
        &["#####", "#.<O#", "#####"],
    ]);
    let mut game = Game::from_tiles(config(2), tiles, Location::new(3, 1, 1)).expect("game");
    let player = game.player();
    let old_id = game.map().id();

    assert_eq!(
        game.player_move(0, 0, 1).expect("jump"),
        MoveOutcome::SwitchedMap
    );
    let map = game.map();
    assert_eq!(map.kind(), MapKind::BossCavern);
    assert_ne!(map.id(), old_id);
    assert_eq!(map.depth(), 1);
    assert_eq!(map.player(), Some(player));

    let at = game.ecs().location(player).expect("placed");
    assert_eq!(at.z, 0);
    assert_eq!(map.get_entity_at(at.x, at.y, at.z), Some(player));
    let position = game.ecs().get::<Position>(player).expect("position");
    assert_eq!(position.map, Some(map.id()));
    // the giant zombie shares the cavern
    assert!(map.entity_count() >= 2);
}

#[test]
fn monsters_cannot_use_the_hole() {
    let tiles = TileVolume::parse(&[&["#####", "#.O.#", "#####"]]);
    let mut game = Game::from_tiles(config(3), tiles, Location::new(1, 1, 0)).expect("game");
    let newt = game
        .spawn_entity("newt", Location::new(3, 1, 0))
        .expect("newt");
    assert_eq!(game.try_move(newt, 2, 1, 0).expect("step"), MoveOutcome::Moved);
    assert_eq!(
        game.try_move(newt, 2, 1, 1).expect("down"),
        MoveOutcome::Rejected
    );
    assert_eq!(game.map().kind(), MapKind::Cave);
}

#[test]
fn generated_regions_are_never_tiny() {
    let mut rng = RandomNumberGenerator::seeded(31);
    let builder = Builder::new(60, 30, 3, &mut rng);
    for z in 0..builder.depth() {
        let mut sizes: HashMap<u32, usize> = HashMap::new();
        for y in 0..builder.height() {
            for x in 0..builder.width() {
                if builder.tiles().get(x, y, z).is_walkable() {
                    let region = builder.region(x, y, z);
                    assert_ne!(region, 0, "walkable cell {x},{y},{z} has no region");
                    *sizes.entry(region).or_default() += 1;
                }
            }
        }
        for (region, size) in sizes {
            assert!(size > 20, "region {region} on level {z} has {size} cells");
        }
    }
}

#[test]
fn faster_actors_act_proportionally_more() {
    let mut scheduler = SpeedScheduler::new();
    scheduler.add('b', 2000, true);
    scheduler.add('n', 1000, true);
    scheduler.add('f', 250, true);

    let mut turns: HashMap<char, usize> = HashMap::new();
    for _ in 0..130 {
        let actor = scheduler.next().expect("always someone due");
        *turns.entry(actor).or_default() += 1;
    }
    // 2000 : 1000 : 250 over 130 turns is 80 : 40 : 10.
    assert!(turns[&'b'].abs_diff(80) <= 1, "{turns:?}");
    assert!(turns[&'n'].abs_diff(40) <= 1, "{turns:?}");
    assert!(turns[&'f'].abs_diff(10) <= 1, "{turns:?}");
}

#[test]
fn a_whole_dungeon_runs_until_the_player_is_asked() {
    let mut game = Game::new(GameConfig {
        width: 50,
        height: 24,
        depth: 2,
        monsters_per_level: 6,
        items_per_level: 4,
        seed: Some(77),
        ..GameConfig::default()
    })
    .expect("dungeon");
    for _ in 0..20 {
        if game.is_over() {
            break;
        }
        game.player_move(1, 0, 0).expect("move");
        assert!(game.map().engine().is_locked());
    }
    let mut seen = HashSet::new();
    for (location, entity) in game.map().entities() {
        assert!(seen.insert(location), "two entities share {location:?}");
        assert_eq!(game.ecs().location(entity), Ok(location));
    }
}
