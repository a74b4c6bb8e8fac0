use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, a_star_search};
use smallvec::SmallVec;
use specs::prelude::Entity;
use tracing::{debug, trace};

use crate::{
    ecs::{
        capability::{Capability, CapabilityGroup},
        components::{Destructible, FungusGrowth, TaskList, Viewshed, ZombieState},
    },
    error::GameError,
    game::Game,
    map::{Location, Map},
};

const FUNGUS_GROWTH_CHANCE: f64 = 0.02;
const GROW_ARM_HP: i32 = 20;
const GROW_ARM_ATTACK: i32 = 5;
const SPAWN_SLIME_PERCENT: i32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    Hunt,
    Wander,
    GrowArm,
    SpawnSlime,
}

type TaskCheck = fn(&mut Game, Entity, Task) -> Result<bool, GameError>;

pub fn can_see(game: &Game, viewer: Entity, target: Entity) -> bool {
    let (Some(from), Some(to)) = (game.ecs.position(viewer), game.ecs.position(target)) else {
        return false;
    };
    if from.map.is_none() || from.map != to.map || from.z != to.z {
        return false;
    }
    let Some(viewshed) = game.ecs.get::<Viewshed>(viewer) else {
        return false;
    };
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if dx * dx + dy * dy > viewshed.radius * viewshed.radius {
        return false;
    }
    let Some(fov) = game.map.get_fov(from.z) else {
        return false;
    };
    let mut found = false;
    fov.compute(from.x, from.y, viewshed.radius, |x, y, _, _| {
        if x == to.x && y == to.y {
            found = true;
        }
    });
    found
}

fn can_do_task(game: &mut Game, entity: Entity, task: Task) -> Result<bool, GameError> {
    match task {
        Task::Hunt => Ok(game.ecs.has_capability(entity, CapabilityGroup::Sight)
            && game
                .map
                .player()
                .is_some_and(|player| can_see(game, entity, player))),
        Task::Wander => Ok(true),
        other => Err(GameError::UndefinedTask(other)),
    }
}

fn zombie_can_do_task(game: &mut Game, entity: Entity, task: Task) -> Result<bool, GameError> {
    match task {
        Task::GrowArm => {
            let hp = game.ecs.require::<Destructible>(entity, "Destructible")?.hp;
            let grown = game
                .ecs
                .get::<ZombieState>(entity)
                .is_some_and(|state| state.grown_arm);
            Ok(hp <= GROW_ARM_HP && !grown)
        }
        Task::SpawnSlime => Ok(game.rng.range(0, 101) <= SPAWN_SLIME_PERCENT),
        other => can_do_task(game, entity, other),
    }
}

fn run_tasks(game: &mut Game, entity: Entity, check: TaskCheck) -> Result<(), GameError> {
    let tasks = game.ecs.require::<TaskList>(entity, "TaskList")?.tasks;
    for task in tasks {
        if check(game, entity, task)? {
            trace!(?entity, ?task, "performing task");
            return perform(game, entity, task);
        }
    }
    Ok(())
}

pub fn task_act(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    run_tasks(game, entity, can_do_task)
}

pub fn zombie_act(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    run_tasks(game, entity, zombie_can_do_task)
}

fn perform(game: &mut Game, entity: Entity, task: Task) -> Result<(), GameError> {
    match task {
        Task::Hunt => hunt(game, entity),
        Task::Wander => wander(game, entity),
        Task::GrowArm => grow_arm(game, entity),
        Task::SpawnSlime => spawn_slime(game, entity),
    }
}

fn hunt(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    let Some(player) = game.map.player() else {
        return Ok(());
    };
    let me = game.ecs.location(entity)?;
    let target = game.ecs.location(player)?;

    let offsets = (target.x - me.x).abs() + (target.y - me.y).abs();
    if offsets == 1 && game.ecs.has_capability(entity, Capability::Attacker) {
        game.attack(entity, player)?;
        return Ok(());
    }

    let grid = HuntGrid::new(&game.map, me.z, entity, player);
    let (Some(start), Some(end)) = (grid.index_of(me), grid.index_of(target)) else {
        return Ok(());
    };
    let path = a_star_search(start, end, &grid);
    if path.success && path.steps.len() > 1 {
        let next = grid.index_to_point2d(path.steps[1]);
        game.try_move(entity, next.x, next.y, me.z)?;
    }
    Ok(())
}

fn wander(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    let at = game.ecs.location(entity)?;
    let offset = if game.rng.range(0, 2) == 1 { 1 } else { -1 };
    if game.rng.range(0, 2) == 1 {
        game.try_move(entity, at.x + offset, at.y, at.z)?;
    } else {
        game.try_move(entity, at.x, at.y + offset, at.z)?;
    }
    Ok(())
}

fn grow_arm(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    game.ecs
        .update(entity, |state: &mut ZombieState| state.grown_arm = true);
    game.increase_attack_value(entity, GROW_ARM_ATTACK);
    let at = game.ecs.location(entity)?;
    game.send_message_nearby(at, "An extra arm appears on the giant zombie!");
    debug!(?entity, "giant zombie grew an arm");
    Ok(())
}

fn random_adjacent(game: &mut Game, at: Location) -> Location {
    let dx = game.rng.range(0, 3) - 1;
    let dy = game.rng.range(0, 3) - 1;
    at.offset(dx, dy, 0)
}

fn spawn_slime(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    let at = game.ecs.location(entity)?;
    let spot = random_adjacent(game, at);
    if !game.map.is_empty_floor(spot.x, spot.y, spot.z) {
        return Ok(());
    }
    game.spawn_entity("slime", spot)?;
    Ok(())
}

pub fn fungus_act(game: &mut Game, entity: Entity) -> Result<(), GameError> {
    let remaining = game
        .ecs
        .get::<FungusGrowth>(entity)
        .map_or(0, |growth| growth.remaining);
    if remaining == 0 || game.rng.rand::<f64>() > FUNGUS_GROWTH_CHANCE {
        return Ok(());
    }
    let at = game.ecs.location(entity)?;
    let spot = random_adjacent(game, at);
    if spot == at || !game.map.is_empty_floor(spot.x, spot.y, spot.z) {
        return Ok(());
    }
    game.spawn_entity("fungus", spot)?;
    game.ecs.update(entity, |growth: &mut FungusGrowth| {
        growth.remaining = growth.remaining.saturating_sub(1)
    });
    game.send_message_nearby(spot, "The fungus is spreading!");
    Ok(())
}

struct HuntGrid {
    width: i32,
    height: i32,
    open: Vec<bool>,
}

impl HuntGrid {
    fn new(map: &Map, z: i32, hunter: Entity, prey: Entity) -> Self {
        let (width, height) = (map.width(), map.height());
        let mut open = Vec::with_capacity((width * height).max(0) as usize);
        for y in 0..height {
            for x in 0..width {
                let blocked = map
                    .get_entity_at(x, y, z)
                    .is_some_and(|other| other != hunter && other != prey);
                open.push(!blocked && map.get_tile(x, y, z).is_walkable());
            }
        }
        Self {
            width,
            height,
            open,
        }
    }

    fn index_of(&self, at: Location) -> Option<usize> {
        let point = Point::new(at.x, at.y);
        self.in_bounds(point).then(|| self.point2d_to_index(point))
    }

    fn is_open(&self, point: Point) -> bool {
        self.in_bounds(point) && self.open[self.point2d_to_index(point)]
    }
}

impl BaseMap for HuntGrid {
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let origin = self.index_to_point2d(idx);
        let mut exits = SmallVec::new();
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let next = Point::new(origin.x + dx, origin.y + dy);
            if self.is_open(next) {
                exits.push((self.point2d_to_index(next), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let a = self.index_to_point2d(idx1);
        let b = self.index_to_point2d(idx2);
        ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
    }
}

impl Algorithm2D for HuntGrid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GameConfig, map::TileVolume};

    fn arena() -> Game {
        let tiles = TileVolume::parse(&[&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ]]);
        Game::from_tiles(
            GameConfig {
                seed: Some(3),
                ..GameConfig::default()
            },
            tiles,
            Location::new(1, 1, 0),
        )
        .expect("arena")
    }

    #[test]
    fn base_evaluator_rejects_zombie_tasks() {
        let mut game = arena();
        let newt = game
            .spawn_entity("newt", Location::new(8, 3, 0))
            .expect("newt");
        let err = can_do_task(&mut game, newt, Task::GrowArm).unwrap_err();
        assert!(matches!(err, GameError::UndefinedTask(Task::GrowArm)));
        assert!(can_do_task(&mut game, newt, Task::Wander).expect("wander"));
    }

    #[test]
    fn hunt_needs_sight() {
        let mut game = arena();
        let newt = game
            .spawn_entity("newt", Location::new(3, 1, 0))
            .expect("newt");
        let kobold = game
            .spawn_entity("kobold", Location::new(4, 2, 0))
            .expect("kobold");
        assert!(!can_do_task(&mut game, newt, Task::Hunt).expect("newt"));
        assert!(can_do_task(&mut game, kobold, Task::Hunt).expect("kobold"));
    }

    #[test]
    fn sight_is_limited_by_radius() {
        let mut game = arena();
        let slime = game
            .spawn_entity("slime", Location::new(5, 3, 0))
            .expect("slime");
        let player = game.player();
        assert!(!can_see(&game, slime, player));
        assert!(can_see(&game, player, slime));
    }

    #[test]
    fn hunter_steps_toward_the_player() {
        let mut game = arena();
        let kobold = game
            .spawn_entity("kobold", Location::new(5, 1, 0))
            .expect("kobold");
        hunt(&mut game, kobold).expect("hunt");
        assert_eq!(game.ecs.location(kobold), Ok(Location::new(4, 1, 0)));
    }

    #[test]
    fn adjacent_hunter_attacks() {
        let mut game = arena();
        let kobold = game
            .spawn_entity("kobold", Location::new(2, 1, 0))
            .expect("kobold");
        let before = game
            .ecs
            .get::<Destructible>(game.player())
            .expect("hp")
            .hp;
        hunt(&mut game, kobold).expect("hunt");
        let after = game
            .ecs
            .get::<Destructible>(game.player())
            .expect("hp")
            .hp;
        assert!(after < before);
        assert_eq!(game.ecs.location(kobold), Ok(Location::new(2, 1, 0)));
    }

    #[test]
    fn zombie_grows_one_arm_when_hurt() {
        let mut game = arena();
        let zombie = game
            .spawn_entity("giant zombie", Location::new(8, 3, 0))
            .expect("zombie");
        assert!(!zombie_can_do_task(&mut game, zombie, Task::GrowArm).expect("healthy"));
        game.ecs.update(zombie, |d: &mut Destructible| d.hp = 20);
        assert!(zombie_can_do_task(&mut game, zombie, Task::GrowArm).expect("hurt"));
        grow_arm(&mut game, zombie).expect("grow");
        assert!(!zombie_can_do_task(&mut game, zombie, Task::GrowArm).expect("grown"));
        assert_eq!(game.attack_value(zombie), 13);
    }

    fn named(game: &Game, name: &str) -> Vec<Location> {
        game.map
            .entities()
            .filter(|(_, entity)| game.ecs.name(*entity) == name)
            .map(|(at, _)| at)
            .collect()
    }

    #[test]
    fn fungus_stops_spreading_after_five_growths() {
        let mut game = arena();
        game.take_messages();
        let fungus = game
            .spawn_entity("fungus", Location::new(3, 2, 0))
            .expect("fungus");
        for _ in 0..20_000 {
            fungus_act(&mut game, fungus).expect("grow");
        }
        assert_eq!(named(&game, "fungus").len(), 6);
        let growth = game.ecs.get::<FungusGrowth>(fungus).expect("growth");
        assert_eq!(growth.remaining, 0);
        let spreading = game
            .take_messages()
            .into_iter()
            .filter(|message| message == "The fungus is spreading!")
            .count();
        assert_eq!(spreading, 5);
    }

    #[test]
    fn slimes_appear_only_on_free_cells_next_to_the_zombie() {
        let mut game = arena();
        let zombie = game
            .spawn_entity("giant zombie", Location::new(5, 2, 0))
            .expect("zombie");
        for _ in 0..200 {
            spawn_slime(&mut game, zombie).expect("spawn");
        }
        let slimes = named(&game, "slime");
        assert!((1..=8).contains(&slimes.len()), "{} slimes", slimes.len());
        for at in slimes {
            assert!((at.x - 5).abs() <= 1 && (at.y - 2).abs() <= 1, "{at:?}");
            assert_ne!(at, Location::new(5, 2, 0));
        }
        assert_eq!(game.ecs.location(zombie), Ok(Location::new(5, 2, 0)));
    }

    #[test]
    fn wandering_takes_one_straight_step_at_most() {
        let mut game = arena();
        let newt = game
            .spawn_entity("newt", Location::new(6, 2, 0))
            .expect("newt");
        let mut moved = false;
        for _ in 0..30 {
            let before = game.ecs.location(newt).expect("before");
            wander(&mut game, newt).expect("wander");
            let after = game.ecs.location(newt).expect("after");
            let step = (after.x - before.x).abs() + (after.y - before.y).abs();
            assert!(step <= 1, "{before:?} -> {after:?}");
            assert_eq!(after.z, before.z);
            moved |= step == 1;
        }
        assert!(moved);
    }
}
