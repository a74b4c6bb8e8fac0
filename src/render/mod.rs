use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    data::items::Item,
    ecs::components::Renderable,
    game::{Game, PlayerStats},
};

pub fn camera_origin(player: Point, map_size: Point, view_size: Point) -> Point {
    let clamp = |centre: i32, size: i32, view: i32| {
        (centre - view / 2).clamp(0, (size - view).max(0))
    };
    Point::new(
        clamp(player.x, map_size.x, view_size.x),
        clamp(player.y, map_size.y, view_size.y),
    )
}

pub fn draw_map(
    ctx: &mut BTerm,
    game: &Game,
    visible: &HashSet<Point>,
    screen_origin: Point,
    view_size: Point,
) {
    let map = game.map();
    let Ok(at) = game.ecs().location(game.player()) else {
        return;
    };
    let camera = camera_origin(
        Point::new(at.x, at.y),
        Point::new(map.width(), map.height()),
        view_size,
    );

    for sy in 0..view_size.y {
        for sx in 0..view_size.x {
            let (x, y) = (camera.x + sx, camera.y + sy);
            if !map.in_bounds(x, y, at.z) {
                continue;
            }
            let screen_x = screen_origin.x + sx;
            let screen_y = screen_origin.y + sy;
            let tile = map.get_tile(x, y, at.z);
            if visible.contains(&Point::new(x, y)) {
                let (fg, glyph) = match map.get_items_at(x, y, at.z).last() {
                    Some(item) => (item.color, item.glyph),
                    None => (tile.fg(), tile.glyph()),
                };
                ctx.set(screen_x, screen_y, fg, tile.bg(), glyph);
            } else if map.is_explored(x, y, at.z) {
                ctx.set(
                    screen_x,
                    screen_y,
                    RGB::named(DARK_GRAY),
                    RGB::named(BLACK),
                    tile.glyph(),
                );
            }
        }
    }

    for (location, entity) in map.entities() {
        if location.z != at.z || !visible.contains(&Point::new(location.x, location.y)) {
            continue;
        }
        let Some(renderable) = game.ecs().get::<Renderable>(entity) else {
            continue;
        };
        let (sx, sy) = (location.x - camera.x, location.y - camera.y);
        if sx < 0 || sy < 0 || sx >= view_size.x || sy >= view_size.y {
            continue;
        }
        ctx.set(
            screen_origin.x + sx,
            screen_origin.y + sy,
            renderable.color,
            RGB::named(BLACK),
            renderable.glyph,
        );
    }
}

pub fn draw_stats(ctx: &mut BTerm, stats: &PlayerStats, y: i32) {
    let line = format!(
        "HP {}/{}  Atk {}  Def {}  Lvl {}  XP {}  Depth {}",
        stats.hp,
        stats.max_hp,
        stats.attack,
        stats.defense,
        stats.level,
        stats.experience,
        stats.depth + 1,
    );
    ctx.print_color(1, y, RGB::named(WHITE), RGB::named(BLACK), line);
    let hunger = stats.hunger.as_str();
    let (width, _) = ctx.get_char_size();
    let x = width as i32 - hunger.len() as i32 - 1;
    ctx.print_color(x, y, RGB::named(YELLOW), RGB::named(BLACK), hunger);
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32, rows: usize) {
    let skip = log.len().saturating_sub(rows);
    for (row, entry) in log.iter().skip(skip).enumerate() {
        ctx.print(1, start_y + row as i32, entry);
    }
}

pub fn draw_item_menu(ctx: &mut BTerm, title: &str, items: &[(usize, Item)], equipped: &[usize]) {
    let (width, _) = ctx.get_char_size();
    let height = items.len() as i32 + 3;
    ctx.draw_box(2, 2, width as i32 - 5, height, RGB::named(GRAY), RGB::named(BLACK));
    ctx.print_color(4, 3, RGB::named(YELLOW), RGB::named(BLACK), title);
    for (row, (slot, item)) in items.iter().enumerate() {
        let letter = (b'a' + *slot as u8) as char;
        let suffix = if equipped.contains(slot) { " (equipped)" } else { "" };
        ctx.print(
            4,
            4 + row as i32,
            format!("{letter} - {}{suffix}", item.describe_a(false)),
        );
    }
}

pub fn draw_centered_screen(ctx: &mut BTerm, title: &str, subtitle: &str, color: RGB) {
    let (_, height) = ctx.get_char_size();
    let mid = height as i32 / 2;
    ctx.print_color_centered(mid - 1, color, RGB::named(BLACK), title);
    ctx.print_color_centered(mid + 1, RGB::named(WHITE), RGB::named(BLACK), subtitle);
}
