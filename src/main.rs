use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result};
use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use cavern_crawl::{
    Game, GameConfig, GameError, GameStatus,
    data::items::Item,
    ecs::components::Experience,
    render::{draw_centered_screen, draw_item_menu, draw_log, draw_map, draw_stats},
};
use chrono::Local;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SCREEN_WIDTH: i32 = 80;
const VIEW_HEIGHT: i32 = 40;
const STATS_ROW: i32 = 41;
const LOG_START: i32 = 43;
const LOG_ROWS: usize = 7;
const LOG_KEEP: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ItemAction {
    Drop,
    Eat,
    Wield,
    Wear,
}

impl ItemAction {
    fn title(self) -> &'static str {
        match self {
            ItemAction::Drop => "Choose the item you wish to drop",
            ItemAction::Eat => "Choose the item you wish to eat",
            ItemAction::Wield => "Choose the item you wish to wield (0 for none)",
            ItemAction::Wear => "Choose the item you wish to wear (0 for none)",
        }
    }

    fn accepts(self, item: &Item) -> bool {
        match self {
            ItemAction::Drop => true,
            ItemAction::Eat => item.edible.is_some(),
            ItemAction::Wield => item.is_wieldable(),
            ItemAction::Wear => item.is_wearable(),
        }
    }

    fn allows_none(self) -> bool {
        matches!(self, ItemAction::Wield | ItemAction::Wear)
    }
}

enum Screen {
    Play,
    Inventory,
    Items(ItemAction),
    Pickup(HashSet<usize>),
    GainStat,
}

struct CavernState {
    game: Game,
    screen: Screen,
    log: Vec<String>,
}

impl GameState for CavernState {
    fn tick(&mut self, ctx: &mut BTerm) {
        if let Err(err) = self.handle_input(ctx) {
            error!(%err, "game aborted");
            ctx.quit();
            return;
        }
        self.collect_messages();
        if self.game.stat_choice_pending() && !self.game.is_over() {
            self.screen = Screen::GainStat;
        }
        ctx.cls();
        self.draw(ctx);
    }
}

impl CavernState {
    fn new(game: Game) -> Self {
        let mut state = Self {
            game,
            screen: Screen::Play,
            log: Vec::new(),
        };
        state.collect_messages();
        state
    }

    fn collect_messages(&mut self) {
        self.log.extend(self.game.take_messages());
        let overflow = self.log.len().saturating_sub(LOG_KEEP);
        self.log.drain(..overflow);
    }

    fn handle_input(&mut self, ctx: &mut BTerm) -> Result<(), GameError> {
        let Some(key) = ctx.key else {
            return Ok(());
        };
        if self.game.is_over() {
            if matches!(key, VirtualKeyCode::Escape | VirtualKeyCode::Return) {
                ctx.quit();
            }
            return Ok(());
        }
        match std::mem::replace(&mut self.screen, Screen::Play) {
            Screen::Play => self.play_input(key, ctx.shift),
            Screen::Inventory => Ok(()),
            Screen::Items(action) => self.item_input(action, key),
            Screen::Pickup(selected) => self.pickup_input(selected, key),
            Screen::GainStat => {
                let choice = letter_to_option(key);
                if choice >= 0 {
                    self.game.apply_stat_choice(choice as usize);
                }
                if self.game.stat_choice_pending() {
                    self.screen = Screen::GainStat;
                }
                Ok(())
            }
        }
    }

    fn play_input(&mut self, key: VirtualKeyCode, shift: bool) -> Result<(), GameError> {
        match key {
            VirtualKeyCode::Left | VirtualKeyCode::H | VirtualKeyCode::Numpad4 => {
                self.game.player_move(-1, 0, 0)?;
            }
            VirtualKeyCode::Right | VirtualKeyCode::L | VirtualKeyCode::Numpad6 => {
                self.game.player_move(1, 0, 0)?;
            }
            VirtualKeyCode::Up | VirtualKeyCode::K | VirtualKeyCode::Numpad8 => {
                self.game.player_move(0, -1, 0)?;
            }
            VirtualKeyCode::Down | VirtualKeyCode::J | VirtualKeyCode::Numpad2 => {
                self.game.player_move(0, 1, 0)?;
            }
            VirtualKeyCode::Comma if shift => {
                self.game.player_move(0, 0, -1)?;
            }
            VirtualKeyCode::Period if shift => {
                self.game.player_move(0, 0, 1)?;
            }
            VirtualKeyCode::Comma | VirtualKeyCode::G => self.start_pickup()?,
            VirtualKeyCode::I => self.open_items(None),
            VirtualKeyCode::D => self.open_items(Some(ItemAction::Drop)),
            VirtualKeyCode::E => self.open_items(Some(ItemAction::Eat)),
            VirtualKeyCode::W if shift => self.open_items(Some(ItemAction::Wear)),
            VirtualKeyCode::W => self.open_items(Some(ItemAction::Wield)),
            _ => {}
        }
        Ok(())
    }

    fn open_items(&mut self, action: Option<ItemAction>) {
        let player = self.game.player();
        let Some(action) = action else {
            self.screen = Screen::Inventory;
            return;
        };
        let any = self
            .game
            .inventory(player)
            .iter()
            .any(|(_, item)| action.accepts(item));
        if any || action.allows_none() {
            self.screen = Screen::Items(action);
        } else {
            self.log.push("You have nothing to choose from.".to_string());
        }
    }

    fn item_input(&mut self, action: ItemAction, key: VirtualKeyCode) -> Result<(), GameError> {
        let player = self.game.player();
        if key == VirtualKeyCode::Escape {
            return Ok(());
        }
        if key == VirtualKeyCode::Key0 && action.allows_none() {
            let done = match action {
                ItemAction::Wield => self.game.wield(player, None),
                _ => self.game.wear(player, None),
            };
            if done {
                self.game.end_turn()?;
            }
            return Ok(());
        }
        let choice = letter_to_option(key);
        let item = (choice >= 0)
            .then(|| {
                self.game
                    .inventory(player)
                    .into_iter()
                    .find(|(slot, item)| *slot == choice as usize && action.accepts(item))
            })
            .flatten();
        let Some((slot, _)) = item else {
            self.screen = Screen::Items(action);
            return Ok(());
        };
        let done = match action {
            ItemAction::Drop => self.game.drop_item(player, slot)?,
            ItemAction::Eat => self.game.eat(player, slot),
            ItemAction::Wield => self.game.wield(player, Some(slot)),
            ItemAction::Wear => self.game.wear(player, Some(slot)),
        };
        if done {
            self.game.end_turn()?;
        }
        Ok(())
    }

    fn floor_items(&self) -> Vec<Item> {
        self.game
            .ecs()
            .location(self.game.player())
            .map(|at| self.game.map().get_items_at(at.x, at.y, at.z).to_vec())
            .unwrap_or_default()
    }

    fn start_pickup(&mut self) -> Result<(), GameError> {
        match self.floor_items().len() {
            0 => self.log.push("There is nothing here to pick up.".to_string()),
            1 => self.pick_up(&[0])?,
            _ => self.screen = Screen::Pickup(HashSet::new()),
        }
        Ok(())
    }

    fn pickup_input(
        &mut self,
        mut selected: HashSet<usize>,
        key: VirtualKeyCode,
    ) -> Result<(), GameError> {
        match key {
            VirtualKeyCode::Escape => {}
            VirtualKeyCode::Return => {
                let mut indices: Vec<usize> = selected.into_iter().collect();
                indices.sort_unstable();
                if !indices.is_empty() {
                    self.pick_up(&indices)?;
                }
            }
            key => {
                let choice = letter_to_option(key);
                if choice >= 0 && (choice as usize) < self.floor_items().len() {
                    let index = choice as usize;
                    if !selected.remove(&index) {
                        selected.insert(index);
                    }
                }
                self.screen = Screen::Pickup(selected);
            }
        }
        Ok(())
    }

    fn pick_up(&mut self, indices: &[usize]) -> Result<(), GameError> {
        let player = self.game.player();
        let floor = self.floor_items();
        let all = self.game.pickup_items(player, indices)?;
        if !all {
            self.log
                .push("Your inventory is full! Not all items were picked up.".to_string());
        } else if let [index] = indices {
            if let Some(item) = floor.get(*index) {
                self.log
                    .push(format!("You pick up {}.", item.describe_a(false)));
            }
        } else {
            self.log.push("You pick up several objects.".to_string());
        }
        self.game.end_turn()
    }

    fn draw(&mut self, ctx: &mut BTerm) {
        match self.game.status() {
            GameStatus::Won => {
                draw_centered_screen(
                    ctx,
                    "You have won!",
                    "Press [Enter] to leave the caves.",
                    RGB::named(GREEN),
                );
                return;
            }
            GameStatus::Lost => {
                draw_centered_screen(
                    ctx,
                    "You have lost! :(",
                    "Press [Enter] to leave the caves.",
                    RGB::named(RED),
                );
                return;
            }
            GameStatus::Playing => {}
        }

        let visible: HashSet<Point> = self.game.refresh_player_view().into_iter().collect();
        draw_map(
            ctx,
            &self.game,
            &visible,
            Point::new(0, 0),
            Point::new(SCREEN_WIDTH, VIEW_HEIGHT),
        );
        if let Some(stats) = self.game.player_stats() {
            draw_stats(ctx, &stats, STATS_ROW);
        }
        draw_log(ctx, &self.log, LOG_START, LOG_ROWS);

        let player = self.game.player();
        let equipment = self.game.equipment(player);
        let equipped: Vec<usize> = self
            .game
            .inventory(player)
            .into_iter()
            .map(|(slot, _)| slot)
            .filter(|slot| equipment.is_equipped(*slot))
            .collect();
        match &self.screen {
            Screen::Play => {}
            Screen::Inventory => {
                let items = self.game.inventory(player);
                draw_item_menu(ctx, "Inventory", &items, &equipped);
            }
            Screen::Items(action) => {
                let items: Vec<(usize, Item)> = self
                    .game
                    .inventory(player)
                    .into_iter()
                    .filter(|(_, item)| action.accepts(item))
                    .collect();
                draw_item_menu(ctx, action.title(), &items, &equipped);
            }
            Screen::Pickup(selected) => {
                let items: Vec<(usize, Item)> =
                    self.floor_items().into_iter().enumerate().collect();
                let marked: Vec<usize> = selected.iter().copied().collect();
                draw_item_menu(
                    ctx,
                    "Choose the items you wish to pick up, then [Enter]",
                    &items,
                    &marked,
                );
            }
            Screen::GainStat => {
                let options = self
                    .game
                    .ecs()
                    .get::<Experience>(player)
                    .map(|experience| experience.stat_options)
                    .unwrap_or_default();
                let height = options.len() as i32 + 4;
                ctx.draw_box(2, 2, 50, height, RGB::named(GRAY), RGB::named(BLACK));
                ctx.print_color(
                    4,
                    3,
                    RGB::named(YELLOW),
                    RGB::named(BLACK),
                    "Choose a stat to increase:",
                );
                for (row, option) in options.iter().enumerate() {
                    let letter = (b'a' + row as u8) as char;
                    ctx.print(4, 5 + row as i32, format!("{letter} - {}", option.label()));
                }
            }
        }
    }
}

fn setup_logging() -> Result<()> {
    let session = Local::now().format("session_%Y%m%d_%H%M%S").to_string();
    let log_dir = PathBuf::from("logs").join(&session);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "cavern.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    // The terminal owns stdout; the file writer has to outlive main_loop.
    std::mem::forget(guard);
    info!(%session, "logging initialised");
    Ok(())
}

fn main() -> Result<()> {
    setup_logging()?;
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => GameConfig::default(),
    };
    let game = Game::new(config).context("generating the caves")?;

    let context = BTermBuilder::simple80x50()
        .with_title("Cavern Crawl")
        .build()
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    main_loop(context, CavernState::new(game)).map_err(|err| anyhow::anyhow!("{err}"))
}
