use crate::browser;
use crate::collision::Collision;
use crate::config::GameConfig;
use crate::engine::input::KeyState;
use crate::engine::{Assets, Game, Rect, Renderer};
use crate::grid::{Grid, CELL_HEIGHT, CELL_WIDTH};
use crate::hud::{self, Title, HEART_IMAGE};
use crate::level::{Phase, RunState};
use crate::sprite::pickup::PickupKind;
use crate::sprite::player::{AnimationEnd, Direction};
use crate::world::World;
use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use futures::join;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │  update  │  world.rs   │    │
/// │    │  GameLoop   ├─────────►│   Session   ├─────────►│   World     │    │
/// │    │  (dt)       │          │   tick()    │          │  update()   │    │
/// │    └──────┬──────┘          └──────┬──────┘          └──────┬──────┘    │
/// │           │                        │                        │           │
/// │     ┌─────┴──────┐          ┌──────┴─────┐      ┌───────────┴────────┐  │
/// │     │  KeyState  │          │  RunState  │      │ hazards → player → │  │
/// │     │  Keyboard  ├─────────►│  level,    │◄─────┤ collision.rs       │  │
/// │     │  Input     │          │  lives ... │      │                    │  │
/// │     └────────────┘          └────────────┘      └────────────────────┘  │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │  1. GameLoop measures dt, drains key events                             │
/// │  2. Session::tick                                                       │
/// │     ├─► Esc : pause / unpause, or restart after game over               │
/// │     └─► Playing only : World::update                                    │
/// │         ├─► hazards drift / recycle                                     │
/// │         ├─► player moves or animates                                    │
/// │         └─► collisions : hazard, water, pickups                         │
/// │  3. finished goal hop → next level (reshuffle if a key was taken)       │
/// │  4. draw : terrain, entities, title, hud, overlays                      │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum GoForWater {
    /// Waiting on images and config
    Loading,
    Loaded(Box<Loaded>),
}

pub struct Loaded {
    session: Session,
    assets: Assets,
}

const ESCAPE: &str = "Escape";
// longest slice of a frame simulated at once, keeps each player step at or
// below a tenth of a cell so the water row is never stepped over
const SIM_STEP: f32 = 1.0 / 30.0;
// blocks are 171px tall images, the bottom row needs the full height
const BLOCK_IMAGE_HEIGHT: f32 = 171.0;
const BOTTOM_MARGIN: f32 = 20.0;

impl GoForWater {
    pub fn new() -> Self {
        GoForWater::Loading
    }

    async fn load_config() -> GameConfig {
        match browser::fetch_json::<GameConfig>(GameConfig::PATH).await {
            Ok(config) => config,
            Err(err) => {
                log!(
                    "No usable {} ({:#}), playing with the default board",
                    GameConfig::PATH,
                    err
                );
                GameConfig::default()
            }
        }
    }

    fn images() -> Vec<&'static str> {
        let mut images = World::images();
        images.push(HEART_IMAGE);
        images
    }
}

impl Default for GoForWater {
    fn default() -> Self {
        GoForWater::new()
    }
}

#[async_trait(?Send)]
impl Game for GoForWater {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            GoForWater::Loading => {
                // config and images load in parallel, total time is the slowest
                let images = Self::images();
                let (config, assets) = join!(Self::load_config(), Assets::load(&images));
                ensure!(
                    assets.is_ready(),
                    "Failed to load sprite images: {}",
                    assets.missing().join(", ")
                );
                let session = Session::new(config, StdRng::from_entropy())?;

                let canvas = session.canvas();
                let element = browser::canvas()?;
                element.set_width(canvas.width as u32);
                element.set_height(canvas.height as u32);

                log!(
                    "Go For Water ready, {} images, board {}",
                    images.len(),
                    session.world().grid().pattern()
                );
                Ok(Box::new(GoForWater::Loaded(Box::new(Loaded { session, assets }))))
            }
            GoForWater::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, dt: f32, keystate: &KeyState) {
        if let GoForWater::Loaded(loaded) = self {
            loaded.session.tick(dt, keystate);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let GoForWater::Loaded(loaded) = self {
            loaded.session.draw(renderer, &loaded.assets);
        }
    }
}

/// Level and run controller: owns the run state and the world, turns key
/// presses into commands and animation ends into level changes
pub struct Session {
    config: GameConfig,
    initial_grid: Grid,
    run: RunState,
    world: World,
    title: Title,
}

impl Session {
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Session> {
        let initial_grid = config.grid().context("Invalid board configuration")?;
        let world = World::new(initial_grid.clone(), config.hazards, config.player_speed, rng);
        Ok(Session {
            config,
            initial_grid,
            run: RunState::new(),
            world,
            title: Title::new(),
        })
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Canvas size the board needs, in pixels
    pub fn canvas(&self) -> Rect {
        let grid = self.world.grid();
        Rect::new(
            0.0,
            0.0,
            grid.columns() as f32 * CELL_WIDTH,
            grid.rows().saturating_sub(1) as f32 * CELL_HEIGHT + BLOCK_IMAGE_HEIGHT + BOTTOM_MARGIN,
        )
    }

    /// One frame: commands always, simulation only while playing
    pub fn tick(&mut self, dt: f32, keystate: &KeyState) {
        if keystate.was_tapped(ESCAPE) {
            if self.run.is_game_over() {
                self.restart();
            } else {
                self.run.toggle_pause();
            }
        }
        self.title.update(dt);

        let directions: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| keystate.is_pressed(direction.key()))
            .collect();
        let mut remaining = dt;
        while remaining > 0.0 && self.run.phase() == Phase::Playing {
            let step = remaining.min(SIM_STEP);
            remaining -= step;
            self.step(step, &directions);
        }
    }

    fn step(&mut self, dt: f32, directions: &[Direction]) {
        let tick = self.world.update(dt, directions, &mut self.run);
        for collision in &tick.collisions {
            self.report(collision);
        }
        if tick.ended == Some(AnimationEnd::Reached) {
            self.next_level();
        }
    }

    fn report(&self, collision: &Collision) {
        match collision {
            Collision::Hit { lives_left: 0 } => {
                log!("Game over at level {} with {} points", self.run.level(), self.run.score())
            }
            Collision::Hit { lives_left } => log!("Hit by a bug, {} lives left", lives_left),
            Collision::Goal { row } => log!("Reached the water on row {}", row),
            Collision::Picked(PickupKind::Key) => log!("Key taken, the next board is reshuffled"),
            Collision::Picked(kind) => log!("Picked up {:?}", kind),
        }
    }

    fn next_level(&mut self) {
        self.run.advance_level();
        if self.run.take_reshuffle() {
            self.world.reshuffle();
        }
        self.world.populate(self.run.level());
        log!(
            "Level {}, board {}",
            self.run.level(),
            self.world.grid().pattern()
        );
    }

    pub fn restart(&mut self) {
        self.run.restart();
        self.title = Title::new();
        self.world.restart(self.initial_grid.clone());
        log!("New run, board {}", self.world.grid().pattern());
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        let canvas = self.canvas();
        renderer.clear(&canvas);
        self.world.draw(renderer, assets, self.config.debug_bounds);
        self.title.draw(renderer, &canvas);
        hud::draw(renderer, assets, &self.run, &canvas);
    }
}
