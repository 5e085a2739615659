/// Player typestates. A transition is only reachable through the methods
/// below, so the player can never be Dying and Reaching at once:
/// - PUBLIC  : PlayerState and PlayerContext
/// - PRIVATE : context helpers, the `_state` marker
///
/// Knows nothing about the grid or the rng, callers pass plain limits and
/// positions in.
use crate::engine::Point;

/// seconds the death blink lasts
pub const DEATH_TIME: f32 = 3.0;
/// seconds the goal hop lasts
pub const GOAL_TIME: f32 = 1.0;
// negative because top left is origin
const HOP_HEIGHT: f32 = -15.0;

#[derive(Debug, Copy, Clone)]
pub struct Active;

#[derive(Debug, Copy, Clone)]
pub struct Dying;

#[derive(Debug, Copy, Clone)]
pub struct Reaching;

pub enum IsDying {
    Done(PlayerState<Active>),
    InProgress(PlayerState<Dying>),
}

pub enum IsReaching {
    Done(PlayerState<Active>),
    InProgress(PlayerState<Reaching>),
}

#[derive(Debug, Copy, Clone)]
/// Shared data for :
/// - physics : position + heading + speed
/// - display : opacity + translate
/// - timing  : elapsed animation time against the animation window
pub struct PlayerContext {
    pub position: Point,
    pub heading: Point,
    pub speed: f32,
    pub opacity: f32,
    pub translate: Point,
    pub animation_time: f32,
    pub animation_timer: f32,
}

#[derive(Debug, Copy, Clone)]
pub struct PlayerState<S> {
    context: PlayerContext,
    // marker only, differentiates states at compile time
    _state: S,
}

impl<S> PlayerState<S> {
    pub fn context(&self) -> &PlayerContext {
        &self.context
    }
}

impl PlayerState<Active> {
    pub fn new(position: Point, speed: f32) -> Self {
        PlayerState {
            context: PlayerContext {
                position,
                heading: Point::default(),
                speed,
                opacity: 1.0,
                translate: Point::default(),
                animation_time: 0.0,
                animation_timer: 0.0,
            },
            _state: Active,
        }
    }

    pub fn move_to(mut self, heading: Point) -> Self {
        self.context.heading = heading;
        self
    }

    /// `limits` is the last valid column (x) and row (y)
    pub fn update(mut self, dt: f32, limits: Point) -> Self {
        self.context = self.context.advance(dt, limits);
        self
    }

    pub fn kill(self) -> PlayerState<Dying> {
        PlayerState {
            context: self.context.on_state_transition(DEATH_TIME),
            _state: Dying,
        }
    }

    pub fn reach(self, row: f32) -> PlayerState<Reaching> {
        PlayerState {
            context: self.context.snap_to_row(row).on_state_transition(GOAL_TIME),
            _state: Reaching,
        }
    }

    pub fn respawn(self, position: Point) -> Self {
        PlayerState::new(position, self.context.speed)
    }
}

impl PlayerState<Dying> {
    /// Returns an enum because dying can:
    /// - End      (Done)
    /// - Continue (InProgress)
    pub fn update(mut self, dt: f32) -> IsDying {
        self.context = self.context.tick(dt);
        self.context.opacity = (1.0 - self.context.animation_time).sin().abs();
        if self.context.finished() {
            IsDying::Done(self.revive())
        } else {
            IsDying::InProgress(self)
        }
    }

    pub fn revive(self) -> PlayerState<Active> {
        PlayerState {
            context: self.context.settle(),
            _state: Active,
        }
    }
}

impl PlayerState<Reaching> {
    pub fn update(mut self, dt: f32) -> IsReaching {
        self.context = self.context.tick(dt);
        self.context.translate.y = self.context.animation_time.sin().abs() * HOP_HEIGHT;
        if self.context.finished() {
            IsReaching::Done(self.land())
        } else {
            IsReaching::InProgress(self)
        }
    }

    pub fn land(self) -> PlayerState<Active> {
        PlayerState {
            context: self.context.settle(),
            _state: Active,
        }
    }
}

impl PlayerContext {
    /// Move along the heading. Each axis is accepted on its own so a
    /// diagonal push into a wall still slides along it.
    fn advance(mut self, dt: f32, limits: Point) -> Self {
        let step = self.speed * dt;
        let x = self.position.x + self.heading.x * step;
        let y = self.position.y + self.heading.y * step;
        if (0.0..=limits.x).contains(&x) {
            self.position.x = x;
        }
        if (0.0..=limits.y).contains(&y) {
            self.position.y = y;
        }
        self
    }

    fn tick(mut self, dt: f32) -> Self {
        self.animation_time += dt;
        self
    }

    fn finished(&self) -> bool {
        self.animation_time >= self.animation_timer
    }

    /// animations ignore input, drop whatever was held
    fn on_state_transition(mut self, timer: f32) -> Self {
        self.heading = Point::default();
        self.animation_time = 0.0;
        self.animation_timer = timer;
        self
    }

    fn snap_to_row(mut self, row: f32) -> Self {
        self.position.y = row;
        self
    }

    fn settle(mut self) -> Self {
        self.opacity = 1.0;
        self.translate = Point::default();
        self.animation_time = 0.0;
        self.animation_timer = 0.0;
        self
    }
}
