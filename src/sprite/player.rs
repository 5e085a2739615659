use crate::engine::{Assets, Point, Rect, Renderer};
use crate::grid::{Grid, Terrain};
use crate::sprite::state::{Active, Dying, IsDying, IsReaching, PlayerContext, PlayerState, Reaching};
use crate::sprite::{Entity, Hitbox};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub fn key(&self) -> &'static str {
        match self {
            Direction::Left => "ArrowLeft",
            Direction::Right => "ArrowRight",
            Direction::Up => "ArrowUp",
            Direction::Down => "ArrowDown",
        }
    }

    fn unit(&self) -> Point {
        match self {
            Direction::Left => Point { x: -1.0, y: 0.0 },
            Direction::Right => Point { x: 1.0, y: 0.0 },
            Direction::Up => Point { x: 0.0, y: -1.0 },
            Direction::Down => Point { x: 0.0, y: 1.0 },
        }
    }
}

/// Sum of the unit vectors of every held direction, opposite keys cancel
pub fn heading(directions: &[Direction]) -> Point {
    directions.iter().fold(Point::default(), |sum, direction| {
        let unit = direction.unit();
        Point {
            x: sum.x + unit.x,
            y: sum.y + unit.y,
        }
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Character {
    Boy,
    CatGirl,
    PinkGirl,
}

impl Character {
    pub const ALL: [Character; 3] = [Character::Boy, Character::CatGirl, Character::PinkGirl];

    pub fn image(&self) -> &'static str {
        match self {
            Character::Boy => "images/char-boy.png",
            Character::CatGirl => "images/char-cat-girl.png",
            Character::PinkGirl => "images/char-pink-girl.png",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Character {
        *Character::ALL.choose(rng).unwrap_or(&Character::Boy)
    }
}

const PLAYER_OFFSET: Point = Point { x: 0.0, y: -10.0 };
const PLAYER_HITBOX: Hitbox = Hitbox::new(17.0, 50.0, 67.0, 60.0);

/// How an animation ended, returned from `Player::update` instead of
/// calling back into the controller
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnimationEnd {
    /// death blink is over, the player already respawned on grass
    Died,
    /// goal hop is over, the controller starts the next level
    Reached,
}

/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State  →  Event    →  To State                    │
/// ├─────────────────────────────────────────────────────────┤
/// │  Active      →  Move     →  Active (new heading)        │
/// │  Active      →  Kill     →  Dying                       │
/// │  Active      →  Reach    →  Reaching                    │
/// │  any         →  Respawn  →  Active                      │
/// │  -------        ------                                  │
/// │  Dying       →  Update   →  Active (when timer expires)  │
/// │  Reaching    →  Update   →  Active (when timer expires)  │
/// └─────────────────────────────────────────────────────────┘
pub enum Event {
    Move(Point),
    Update { dt: f32, limits: Point },
    Kill,
    Reach(f32),
    Respawn(Point),
}

#[derive(Debug, Copy, Clone)]
enum PlayerStateMachine {
    Active(PlayerState<Active>),
    Dying(PlayerState<Dying>),
    Reaching(PlayerState<Reaching>),
}

impl From<PlayerState<Active>> for PlayerStateMachine {
    fn from(state: PlayerState<Active>) -> Self {
        PlayerStateMachine::Active(state)
    }
}

impl From<PlayerState<Dying>> for PlayerStateMachine {
    fn from(state: PlayerState<Dying>) -> Self {
        PlayerStateMachine::Dying(state)
    }
}

impl From<PlayerState<Reaching>> for PlayerStateMachine {
    fn from(state: PlayerState<Reaching>) -> Self {
        PlayerStateMachine::Reaching(state)
    }
}

impl From<IsDying> for PlayerStateMachine {
    fn from(is_dying: IsDying) -> Self {
        match is_dying {
            IsDying::Done(active_state) => active_state.into(),
            IsDying::InProgress(dying_state) => dying_state.into(),
        }
    }
}

impl From<IsReaching> for PlayerStateMachine {
    fn from(is_reaching: IsReaching) -> Self {
        match is_reaching {
            IsReaching::Done(active_state) => active_state.into(),
            IsReaching::InProgress(reaching_state) => reaching_state.into(),
        }
    }
}

impl PlayerStateMachine {
    // consumes the current state, the old one can't be touched afterwards
    fn transition(self, event: Event) -> Self {
        use PlayerStateMachine::*;
        match (self, event) {
            (Active(state), Event::Move(heading)) => state.move_to(heading).into(),
            (Active(state), Event::Update { dt, limits }) => state.update(dt, limits).into(),
            (Active(state), Event::Kill) => state.kill().into(),
            (Active(state), Event::Reach(row)) => state.reach(row).into(),
            (Active(state), Event::Respawn(position)) => state.respawn(position).into(),
            (Dying(state), Event::Update { dt, .. }) => state.update(dt).into(),
            (Dying(state), Event::Respawn(position)) => state.revive().respawn(position).into(),
            (Reaching(state), Event::Update { dt, .. }) => state.update(dt).into(),
            (Reaching(state), Event::Respawn(position)) => state.land().respawn(position).into(),
            // moves, kills and goals while animating are dropped
            _ => self,
        }
    }

    fn context(&self) -> &PlayerContext {
        use PlayerStateMachine::*;
        match self {
            Active(state) => state.context(),
            Dying(state) => state.context(),
            Reaching(state) => state.context(),
        }
    }
}

pub struct Player {
    state: PlayerStateMachine,
    sprite: Entity,
}

/// Player
/// - update() -> state machine Update, reports finished animations
/// - move_to() / kill() / reach_goal() -> state machine transitions
impl Player {
    pub fn new(character: Character, speed: f32) -> Self {
        Player {
            state: PlayerState::new(Point::default(), speed).into(),
            sprite: Entity::new(character.image(), PLAYER_OFFSET, PLAYER_HITBOX),
        }
    }

    pub fn set_character(&mut self, character: Character) {
        self.sprite = Entity::new(character.image(), PLAYER_OFFSET, PLAYER_HITBOX);
    }

    /// Random column on a random grass row, back to Active
    pub fn reset<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        let position = Point {
            x: rng.gen_range(0..grid.columns()) as f32,
            y: grid.random_row(Terrain::Ground, rng) as f32,
        };
        self.state = self.state.transition(Event::Respawn(position));
    }

    pub fn move_to(&mut self, directions: &[Direction]) {
        self.state = self.state.transition(Event::Move(heading(directions)));
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, grid: &Grid, rng: &mut R) -> Option<AnimationEnd> {
        let limits = Point {
            x: grid.columns().saturating_sub(1) as f32,
            y: grid.rows().saturating_sub(1) as f32,
        };
        let before = self.state;
        self.state = self.state.transition(Event::Update { dt, limits });
        match (before, self.state) {
            (PlayerStateMachine::Dying(_), PlayerStateMachine::Active(_)) => {
                self.reset(grid, rng);
                Some(AnimationEnd::Died)
            }
            (PlayerStateMachine::Reaching(_), PlayerStateMachine::Active(_)) => {
                Some(AnimationEnd::Reached)
            }
            _ => None,
        }
    }

    pub fn kill(&mut self) {
        self.state = self.state.transition(Event::Kill);
    }

    pub fn reach_goal(&mut self, row: usize) {
        self.state = self.state.transition(Event::Reach(row as f32));
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PlayerStateMachine::Active(_))
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, PlayerStateMachine::Dying(_))
    }

    pub fn is_reaching(&self) -> bool {
        matches!(self.state, PlayerStateMachine::Reaching(_))
    }

    pub fn position(&self) -> Point {
        self.state.context().position
    }

    pub fn heading(&self) -> Point {
        self.state.context().heading
    }

    pub fn image(&self) -> &'static str {
        self.sprite.image()
    }

    /// Entity view of the current state, for bounds and drawing
    pub fn entity(&self) -> Entity {
        let context = self.state.context();
        let mut entity = self.sprite.at(context.position);
        entity.opacity = context.opacity;
        entity.translate = context.translate;
        entity
    }

    pub fn bounds(&self) -> Rect {
        self.entity().bounds()
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        self.entity().draw(renderer, assets);
    }

    #[cfg(test)]
    pub fn place(&mut self, position: Point) {
        self.state = self.state.transition(Event::Respawn(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::state::{DEATH_TIME, GOAL_TIME};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classic_grid() -> Grid {
        Grid::new(
            "WSSSGG".chars().filter_map(Terrain::from_letter).collect(),
            5,
        )
    }

    #[test]
    fn heading_sums_held_directions() {
        assert_eq!(heading(&[]), Point::default());
        assert_eq!(heading(&[Direction::Up, Direction::Left]), Point { x: -1.0, y: -1.0 });
        assert_eq!(heading(&[Direction::Left, Direction::Right]), Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn reset_spawns_on_grass() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(11);
        let mut player = Player::new(Character::Boy, 3.0);
        for _ in 0..50 {
            player.reset(&grid, &mut rng);
            let position = player.position();
            assert!(position.y == 4.0 || position.y == 5.0);
            assert_eq!(position.x.fract(), 0.0);
            assert!((0.0..5.0).contains(&position.x));
            assert!(player.is_active());
        }
    }

    #[test]
    fn movement_is_ignored_while_animating() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(1);
        let mut player = Player::new(Character::CatGirl, 3.0);
        player.place(Point { x: 2.0, y: 5.0 });
        player.kill();
        player.move_to(&[Direction::Up]);
        assert_eq!(player.heading(), Point::default());
        player.update(0.5, &grid, &mut rng);
        assert_relative_eq!(player.position().y, 5.0);
        // a goal while dying is dropped, the states stay exclusive
        player.reach_goal(0);
        assert!(player.is_dying());
        assert!(!player.is_reaching());
    }

    #[test]
    fn movement_is_ignored_during_the_goal_hop() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(2);
        let mut player = Player::new(Character::Boy, 3.0);
        player.place(Point { x: 2.0, y: 0.05 });
        player.reach_goal(0);
        assert!(player.is_reaching());

        player.move_to(&[Direction::Left]);
        assert_eq!(player.heading(), Point::default());
        assert_eq!(player.update(0.5, &grid, &mut rng), None);
        assert_relative_eq!(player.position().x, 2.0);
        assert_relative_eq!(player.position().y, 0.0);
        // a hit while hopping is dropped too
        player.kill();
        assert!(player.is_reaching());
        assert!(!player.is_dying());
    }

    #[test]
    fn death_ends_with_respawn_on_grass() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(5);
        let mut player = Player::new(Character::PinkGirl, 3.0);
        player.place(Point { x: 1.0, y: 2.0 });
        player.kill();

        let mut ended = None;
        let mut elapsed = 0.0;
        while ended.is_none() {
            ended = player.update(0.1, &grid, &mut rng);
            elapsed += 0.1;
            assert!(elapsed < DEATH_TIME + 0.5, "death never ends");
        }
        assert_eq!(ended, Some(AnimationEnd::Died));
        assert!(elapsed >= DEATH_TIME - 0.01);
        assert!(player.is_active());
        assert_eq!(grid.terrain_at(player.position().y as usize), Some(Terrain::Ground));
        assert_relative_eq!(player.entity().opacity, 1.0);
    }

    #[test]
    fn goal_hop_reports_reached_once() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(5);
        let mut player = Player::new(Character::Boy, 3.0);
        player.place(Point { x: 1.0, y: 0.05 });
        player.reach_goal(0);
        assert_relative_eq!(player.position().y, 0.0);
        assert_eq!(player.update(GOAL_TIME / 2.0, &grid, &mut rng), None);
        assert_eq!(player.update(GOAL_TIME, &grid, &mut rng), Some(AnimationEnd::Reached));
        assert_eq!(player.update(0.1, &grid, &mut rng), None);
    }
}
