use crate::collision::{self, Collision};
use crate::engine::{Assets, Renderer};
use crate::grid::{Grid, Terrain};
use crate::level::{max_hazard_speed, LevelPlan, RunState};
use crate::sprite::hazard::{HazardPool, HAZARD_IMAGE};
use crate::sprite::pickup::{Pickup, PickupKind};
use crate::sprite::player::{AnimationEnd, Character, Direction, Player};
use crate::sprite::Block;
use rand::rngs::StdRng;

/// Result of one world step
#[derive(Debug, Default, PartialEq)]
pub struct Tick {
    pub ended: Option<AnimationEnd>,
    pub collisions: Vec<Collision>,
}

/// Everything on the board for the current level. The rng lives here too so
/// a seeded world replays exactly.
pub struct World {
    grid: Grid,
    blocks: Vec<Block>,
    player: Player,
    hazards: HazardPool,
    pickups: Vec<Pickup>,
    hazard_count: usize,
    rng: StdRng,
}

impl World {
    pub fn new(grid: Grid, hazard_count: usize, player_speed: f32, mut rng: StdRng) -> Self {
        let character = Character::random(&mut rng);
        let mut world = World {
            blocks: Vec::new(),
            grid,
            player: Player::new(character, player_speed),
            hazards: HazardPool::default(),
            pickups: Vec::new(),
            hazard_count,
            rng,
        };
        world.populate(1);
        world
    }

    /// Rebuild blocks, hazards and pickups for `level` and respawn the player
    pub fn populate(&mut self, level: u32) {
        self.blocks = self
            .grid
            .terrain()
            .iter()
            .enumerate()
            .flat_map(|(row, terrain)| {
                (0..self.grid.columns()).map(move |column| Block::new(*terrain, column, row))
            })
            .collect();
        self.hazards = HazardPool::new(
            self.hazard_count,
            max_hazard_speed(level),
            &self.grid,
            &mut self.rng,
        );
        self.pickups = LevelPlan::for_level(level)
            .pickups()
            .into_iter()
            .map(|kind| Pickup::new(kind, &self.grid, &mut self.rng))
            .collect();
        self.player.reset(&self.grid, &mut self.rng);
    }

    /// Fresh run on `grid`: new character, level 1 layout
    pub fn restart(&mut self, grid: Grid) {
        self.grid = grid;
        self.player.set_character(Character::random(&mut self.rng));
        self.populate(1);
    }

    pub fn reshuffle(&mut self) {
        self.grid.reshuffle(&mut self.rng);
    }

    /// One simulation step: hazards, then the player, then collisions.
    /// A finished goal hop returns right away so the controller can switch
    /// levels before anything else looks at the water row.
    pub fn update(&mut self, dt: f32, directions: &[Direction], run: &mut RunState) -> Tick {
        if run.is_game_over() {
            return Tick::default();
        }
        self.player.move_to(directions);
        self.hazards.update(dt, &self.grid, &mut self.rng);
        let ended = self.player.update(dt, &self.grid, &mut self.rng);
        if ended == Some(AnimationEnd::Reached) {
            return Tick {
                ended,
                collisions: Vec::new(),
            };
        }
        let collisions = collision::resolve(
            &mut self.player,
            &self.hazards,
            &mut self.pickups,
            &self.grid,
            run,
        );
        Tick { ended, collisions }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn hazards(&self) -> &HazardPool {
        &self.hazards
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Sprites the world can draw, for the asset loader
    pub fn images() -> Vec<&'static str> {
        let mut images: Vec<&'static str> = Character::ALL.iter().map(Character::image).collect();
        images.extend([Terrain::Ground, Terrain::Path, Terrain::Water].iter().map(Terrain::image));
        images.extend([PickupKind::Gem, PickupKind::Star, PickupKind::Key].iter().map(PickupKind::image));
        images.push(HAZARD_IMAGE);
        images
    }

    /// Draw order matters : terrain -> pickups -> player -> hazards
    pub fn draw(&self, renderer: &Renderer, assets: &Assets, debug_bounds: bool) {
        self.blocks.iter().for_each(|block| block.draw(renderer, assets));
        self.pickups.iter().for_each(|pickup| pickup.draw(renderer, assets));
        self.player.draw(renderer, assets);
        self.hazards.draw(renderer, assets);

        if debug_bounds {
            self.pickups
                .iter()
                .for_each(|pickup| pickup.entity().draw_bounds(renderer));
            self.hazards
                .iter()
                .for_each(|hazard| hazard.entity().draw_bounds(renderer));
            self.player.entity().draw_bounds(renderer);
        }
    }

    #[cfg(test)]
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    #[cfg(test)]
    pub fn hazards_mut(&mut self) -> &mut HazardPool {
        &mut self.hazards
    }

    #[cfg(test)]
    pub fn pickups_mut(&mut self) -> &mut Vec<Pickup> {
        &mut self.pickups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Point;
    use rand::SeedableRng;

    fn world(seed: u64) -> World {
        let grid = Grid::new(
            "WSSSGG".chars().filter_map(Terrain::from_letter).collect(),
            5,
        );
        World::new(grid, 3, 3.0, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn populate_builds_the_level() {
        let mut world = world(1);
        assert_eq!(world.blocks.len(), 30);
        assert_eq!(world.hazards().len(), 3);
        assert!(world.pickups().is_empty());
        let spawn = world.player().position().y as usize;
        assert_eq!(world.grid().terrain_at(spawn), Some(Terrain::Ground));

        world.populate(14);
        let kinds: Vec<_> = world.pickups().iter().map(Pickup::kind).collect();
        assert_eq!(kinds, vec![PickupKind::Gem, PickupKind::Key]);
    }

    #[test]
    fn walking_up_reaches_water_and_scores_once() {
        let mut world = world(2);
        world.hazards_mut().hazards_mut().clear();
        world.player_mut().place(Point { x: 2.0, y: 5.0 });
        let mut run = RunState::new();

        let mut goal_ticks = 0;
        let mut previous_score = 0;
        for _ in 0..200 {
            let position = world.player().position();
            let tick = world.update(1.0 / 30.0, &[Direction::Up], &mut run);
            if tick.collisions.contains(&Collision::Goal { row: 0 }) {
                goal_ticks += 1;
                assert_eq!(run.score(), previous_score + 1);
                assert_eq!(collision::goal_row(world.player().position().y), 0);
                // the step before was still short of the water row
                assert_ne!(collision::goal_row(position.y), 0);
                break;
            }
            previous_score = run.score();
        }
        assert_eq!(goal_ticks, 1);
        assert_eq!(run.score(), 1);
        assert!(world.player().is_reaching());
    }

    #[test]
    fn hop_end_is_reported_without_scoring_again() {
        let mut world = world(3);
        world.hazards_mut().hazards_mut().clear();
        world.player_mut().place(Point { x: 1.0, y: 0.0 });
        let mut run = RunState::new();

        let first = world.update(0.01, &[], &mut run);
        assert_eq!(first.collisions, vec![Collision::Goal { row: 0 }]);

        let mut ended = None;
        for _ in 0..100 {
            let tick = world.update(1.0 / 30.0, &[], &mut run);
            assert!(tick.collisions.is_empty());
            if tick.ended.is_some() {
                ended = tick.ended;
                break;
            }
        }
        assert_eq!(ended, Some(AnimationEnd::Reached));
        assert_eq!(run.score(), 1);
    }

    #[test]
    fn restart_puts_back_the_given_board() {
        let mut world = world(6);
        let original = world.grid().clone();
        world.reshuffle();
        assert_ne!(world.grid(), &original);
        world.populate(10);
        assert_eq!(world.pickups().len(), 2);

        world.restart(original.clone());
        assert_eq!(world.grid(), &original);
        assert!(world.pickups().is_empty());
        assert!(world.player().is_active());
        assert!(Character::ALL.iter().any(|character| character.image() == world.player().image()));
    }

    #[test]
    fn update_is_frozen_after_game_over() {
        let mut world = world(4);
        let mut run = RunState::new();
        run.set_lives(0);
        let hazards: Vec<Point> = world.hazards().iter().map(|hazard| hazard.position()).collect();
        let player = world.player().position();

        let tick = world.update(1.0 / 30.0, &[Direction::Up], &mut run);

        assert_eq!(tick, Tick::default());
        let after: Vec<Point> = world.hazards().iter().map(|hazard| hazard.position()).collect();
        assert_eq!(after, hazards);
        assert_eq!(world.player().position(), player);
    }

    #[test]
    fn pickup_on_the_way_is_collected() {
        let mut world = world(5);
        world.hazards_mut().hazards_mut().clear();
        world.player_mut().place(Point { x: 2.0, y: 3.0 });
        world.pickups_mut().push(Pickup::at(PickupKind::Gem, Point { x: 2.0, y: 3.0 }));
        let mut run = RunState::new();

        let tick = world.update(0.01, &[], &mut run);

        assert_eq!(tick.collisions, vec![Collision::Picked(PickupKind::Gem)]);
        assert!(world.pickups().is_empty());
        assert_eq!(run.score(), 1);
    }
}
