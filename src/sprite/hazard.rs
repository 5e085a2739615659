use crate::engine::{Assets, Point, Rect, Renderer};
use crate::grid::{Grid, Terrain};
use crate::sprite::{Entity, Hitbox};
use rand::Rng;

pub const HAZARD_IMAGE: &str = "images/enemy-bug.png";
const HAZARD_OFFSET: Point = Point { x: 0.0, y: -20.0 };
const HAZARD_HITBOX: Hitbox = Hitbox::new(2.0, 60.0, 97.0, 50.0);
// one cell left of the board
const SPAWN_X: f32 = -1.0;
const MIN_SPEED: f32 = 1.0;

/// A bug running left to right along a path row
#[derive(Debug, Clone)]
pub struct Hazard {
    entity: Entity,
    speed: f32,
    max_speed: f32,
}

impl Hazard {
    pub fn new<R: Rng + ?Sized>(max_speed: f32, grid: &Grid, rng: &mut R) -> Self {
        let mut hazard = Hazard {
            entity: Entity::new(HAZARD_IMAGE, HAZARD_OFFSET, HAZARD_HITBOX),
            speed: MIN_SPEED,
            max_speed: max_speed.max(MIN_SPEED),
        };
        hazard.reset(grid, rng);
        hazard
    }

    /// Back to the left edge on a random path row with a fresh speed
    pub fn reset<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        self.entity.position = Point {
            x: SPAWN_X,
            y: grid.random_row(Terrain::Path, rng) as f32,
        };
        self.speed = rng.gen_range(MIN_SPEED..=self.max_speed);
    }

    /// A hazard that left the board on the previous tick is recycled,
    /// any other drifts right by `speed * dt`
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, grid: &Grid, rng: &mut R) {
        if self.entity.position.x >= grid.columns() as f32 {
            self.reset(grid, rng);
        } else {
            self.entity.position.x += self.speed * dt;
        }
    }

    pub fn position(&self) -> Point {
        self.entity.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn bounds(&self) -> Rect {
        self.entity.bounds()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    #[cfg(test)]
    pub fn place(&mut self, position: Point, speed: f32) {
        self.entity.position = position;
        self.speed = speed;
    }
}

/// Fixed set of hazards, rebuilt at the start of every level
#[derive(Debug, Clone, Default)]
pub struct HazardPool {
    hazards: Vec<Hazard>,
}

impl HazardPool {
    pub fn new<R: Rng + ?Sized>(count: usize, max_speed: f32, grid: &Grid, rng: &mut R) -> Self {
        HazardPool {
            hazards: (0..count).map(|_| Hazard::new(max_speed, grid, rng)).collect(),
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, grid: &Grid, rng: &mut R) {
        self.hazards
            .iter_mut()
            .for_each(|hazard| hazard.update(dt, grid, rng));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        self.hazards
            .iter()
            .for_each(|hazard| hazard.entity.draw(renderer, assets));
    }

    #[cfg(test)]
    pub fn hazards_mut(&mut self) -> &mut Vec<Hazard> {
        &mut self.hazards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn fresh_hazards_start_off_board_on_path_rows() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(2);
        let pool = HazardPool::new(3, 2.07, &grid, &mut rng);
        assert_eq!(pool.len(), 3);
        for hazard in pool.iter() {
            assert_relative_eq!(hazard.position().x, -1.0);
            assert_eq!(grid.terrain_at(hazard.position().y as usize), Some(Terrain::Path));
            assert!((1.0..=2.07).contains(&hazard.speed()));
        }
    }

    #[test]
    fn hazard_drifts_right_then_recycles_to_exactly_minus_one() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(9);
        let mut hazard = Hazard::new(2.5, &grid, &mut rng);
        let row = hazard.position().y;
        let dt = 0.1;

        let mut previous = hazard.position().x;
        while previous < grid.columns() as f32 {
            hazard.update(dt, &grid, &mut rng);
            let x = hazard.position().x;
            assert_relative_eq!(x, previous + hazard.speed() * dt, epsilon = 1e-5);
            assert_relative_eq!(hazard.position().y, row);
            previous = x;
        }

        hazard.update(dt, &grid, &mut rng);
        assert_eq!(hazard.position().x, -1.0);
        assert_eq!(grid.terrain_at(hazard.position().y as usize), Some(Terrain::Path));
        assert!((1.0..=2.5).contains(&hazard.speed()));
    }

    #[test]
    fn speed_stays_within_range_across_resets() {
        let grid = classic_grid();
        let mut rng = StdRng::seed_from_u64(4);
        let mut hazard = Hazard::new(2.35, &grid, &mut rng);
        for _ in 0..200 {
            hazard.reset(&grid, &mut rng);
            assert!(hazard.speed() >= 1.0 && hazard.speed() <= 2.35);
        }
    }
}
