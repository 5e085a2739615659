use crate::grid::{Grid, Terrain};
use crate::level::RunState;
use crate::sprite::hazard::HazardPool;
use crate::sprite::pickup::{Pickup, PickupKind};
use crate::sprite::player::Player;

// rows count as reached a little early, the sprite's feet lead its origin
const GOAL_BIAS: f32 = 0.4;

/// What the resolver did this tick
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Hit { lives_left: u32 },
    Goal { row: usize },
    Picked(PickupKind),
}

pub fn goal_row(y: f32) -> usize {
    (y + GOAL_BIAS).round().max(0.0) as usize
}

/// One pass of collision checks, in priority order:
/// 1. hazards  -> lose a life, player dies, nothing else this tick
/// 2. water    -> score, player hops, nothing else this tick
/// 3. pickups  -> each overlapping pickup is applied and removed
///
/// Does nothing while the run is over or the player is animating.
pub fn resolve(
    player: &mut Player,
    hazards: &HazardPool,
    pickups: &mut Vec<Pickup>,
    grid: &Grid,
    run: &mut RunState,
) -> Vec<Collision> {
    if run.is_game_over() || !player.is_active() {
        return Vec::new();
    }

    let bounds = player.bounds();
    if hazards.iter().any(|hazard| bounds.intersects(&hazard.bounds())) {
        let lives_left = run.lose_life();
        player.kill();
        return vec![Collision::Hit { lives_left }];
    }

    let row = goal_row(player.position().y);
    if grid.terrain_at(row) == Some(Terrain::Water) {
        run.add_score(1);
        player.reach_goal(row);
        return vec![Collision::Goal { row }];
    }

    let mut collisions = Vec::new();
    pickups.retain(|pickup| {
        if !bounds.intersects(&pickup.bounds()) {
            return true;
        }
        let kind = pickup.kind();
        match kind {
            PickupKind::Gem => {}
            PickupKind::Star => run.gain_life(),
            PickupKind::Key => run.request_reshuffle(),
        }
        run.add_score(kind.score());
        collisions.push(Collision::Picked(kind));
        false
    });
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Point;
    use crate::sprite::player::Character;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Scene {
        grid: Grid,
        player: Player,
        hazards: HazardPool,
        pickups: Vec<Pickup>,
        run: RunState,
    }

    impl Scene {
        fn new(player_at: Point) -> Self {
            let grid = Grid::new(
                "WSSSGG".chars().filter_map(Terrain::from_letter).collect(),
                5,
            );
            let mut player = Player::new(Character::Boy, 3.0);
            player.place(player_at);
            Scene {
                grid,
                player,
                hazards: HazardPool::default(),
                pickups: Vec::new(),
                run: RunState::new(),
            }
        }

        fn with_hazard_at(mut self, position: Point) -> Self {
            let mut rng = StdRng::seed_from_u64(0);
            let mut pool = HazardPool::new(1, 2.0, &self.grid, &mut rng);
            pool.hazards_mut()[0].place(position, 1.0);
            self.hazards = pool;
            self
        }

        fn resolve(&mut self) -> Vec<Collision> {
            resolve(
                &mut self.player,
                &self.hazards,
                &mut self.pickups,
                &self.grid,
                &mut self.run,
            )
        }
    }

    #[test]
    fn goal_row_is_forward_biased() {
        assert_eq!(goal_row(0.0), 0);
        assert_eq!(goal_row(0.09), 0);
        assert_eq!(goal_row(0.2), 1);
        assert_eq!(goal_row(4.2), 5);
    }

    #[test]
    fn hazard_on_the_same_cell_costs_a_life() {
        let mut scene = Scene::new(Point { x: 2.0, y: 3.0 }).with_hazard_at(Point { x: 2.2, y: 3.0 });
        assert_eq!(scene.resolve(), vec![Collision::Hit { lives_left: 2 }]);
        assert_eq!(scene.run.lives(), 2);
        assert!(scene.player.is_dying());
        // already dying, a second pass changes nothing
        assert!(scene.resolve().is_empty());
        assert_eq!(scene.run.lives(), 2);
    }

    #[test]
    fn hazard_on_the_next_row_misses() {
        let mut scene = Scene::new(Point { x: 2.0, y: 3.0 }).with_hazard_at(Point { x: 2.0, y: 2.0 });
        assert!(scene.resolve().is_empty());
        let mut scene = Scene::new(Point { x: 2.0, y: 3.0 }).with_hazard_at(Point { x: 2.0, y: 4.0 });
        assert!(scene.resolve().is_empty());
        assert_eq!(scene.run.lives(), 3);
    }

    #[test]
    fn last_life_ends_the_run() {
        let mut scene = Scene::new(Point { x: 1.0, y: 1.0 }).with_hazard_at(Point { x: 1.0, y: 1.0 });
        scene.run.set_lives(1);
        scene.resolve();
        assert_eq!(scene.run.lives(), 0);
        assert!(scene.run.is_game_over());
    }

    #[test]
    fn hit_skips_pickups_on_the_same_tick() {
        let mut scene = Scene::new(Point { x: 1.0, y: 2.0 }).with_hazard_at(Point { x: 1.0, y: 2.0 });
        scene.pickups.push(Pickup::at(PickupKind::Gem, Point { x: 1.0, y: 2.0 }));
        scene.resolve();
        assert_eq!(scene.pickups.len(), 1);
        assert_eq!(scene.run.score(), 0);
    }

    #[test]
    fn water_scores_and_starts_the_hop() {
        let mut scene = Scene::new(Point { x: 3.0, y: 0.05 });
        assert_eq!(scene.resolve(), vec![Collision::Goal { row: 0 }]);
        assert_eq!(scene.run.score(), 1);
        assert!(scene.player.is_reaching());
        assert_eq!(scene.player.position().y, 0.0);
    }

    #[test]
    fn pickups_apply_their_effect_once() {
        let mut scene = Scene::new(Point { x: 2.0, y: 2.0 });
        scene.run.lose_life();
        scene.pickups = vec![
            Pickup::at(PickupKind::Gem, Point { x: 2.0, y: 2.0 }),
            Pickup::at(PickupKind::Star, Point { x: 2.0, y: 2.0 }),
            Pickup::at(PickupKind::Key, Point { x: 2.0, y: 2.0 }),
            Pickup::at(PickupKind::Gem, Point { x: 0.0, y: 1.0 }),
        ];
        let collisions = scene.resolve();
        assert_eq!(
            collisions,
            vec![
                Collision::Picked(PickupKind::Gem),
                Collision::Picked(PickupKind::Star),
                Collision::Picked(PickupKind::Key),
            ]
        );
        assert_eq!(scene.run.score(), 1 + 2 + 3);
        assert_eq!(scene.run.lives(), 3);
        assert!(scene.run.reshuffle_requested());
        // the far gem stays
        assert_eq!(scene.pickups.len(), 1);
        assert!(scene.resolve().is_empty());
    }

    #[test]
    fn star_never_exceeds_max_lives() {
        let mut scene = Scene::new(Point { x: 2.0, y: 2.0 });
        scene.pickups = vec![Pickup::at(PickupKind::Star, Point { x: 2.0, y: 2.0 })];
        scene.resolve();
        assert_eq!(scene.run.lives(), 3);
        assert_eq!(scene.run.score(), 2);
    }
}
