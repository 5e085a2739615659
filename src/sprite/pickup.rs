use crate::engine::{Assets, Point, Rect, Renderer};
use crate::grid::{Grid, Terrain};
use crate::sprite::{Entity, Hitbox};
use rand::Rng;

// collectibles are drawn at 60% around the middle of their cell
const PICKUP_SCALE: f32 = 0.6;
const PICKUP_OFFSET: Point = Point { x: 20.0, y: 15.0 };
const PICKUP_HITBOX: Hitbox = Hitbox::new(25.0, 60.0, 51.0, 45.0);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickupKind {
    /// +1 score
    Gem,
    /// +1 life (at most 3) and +2 score
    Star,
    /// reshuffles the terrain of the next level and +3 score
    Key,
}

impl PickupKind {
    pub fn image(&self) -> &'static str {
        match self {
            PickupKind::Gem => "images/Gem Blue.png",
            PickupKind::Star => "images/Star.png",
            PickupKind::Key => "images/Key.png",
        }
    }

    pub fn score(&self) -> u32 {
        match self {
            PickupKind::Gem => 1,
            PickupKind::Star => 2,
            PickupKind::Key => 3,
        }
    }
}

/// Single use collectible, lives until picked up or the level ends
#[derive(Debug, Clone)]
pub struct Pickup {
    kind: PickupKind,
    entity: Entity,
}

impl Pickup {
    /// Random cell on a path row, so every pickup is a risk
    pub fn new<R: Rng + ?Sized>(kind: PickupKind, grid: &Grid, rng: &mut R) -> Self {
        let position = Point {
            x: rng.gen_range(0..grid.columns()) as f32,
            y: grid.random_row(Terrain::Path, rng) as f32,
        };
        Pickup::at(kind, position)
    }

    pub fn at(kind: PickupKind, position: Point) -> Self {
        Pickup {
            kind,
            entity: Entity::new(kind.image(), PICKUP_OFFSET, PICKUP_HITBOX)
                .with_scale(PICKUP_SCALE)
                .at(position),
        }
    }

    pub fn kind(&self) -> PickupKind {
        self.kind
    }

    pub fn bounds(&self) -> Rect {
        self.entity.bounds()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        self.entity.draw(renderer, assets);
    }
}
