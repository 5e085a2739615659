// ┌──────────────────────────────────────────────────────────────────────┐
// │                         sprite/ layout                               │
// ├────────────────┬─────────────────────────────────────────────────────┤
// │ mod.rs         │ Entity : position, image, bounds, draw parameters   │
// │                │ Block  : one terrain tile                           │
// │ state.rs       │ player typestates (Active, Dying, Reaching)         │
// │ player.rs      │ player state machine + Player                       │
// │ hazard.rs      │ bugs running along path rows, HazardPool            │
// │ pickup.rs      │ gem, star and key collectibles                      │
// └────────────────┴─────────────────────────────────────────────────────┘
use crate::engine::{Assets, DebugDraw, Placement, Point, Rect, Renderer};
use crate::grid::{Terrain, CELL_HEIGHT, CELL_WIDTH};

pub mod hazard;
pub mod pickup;
pub mod player;
pub mod state;

/// Part of the sprite image that counts for collisions, relative to the
/// top left of the grid cell. Hand tuned per image so the box follows the
/// visible silhouette rather than the transparent 101x171 canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hitbox {
    pub inset: Point,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub const fn new(inset_x: f32, inset_y: f32, width: f32, height: f32) -> Self {
        Hitbox {
            inset: Point {
                x: inset_x,
                y: inset_y,
            },
            width,
            height,
        }
    }
}

/// Shared data of everything drawn on the board
/// - gameplay : `position` in fractional grid cells + `hitbox`
/// - display  : image, pixel offset, opacity, scale, translate
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Entity {
    pub position: Point,
    pub opacity: f32,
    pub scale: f32,
    pub translate: Point,
    image: &'static str,
    offset: Point,
    hitbox: Hitbox,
}

impl Entity {
    pub const fn new(image: &'static str, offset: Point, hitbox: Hitbox) -> Self {
        Entity {
            position: Point { x: 0.0, y: 0.0 },
            opacity: 1.0,
            scale: 1.0,
            translate: Point { x: 0.0, y: 0.0 },
            image,
            offset,
            hitbox,
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn image(&self) -> &'static str {
        self.image
    }

    /// Collision box in canvas pixels
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x * CELL_WIDTH + self.hitbox.inset.x,
            self.position.y * CELL_HEIGHT + self.hitbox.inset.y,
            self.hitbox.width,
            self.hitbox.height,
        )
    }

    pub fn placement(&self) -> Placement {
        Placement {
            position: Point {
                x: self.position.x * CELL_WIDTH + self.offset.x,
                y: self.position.y * CELL_HEIGHT + self.offset.y,
            },
            translate: self.translate,
            scale: self.scale,
            opacity: self.opacity,
        }
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        if let Some(image) = assets.get(self.image) {
            renderer.draw_placed_image(image, &self.placement());
        }
    }

    pub fn draw_bounds(&self, renderer: &Renderer) {
        self.bounds().draw_debug(renderer);
    }
}

/// One terrain tile of the board
pub struct Block {
    entity: Entity,
}

impl Block {
    pub fn new(terrain: Terrain, column: usize, row: usize) -> Self {
        Block {
            entity: Entity::new(
                terrain.image(),
                Point::default(),
                Hitbox::new(0.0, 0.0, CELL_WIDTH, CELL_HEIGHT),
            )
            .at(Point {
                x: column as f32,
                y: row as f32,
            }),
        }
    }

    pub fn draw(&self, renderer: &Renderer, assets: &Assets) {
        self.entity.draw(renderer, assets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HITBOX: Hitbox = Hitbox::new(17.0, 50.0, 67.0, 60.0);

    #[test]
    fn bounds_follow_grid_position_plus_inset() {
        let entity = Entity::new("a.png", Point::default(), HITBOX).at(Point { x: 2.0, y: 1.5 });
        let bounds = entity.bounds();
        assert_relative_eq!(bounds.x, 2.0 * CELL_WIDTH + 17.0);
        assert_relative_eq!(bounds.y, 1.5 * CELL_HEIGHT + 50.0);
        assert_relative_eq!(bounds.width, 67.0);
        assert_relative_eq!(bounds.height, 60.0);
    }

    #[test]
    fn translate_and_opacity_do_not_move_bounds() {
        let mut entity = Entity::new("a.png", Point { x: 0.0, y: -10.0 }, HITBOX);
        let before = entity.bounds();
        entity.translate = Point { x: 0.0, y: -15.0 };
        entity.opacity = 0.2;
        assert_eq!(entity.bounds(), before);

        let placement = entity.placement();
        assert_relative_eq!(placement.position.y, -10.0);
        assert_relative_eq!(placement.translate.y, -15.0);
        assert_relative_eq!(placement.opacity, 0.2);
    }

    #[test]
    fn block_sits_on_its_cell() {
        let block = Block::new(Terrain::Water, 3, 0);
        assert_eq!(block.entity.image(), "images/water-block.png");
        assert_relative_eq!(block.entity.placement().position.x, 3.0 * CELL_WIDTH);
    }
}
