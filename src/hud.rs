use crate::engine::{Assets, Point, Rect, Renderer, TextAlign};
use crate::level::{RunState, MAX_LIVES};
use crate::sprite::{Entity, Hitbox};
use std::f32::consts::PI;

pub const TITLE: &str = "Go For Water";
pub const HEART_IMAGE: &str = "images/Heart.png";

const TITLE_TIME: f32 = 5.0;
// the title starts leaving one second before the end
const TITLE_LEAVE_AT: f32 = 4.0;
const HEART_SCALE: f32 = 0.3;
const HEART_SPACING: f32 = 32.0;

/// easeOutElastic, 0 at t = 0, overshoots, settles on 1 at t = 1
pub fn ease(t: f32) -> f32 {
    const PERIOD: f32 = 0.3;
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = PERIOD / (2.0 * PI) * 1.0_f32.asin();
    2.0_f32.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / PERIOD).sin() + 1.0
}

/// Title that drops in with a bounce when a run starts and lifts away
#[derive(Debug, Default)]
pub struct Title {
    timer: f32,
}

impl Title {
    pub fn new() -> Self {
        Title::default()
    }

    pub fn update(&mut self, dt: f32) {
        self.timer = (self.timer + dt).min(TITLE_TIME);
    }

    /// Vertical position as a fraction of half the canvas height
    pub fn drop(&self) -> f32 {
        if self.timer < TITLE_LEAVE_AT {
            ease(self.timer)
        } else {
            ease(TITLE_TIME - self.timer)
        }
    }

    pub fn is_visible(&self) -> bool {
        self.timer < TITLE_TIME
    }

    pub fn draw(&self, renderer: &Renderer, canvas: &Rect) {
        if !self.is_visible() {
            return;
        }
        renderer.draw_text(
            TITLE,
            &Point {
                x: canvas.width / 2.0,
                y: canvas.height / 2.0 * self.drop(),
            },
            "56px sans-serif",
            TextAlign::Center,
        );
    }
}

/// Heart icons for the remaining lives, right aligned on the top bar
pub fn life_icons(lives: u32, canvas: &Rect) -> Vec<Entity> {
    let heart = Entity::new(HEART_IMAGE, Point::default(), Hitbox::new(0.0, 0.0, 0.0, 0.0))
        .with_scale(HEART_SCALE);
    (0..lives.min(MAX_LIVES))
        .map(|index| {
            let mut icon = heart;
            // entities live in grid space, the hud is placed in pixels
            icon.translate = Point {
                x: canvas.width - HEART_SPACING * (index + 1) as f32,
                y: 4.0,
            };
            icon
        })
        .collect()
}

pub fn draw(renderer: &Renderer, assets: &Assets, run: &RunState, canvas: &Rect) {
    renderer.draw_text(
        &format!("Score {}", run.score()),
        &Point { x: 8.0, y: 36.0 },
        "24px sans-serif",
        TextAlign::Left,
    );
    renderer.draw_text(
        &format!("Level {}", run.level()),
        &Point {
            x: canvas.width / 2.0,
            y: 36.0,
        },
        "24px sans-serif",
        TextAlign::Center,
    );
    life_icons(run.lives(), canvas)
        .iter()
        .for_each(|icon| icon.draw(renderer, assets));

    if run.is_game_over() {
        overlay(renderer, canvas, "Game Over", "Press Esc to play again");
    } else if run.is_paused() {
        overlay(renderer, canvas, "Paused", "Press Esc to resume");
    }
}

fn overlay(renderer: &Renderer, canvas: &Rect, headline: &str, hint: &str) {
    renderer.fill_rect(canvas, "rgba(0, 0, 0, 0.5)");
    let center = canvas.width / 2.0;
    renderer.draw_text(
        headline,
        &Point {
            x: center,
            y: canvas.height / 2.0,
        },
        "48px sans-serif",
        TextAlign::Center,
    );
    renderer.draw_text(
        hint,
        &Point {
            x: center,
            y: canvas.height / 2.0 + 44.0,
        },
        "20px sans-serif",
        TextAlign::Center,
    );
}
