use crate::sprite::pickup::PickupKind;

pub const MAX_LIVES: u32 = 3;

// power up cadence, in levels
const KEY_EVERY: u32 = 7;
const STAR_EVERY: u32 = 5;
const GEM_EVERY: u32 = 2;

/// Top hazard speed for a level, in cells per second.
/// Grows without a cap, see DESIGN.md.
pub fn max_hazard_speed(level: u32) -> f32 {
    2.0 + 0.07 * level as f32
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    GameOver,
}

/// Score, lives and progression of one run
/// - `lives` stays within `0..=MAX_LIVES`
/// - `game_over` is true exactly when `lives == 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    score: u32,
    lives: u32,
    level: u32,
    paused: bool,
    game_over: bool,
    reshuffle_requested: bool,
}

impl Default for RunState {
    fn default() -> Self {
        RunState {
            score: 0,
            lives: MAX_LIVES,
            level: 1,
            paused: false,
            game_over: false,
            reshuffle_requested: false,
        }
    }
}

impl RunState {
    pub fn new() -> Self {
        RunState::default()
    }

    pub fn restart(&mut self) {
        *self = RunState::default();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reshuffle_requested(&self) -> bool {
        self.reshuffle_requested
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Playing
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    /// Returns the lives left
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.game_over = self.lives == 0;
        self.lives
    }

    pub fn gain_life(&mut self) {
        if !self.game_over {
            self.lives = (self.lives + 1).min(MAX_LIVES);
        }
    }

    pub fn request_reshuffle(&mut self) {
        self.reshuffle_requested = true;
    }

    /// Clears the request, true if there was one
    pub fn take_reshuffle(&mut self) -> bool {
        std::mem::take(&mut self.reshuffle_requested)
    }

    /// Pause only means something while the run is alive
    pub fn toggle_pause(&mut self) {
        if !self.game_over {
            self.paused = !self.paused;
        }
    }

    pub fn advance_level(&mut self) {
        self.level += 1;
    }

    #[cfg(test)]
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    #[cfg(test)]
    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives.min(MAX_LIVES);
        self.game_over = self.lives == 0;
    }
}

/// Which power ups a level spawns, a pure function of the level number
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LevelPlan {
    pub key: bool,
    pub star: bool,
    pub gem: bool,
}

impl LevelPlan {
    pub fn for_level(level: u32) -> Self {
        LevelPlan {
            key: level % KEY_EVERY == 0,
            star: level % STAR_EVERY == 0,
            gem: level % GEM_EVERY == 0,
        }
    }

    pub fn pickups(&self) -> Vec<PickupKind> {
        [
            (self.gem, PickupKind::Gem),
            (self.star, PickupKind::Star),
            (self.key, PickupKind::Key),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, kind)| kind)
        .collect()
    }
}
