use rand::seq::SliceRandom;
use rand::Rng;

// size of one terrain block on the canvas, in pixels
pub const CELL_WIDTH: f32 = 101.0;
pub const CELL_HEIGHT: f32 = 83.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// grass, where the player spawns
    Ground,
    /// stone, where hazards run
    Path,
    /// the goal
    Water,
}

impl Terrain {
    pub fn from_letter(letter: char) -> Option<Terrain> {
        match letter.to_ascii_uppercase() {
            'G' => Some(Terrain::Ground),
            'S' => Some(Terrain::Path),
            'W' => Some(Terrain::Water),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Terrain::Ground => 'G',
            Terrain::Path => 'S',
            Terrain::Water => 'W',
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            Terrain::Ground => "images/grass-block.png",
            Terrain::Path => "images/stone-block.png",
            Terrain::Water => "images/water-block.png",
        }
    }
}

/// The playfield: one terrain kind per row, rows numbered top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    terrain: Vec<Terrain>,
    columns: usize,
}

impl Grid {
    pub fn new(terrain: Vec<Terrain>, columns: usize) -> Self {
        Grid { terrain, columns }
    }

    pub fn rows(&self) -> usize {
        self.terrain.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    pub fn terrain_at(&self, row: usize) -> Option<Terrain> {
        self.terrain.get(row).copied()
    }

    pub fn pattern(&self) -> String {
        self.terrain.iter().map(Terrain::letter).collect()
    }

    pub fn rows_matching(&self, kind: Terrain) -> Vec<usize> {
        self.terrain
            .iter()
            .enumerate()
            .filter(|(_, terrain)| **terrain == kind)
            .map(|(row, _)| row)
            .collect()
    }

    /// Uniform pick among the rows of `kind`
    ///
    /// Panics when no row has that terrain, the grid was validated at startup
    /// to hold at least one row of every kind.
    pub fn random_row<R: Rng + ?Sized>(&self, kind: Terrain, rng: &mut R) -> usize {
        *self
            .rows_matching(kind)
            .choose(rng)
            .unwrap_or_else(|| panic!("grid {} has no {:?} row", self.pattern(), kind))
    }

    /// Swap in a new pattern, the row count may not change mid run
    pub fn replace(&mut self, terrain: Vec<Terrain>) {
        assert_eq!(
            terrain.len(),
            self.terrain.len(),
            "terrain pattern must keep {} rows",
            self.terrain.len()
        );
        self.terrain = terrain;
    }

    /// Shuffle the rows, keeping how many rows of each kind exist. When the
    /// grid holds more than one kind the new order always differs.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let previous = self.terrain.clone();
        let mut next = previous.clone();
        next.shuffle(rng);
        if next == previous {
            // shuffle landed on the identity, swap the first differing pair
            if let Some(other) = next.iter().position(|terrain| *terrain != next[0]) {
                next.swap(0, other);
            }
        }
        self.replace(next);
    }
}
