use crate::types::{AdversaryTag, Difficulty, Position, Strategy};

pub const GRID_WIDTH: usize = 19;
pub const GRID_HEIGHT: usize = 21;

pub const CODE_OPEN: u8 = 0;
pub const CODE_WALL: u8 = 1;
pub const CODE_PICKUP: u8 = 2;
pub const CODE_POWER_PICKUP: u8 = 3;

#[rustfmt::skip]
pub const CLASSIC_LAYOUT: [[u8; GRID_WIDTH]; GRID_HEIGHT] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 3, 1, 1, 2, 1, 1, 1, 2, 1, 2, 1, 1, 1, 2, 1, 1, 3, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, 2, 1, 1, 2, 1],
    [1, 2, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 2, 1, 1, 1, 0, 1, 0, 1, 1, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 0, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 0, 2, 0, 0, 1, 0, 0, 0, 1, 0, 0, 2, 0, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 1, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 1, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 2, 1, 1, 1, 2, 1, 2, 1, 1, 1, 2, 1, 1, 2, 1],
    [1, 3, 2, 1, 2, 2, 2, 2, 2, 0, 2, 2, 2, 2, 2, 1, 2, 3, 1],
    [1, 1, 2, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, 2, 1, 2, 1, 1],
    [1, 2, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 1, 1, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 1, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

pub const AGENT_SPAWN: Position = Position::new(9, 15);
pub const ADVERSARY_HOME: Position = Position::new(9, 9);

pub const PICKUP_SCORE: u32 = 10;
pub const POWER_PICKUP_SCORE: u32 = 50;
pub const CAPTURE_SCORE: u32 = 200;

pub const DEFAULT_LIFE_COUNT: u32 = 3;
pub const EMPOWERMENT_SECONDS: u32 = 10;
pub const RESPAWN_SECONDS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdversarySpec {
    pub tag: AdversaryTag,
    pub strategy: Strategy,
    pub spawn: Position,
    pub home: Position,
}

pub const CLASSIC_ROSTER: [AdversarySpec; 4] = [
    AdversarySpec {
        tag: AdversaryTag::Red,
        strategy: Strategy::BestFirst,
        spawn: Position::new(9, 9),
        home: ADVERSARY_HOME,
    },
    AdversarySpec {
        tag: AdversaryTag::Pink,
        strategy: Strategy::Bfs,
        spawn: Position::new(8, 9),
        home: ADVERSARY_HOME,
    },
    AdversarySpec {
        tag: AdversaryTag::Cyan,
        strategy: Strategy::Dfs,
        spawn: Position::new(10, 9),
        home: ADVERSARY_HOME,
    },
    AdversarySpec {
        tag: AdversaryTag::Orange,
        strategy: Strategy::Random,
        spawn: Position::new(9, 8),
        home: ADVERSARY_HOME,
    },
];

// (ticks per second, ticks between adversary replans)
pub fn get_difficulty_profile(difficulty: Difficulty) -> (u32, u32) {
    match difficulty {
        Difficulty::Easy => (10, 10),
        Difficulty::Medium => (15, 7),
        Difficulty::Hard => (20, 5),
    }
}
