use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "w" | "k" => Some(Self::Up),
            "down" | "s" | "j" => Some(Self::Down),
            "left" | "a" | "h" => Some(Self::Left),
            "right" | "d" | "l" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dir| from.offset(*dir) == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Wall,
    Pickup,
    PowerPickup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumedKind {
    Pickup,
    PowerPickup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Bfs,
    Dfs,
    BestFirst,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversaryTag {
    Red,
    Pink,
    Cyan,
    Orange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "remaining", rename_all = "snake_case")]
pub enum Empowerment {
    Inactive,
    Active(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "remaining", rename_all = "snake_case")]
pub enum CaptureState {
    Free,
    Captured(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOutcome {
    Continue,
    Lost,
    Won,
}

impl TickOutcome {
    pub fn is_terminal(self) -> bool {
        self != TickOutcome::Continue
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub score: u32,
    pub lives: u32,
    pub empowerment: Empowerment,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdversaryView {
    pub id: usize,
    pub tag: AdversaryTag,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub strategy: Strategy,
    pub capture: CaptureState,
    pub fleeing: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PickupConsumed {
        x: i32,
        y: i32,
        kind: ConsumedKind,
    },
    EmpowermentStarted {
        ticks: u32,
    },
    EmpowermentEnded,
    AdversaryCaptured {
        #[serde(rename = "adversaryId")]
        adversary_id: usize,
        x: i32,
        y: i32,
    },
    AdversaryReleased {
        #[serde(rename = "adversaryId")]
        adversary_id: usize,
    },
    LifeLost {
        #[serde(rename = "adversaryId")]
        adversary_id: usize,
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    EpisodeEnded {
        outcome: TickOutcome,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub cells: Vec<CellKind>,
    #[serde(rename = "remainingTargets")]
    pub remaining_targets: usize,
    pub agent: AgentView,
    pub adversaries: Vec<AdversaryView>,
    pub outcome: TickOutcome,
}

impl Snapshot {
    pub fn cell(&self, x: i32, y: i32) -> CellKind {
        self.cells[(y * self.width + x) as usize]
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EpisodeSummary {
    pub outcome: TickOutcome,
    pub ticks: u64,
    pub score: u32,
    #[serde(rename = "livesLeft")]
    pub lives_left: u32,
    #[serde(rename = "pickupsConsumed")]
    pub pickups_consumed: u32,
    #[serde(rename = "powerPickupsConsumed")]
    pub power_pickups_consumed: u32,
    #[serde(rename = "adversariesCaptured")]
    pub adversaries_captured: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    #[serde(rename = "remainingTargets")]
    pub remaining_targets: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_move_accepts_words_and_keys() {
        assert_eq!(Direction::parse_move("up"), Some(Direction::Up));
        assert_eq!(Direction::parse_move(" LEFT "), Some(Direction::Left));
        assert_eq!(Direction::parse_move("s"), Some(Direction::Down));
        assert_eq!(Direction::parse_move("l"), Some(Direction::Right));
        assert_eq!(Direction::parse_move("none"), None);
        assert_eq!(Direction::parse_move(""), None);
    }

    #[test]
    fn between_only_matches_adjacent_cells() {
        let origin = Position::new(3, 3);
        assert_eq!(
            Direction::between(origin, Position::new(4, 3)),
            Some(Direction::Right)
        );
        assert_eq!(
            Direction::between(origin, Position::new(3, 2)),
            Some(Direction::Up)
        );
        assert_eq!(Direction::between(origin, Position::new(5, 3)), None);
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = RuntimeEvent::LifeLost {
            adversary_id: 2,
            lives_left: 1,
        };
        let value = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(value["type"], "life_lost");
        assert_eq!(value["adversaryId"], 2);
        assert_eq!(value["livesLeft"], 1);

        let value = serde_json::to_value(CaptureState::Captured(4)).expect("serialize");
        assert_eq!(value["state"], "captured");
        assert_eq!(value["remaining"], 4);
    }

    #[test]
    fn difficulty_parse_rejects_unknown_values() {
        assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("nightmare"), None);
    }
}
