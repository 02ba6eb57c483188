use crate::domain::{Dice, RollScore};
use crate::entities::TableDoc;

/// Result of an operation that may legitimately be a no-op.
///
/// Stale triggers and actions outside their valid state are not errors;
/// they come back as `Ignored` with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition<T = ()> {
    Applied(T),
    Ignored(IgnoreReason),
}

impl<T> Disposition<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Disposition::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Disposition::Applied(v) => Some(v),
            Disposition::Ignored(_) => None,
        }
    }

    pub fn ignored_reason(&self) -> Option<IgnoreReason> {
        match self {
            Disposition::Applied(_) => None,
            Disposition::Ignored(r) => Some(*r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    GameNotStarted,
    GameOver,
    TransitionInProgress,
    RoundOver,
    NotYourTurn,
    RollInFlight,
    TurnFinished,
    NotEndable,
    NotReady,
    Stale,
}

/// Identifies one player's turn; timers and bot loops act only while it still holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnStamp {
    pub round: u8,
    pub turn: usize,
}

impl TurnStamp {
    pub fn of(table: &TableDoc) -> Self {
        Self {
            round: table.round,
            turn: table.current_turn,
        }
    }

    pub fn matches(&self, table: &TableDoc) -> bool {
        *self == Self::of(table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    pub dice: Dice,
    pub score: RollScore,
    /// This roll pushed the head table over the threshold.
    pub ended_round: bool,
    pub stamp: TurnStamp,
}
