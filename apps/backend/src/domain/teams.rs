use serde::{Deserialize, Serialize};

use super::rules::SEATS_PER_TABLE;

/// Partnership at a table, decided by seat parity: seats 0 and 2 against 1 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Even,
    Odd,
}

impl Team {
    pub fn of_seat(seat: usize) -> Team {
        if seat % 2 == 0 {
            Team::Even
        } else {
            Team::Odd
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::Even => 0,
            Team::Odd => 1,
        }
    }

    pub fn other(self) -> Team {
        match self {
            Team::Even => Team::Odd,
            Team::Odd => Team::Even,
        }
    }

    /// Seats belonging to this team.
    pub fn seats(self) -> impl Iterator<Item = usize> {
        (0..SEATS_PER_TABLE).filter(move |&s| Team::of_seat(s) == self)
    }
}

/// Per-table round outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamResult {
    pub totals: [i64; 2],
    pub winner: Team,
}

impl TeamResult {
    /// Ties go to the even team.
    pub fn from_seat_points(points: [i64; SEATS_PER_TABLE]) -> Self {
        let mut totals = [0i64; 2];
        for (seat, p) in points.iter().enumerate() {
            totals[Team::of_seat(seat).index()] += p;
        }
        let winner = if totals[1] > totals[0] {
            Team::Odd
        } else {
            Team::Even
        };
        Self { totals, winner }
    }

    pub fn loser(&self) -> Team {
        self.winner.other()
    }

    pub fn best_total(&self) -> i64 {
        self.totals[0].max(self.totals[1])
    }
}
