//! Partner-rotation re-seating between rounds.
//!
//! At the head table the winners stay and the losers move; everywhere else
//! the losers stay and the winners move. Movers go to the next table id
//! (wrapping). Stayers take seats 0 and 1, arrivals take seats 2 and 3, so
//! former partners always end up on opposite teams.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use super::bounded::{best_of, Bounded};
use super::rules::SEATS_PER_TABLE;
use super::teams::{Team, TeamResult};

pub const HEAD_TABLE: u32 = 0;

/// One table as it stands when the round ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table_id: u32,
    pub player_ids: [String; SEATS_PER_TABLE],
    pub points: [i64; SEATS_PER_TABLE],
}

impl TableOutcome {
    pub fn result(&self) -> TeamResult {
        TeamResult::from_seat_points(self.points)
    }

    fn team_members(&self, team: Team) -> Vec<String> {
        team.seats().map(|s| self.player_ids[s].clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mover {
    pub player_id: String,
    pub from: u32,
    pub to: u32,
}

/// Who stays, who moves, and who gets credited with the round.
#[derive(Debug, Clone, Default)]
pub struct Movement {
    pub results: Vec<(u32, TeamResult)>,
    pub stayers: Vec<(u32, Vec<String>)>,
    pub movers: Vec<Mover>,
    pub winners: Vec<String>,
}

impl Movement {
    pub fn is_winner(&self, player_id: &str) -> bool {
        self.winners.iter().any(|w| w == player_id)
    }
}

/// Decide movement from the final round outcomes.
pub fn plan_movement(outcomes: &[TableOutcome]) -> Movement {
    let table_count = outcomes.len() as u32;
    let mut movement = Movement::default();

    for outcome in outcomes {
        let result = outcome.result();
        let (staying, moving) = if outcome.table_id == HEAD_TABLE {
            (result.winner, result.loser())
        } else {
            (result.loser(), result.winner)
        };
        let to = (outcome.table_id + 1) % table_count.max(1);

        movement.results.push((outcome.table_id, result));
        movement.winners.extend(outcome.team_members(result.winner));
        movement
            .stayers
            .push((outcome.table_id, outcome.team_members(staying)));
        movement
            .movers
            .extend(outcome.team_members(moving).into_iter().map(|player_id| Mover {
                player_id,
                from: outcome.table_id,
                to,
            }));
    }

    movement
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTable {
    pub table_id: u32,
    pub seats: [Option<String>; SEATS_PER_TABLE],
}

impl NextTable {
    pub fn filled(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    /// Player ids in seat order, skipping empty seats.
    pub fn player_ids(&self) -> Vec<String> {
        self.seats.iter().flatten().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextSeating {
    pub tables: Vec<NextTable>,
    /// Movers whose destination had no free arrival seat.
    pub unseated: Vec<String>,
}

impl NextSeating {
    /// `(player_id, table_id, seat)` for every seated player.
    pub fn placements(&self) -> impl Iterator<Item = (&str, u32, u8)> + '_ {
        self.tables.iter().flat_map(|t| {
            t.seats.iter().enumerate().filter_map(move |(seat, id)| {
                id.as_deref().map(|id| (id, t.table_id, seat as u8))
            })
        })
    }
}

/// Seat stayers at 0/1 and pooled movers at the first free of 2/3.
pub fn assign_seats<R: Rng + ?Sized>(movement: &Movement, rng: &mut R) -> NextSeating {
    let mut tables: Vec<NextTable> = movement
        .stayers
        .iter()
        .map(|(table_id, stayers)| {
            let mut stayers = stayers.clone();
            stayers.shuffle(rng);
            let mut seats: [Option<String>; SEATS_PER_TABLE] = Default::default();
            for (seat, id) in stayers.into_iter().take(2).enumerate() {
                seats[seat] = Some(id);
            }
            NextTable {
                table_id: *table_id,
                seats,
            }
        })
        .collect();

    let mut pool = movement.movers.clone();
    pool.shuffle(rng);

    let mut unseated = Vec::new();
    for mover in pool {
        let free = tables
            .iter_mut()
            .find(|t| t.table_id == mover.to)
            .and_then(|t| t.seats[2..].iter_mut().find(|s| s.is_none()));
        match free {
            Some(slot) => *slot = Some(mover.player_id),
            None => unseated.push(mover.player_id),
        }
    }

    NextSeating { tables, unseated }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatingViolation {
    IncompleteTable { table_id: u32, filled: usize },
    DuplicatePlayer { player_id: String },
    Unseated { player_id: String },
    RepeatTeammates { table_id: u32, pair: (String, String) },
}

impl fmt::Display for SeatingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatingViolation::IncompleteTable { table_id, filled } => {
                write!(f, "table {table_id} has {filled} of 4 seats filled")
            }
            SeatingViolation::DuplicatePlayer { player_id } => {
                write!(f, "player {player_id} seated more than once")
            }
            SeatingViolation::Unseated { player_id } => {
                write!(f, "player {player_id} has no seat")
            }
            SeatingViolation::RepeatTeammates { table_id, pair } => {
                write!(
                    f,
                    "{} and {} partnered again at table {table_id}",
                    pair.0, pair.1
                )
            }
        }
    }
}

fn teammate_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn partnerships<'a>(
    seats: impl Iterator<Item = (usize, &'a str)>,
) -> Vec<(String, String)> {
    let mut by_team: HashMap<Team, Vec<&str>> = HashMap::new();
    for (seat, id) in seats {
        by_team.entry(Team::of_seat(seat)).or_default().push(id);
    }
    by_team
        .values()
        .filter(|ids| ids.len() == 2)
        .map(|ids| teammate_pair(ids[0], ids[1]))
        .collect()
}

/// Check a proposed seating against the previous round.
pub fn validate(next: &NextSeating, previous: &[TableOutcome]) -> Vec<SeatingViolation> {
    let mut violations = Vec::new();

    let prior_pairs: HashSet<(String, String)> = previous
        .iter()
        .flat_map(|t| partnerships(t.player_ids.iter().map(String::as_str).enumerate()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    for table in &next.tables {
        let filled = table.filled();
        if filled != SEATS_PER_TABLE {
            violations.push(SeatingViolation::IncompleteTable {
                table_id: table.table_id,
                filled,
            });
        }
        for id in table.seats.iter().flatten() {
            if !seen.insert(id.as_str()) {
                violations.push(SeatingViolation::DuplicatePlayer {
                    player_id: id.clone(),
                });
            }
        }
        let seated = table
            .seats
            .iter()
            .enumerate()
            .filter_map(|(seat, id)| id.as_deref().map(|id| (seat, id)));
        for pair in partnerships(seated) {
            if prior_pairs.contains(&pair) {
                violations.push(SeatingViolation::RepeatTeammates {
                    table_id: table.table_id,
                    pair,
                });
            }
        }
    }

    for t in previous {
        for id in &t.player_ids {
            if !seen.contains(id.as_str()) {
                violations.push(SeatingViolation::Unseated {
                    player_id: id.clone(),
                });
            }
        }
    }

    violations
}

#[derive(Debug, Clone)]
pub struct SeatingPlan {
    pub movement: Movement,
    pub seating: Bounded<NextSeating, SeatingViolation>,
}

/// Movement plus a validated seating, retried up to `max_attempts` times.
pub fn plan_next_seating<R: Rng + ?Sized>(
    outcomes: &[TableOutcome],
    max_attempts: u32,
    rng: &mut R,
) -> SeatingPlan {
    let mut outcomes = outcomes.to_vec();
    outcomes.sort_by_key(|o| o.table_id);

    let movement = plan_movement(&outcomes);
    let seating = best_of(max_attempts, |_| {
        let seating = assign_seats(&movement, &mut *rng);
        let violations = validate(&seating, &outcomes);
        (seating, violations)
    });

    SeatingPlan { movement, seating }
}
