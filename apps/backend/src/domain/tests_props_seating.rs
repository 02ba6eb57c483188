//! Property tests for between-round re-seating (pure domain, no store).
//!
//! Properties tested:
//! - Every table ends with four distinct players in seats 0..=3
//! - Every player is seated exactly once
//! - Head-table winners and other tables' losers stay put
//! - Movers land on the next table id, wrapping
//! - Nobody is partnered with a previous partner

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::seating::{plan_movement, plan_next_seating, HEAD_TABLE};
use crate::domain::teams::Team;
use crate::domain::{test_gens, test_prelude};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_seating_is_complete_and_unique(
        outcomes in test_gens::table_outcomes(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = plan_next_seating(&outcomes, 10, &mut rng);
        prop_assert!(plan.seating.satisfied(), "violations: {:?}", plan.seating.violations);

        let seating = &plan.seating.value;
        prop_assert_eq!(seating.tables.len(), outcomes.len());
        prop_assert!(seating.unseated.is_empty());

        let mut seen = HashSet::new();
        for table in &seating.tables {
            prop_assert_eq!(table.filled(), 4);
            for id in table.player_ids() {
                prop_assert!(seen.insert(id));
            }
        }
        prop_assert_eq!(seen.len(), outcomes.len() * 4);
    }

    #[test]
    fn prop_movement_policy(outcomes in test_gens::table_outcomes()) {
        let movement = plan_movement(&outcomes);
        let n = outcomes.len() as u32;

        for outcome in &outcomes {
            let result = outcome.result();
            let staying_team = if outcome.table_id == HEAD_TABLE {
                result.winner
            } else {
                result.winner.other()
            };
            let expected: Vec<String> = staying_team
                .seats()
                .map(|s| outcome.player_ids[s].clone())
                .collect();
            let stayers = movement
                .stayers
                .iter()
                .find(|(t, _)| *t == outcome.table_id)
                .map(|(_, ids)| ids.clone());
            prop_assert_eq!(stayers, Some(expected));
        }

        for mover in &movement.movers {
            prop_assert_eq!(mover.to, (mover.from + 1) % n);
        }
        prop_assert_eq!(movement.movers.len(), outcomes.len() * 2);
        prop_assert_eq!(movement.winners.len(), outcomes.len() * 2);
    }

    #[test]
    fn prop_no_repeat_partners(
        outcomes in test_gens::table_outcomes(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = plan_next_seating(&outcomes, 10, &mut rng);

        let mut previous_team: HashMap<String, (u32, Team)> = HashMap::new();
        for o in &outcomes {
            for (seat, id) in o.player_ids.iter().enumerate() {
                previous_team.insert(id.clone(), (o.table_id, Team::of_seat(seat)));
            }
        }

        for table in &plan.seating.value.tables {
            for team in [Team::Even, Team::Odd] {
                let members: Vec<_> = team
                    .seats()
                    .filter_map(|s| table.seats[s].clone())
                    .collect();
                prop_assert_eq!(members.len(), 2);
                prop_assert_ne!(
                    previous_team.get(&members[0]),
                    previous_team.get(&members[1])
                );
            }
        }
    }
}

#[test]
fn two_table_rotation_swaps_movers() {
    use crate::domain::seating::TableOutcome;

    let outcomes = vec![
        TableOutcome {
            table_id: 0,
            player_ids: ["a", "b", "c", "d"].map(String::from),
            points: [10, 2, 12, 3],
        },
        TableOutcome {
            table_id: 1,
            player_ids: ["e", "f", "g", "h"].map(String::from),
            points: [1, 8, 1, 9],
        },
    ];
    let movement = plan_movement(&outcomes);

    // Head table: a/c won and stay; b/d move to table 1.
    assert_eq!(movement.stayers[0], (0, vec!["a".into(), "c".into()]));
    // Table 1: f/h won and move to table 0; e/g stay.
    assert_eq!(movement.stayers[1], (1, vec!["e".into(), "g".into()]));
    let to_head: Vec<_> = movement
        .movers
        .iter()
        .filter(|m| m.to == 0)
        .map(|m| m.player_id.as_str())
        .collect();
    assert_eq!(to_head, vec!["f", "h"]);

    let mut winners = movement.winners.clone();
    winners.sort();
    assert_eq!(winners, vec!["a", "c", "f", "h"]);
    assert!(movement.is_winner("h"));
    assert!(!movement.is_winner("b"));
}

#[test]
fn stayers_take_front_seats() {
    use crate::domain::seating::{assign_seats, TableOutcome};

    let outcomes = vec![
        TableOutcome {
            table_id: 0,
            player_ids: ["a", "b", "c", "d"].map(String::from),
            points: [10, 2, 12, 3],
        },
        TableOutcome {
            table_id: 1,
            player_ids: ["e", "f", "g", "h"].map(String::from),
            points: [1, 8, 1, 9],
        },
    ];
    let movement = plan_movement(&outcomes);
    let mut rng = StdRng::seed_from_u64(11);
    let seating = assign_seats(&movement, &mut rng);

    let head = &seating.tables[0];
    let front: HashSet<_> = head.seats[..2].iter().flatten().cloned().collect();
    let back: HashSet<_> = head.seats[2..].iter().flatten().cloned().collect();
    assert_eq!(front, HashSet::from(["a".to_string(), "c".to_string()]));
    assert_eq!(back, HashSet::from(["f".to_string(), "h".to_string()]));
}
