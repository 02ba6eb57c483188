use proptest::prelude::*;

use crate::domain::rules::round_target;
use crate::domain::scoring::{score, RollScore};
use crate::domain::test_gens;
use crate::domain::test_prelude;

fn roll(points: i64, is_bunco: bool, is_triple_ones: bool) -> RollScore {
    RollScore {
        points,
        is_bunco,
        is_triple_ones,
    }
}

#[test]
fn triple_ones_on_target_one_is_bunco() {
    assert_eq!(score([1, 1, 1], 1), roll(21, true, false));
}

#[test]
fn triple_ones_off_target_wipes_team() {
    assert_eq!(score([1, 1, 1], 4), roll(0, false, true));
}

#[test]
fn triple_target_is_bunco() {
    assert_eq!(score([4, 4, 4], 4), roll(21, true, false));
}

#[test]
fn other_triple_is_fifteen() {
    assert_eq!(score([5, 5, 5], 2), roll(15, false, false));
}

#[test]
fn matching_dice_count_one_each() {
    assert_eq!(score([2, 2, 5], 2), roll(2, false, false));
    assert_eq!(score([3, 6, 2], 6), roll(1, false, false));
    assert_eq!(score([3, 4, 5], 1), roll(0, false, false));
}

#[test]
fn zero_and_triple_ones_end_the_turn() {
    assert!(!score([3, 4, 5], 1).continues_turn());
    assert!(!score([1, 1, 1], 3).continues_turn());
    assert!(score([6, 6, 6], 6).continues_turn());
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: score is a pure function of its inputs
    #[test]
    fn prop_score_is_deterministic(dice in test_gens::dice(), round in test_gens::round()) {
        let target = round_target(round);
        prop_assert_eq!(score(dice, target), score(dice, target));
    }

    /// Property: flags are exclusive and points stay in {0,1,2,15,21}
    #[test]
    fn prop_score_shape(dice in test_gens::dice(), target in test_gens::face()) {
        let s = score(dice, target);
        prop_assert!(!(s.is_bunco && s.is_triple_ones));
        prop_assert!(matches!(s.points, 0 | 1 | 2 | 15 | 21));
        if s.is_bunco {
            prop_assert_eq!(s.points, 21);
        }
        if s.is_triple_ones {
            prop_assert_eq!(s.points, 0);
            prop_assert_ne!(target, 1);
        }
    }

    /// Property: non-triples score the number of target faces
    #[test]
    fn prop_non_triple_counts_matches(dice in test_gens::dice(), target in test_gens::face()) {
        prop_assume!(!(dice[0] == dice[1] && dice[1] == dice[2]));
        let expected = dice.iter().filter(|&&d| d == target).count() as i64;
        prop_assert_eq!(score(dice, target).points, expected);
        prop_assert!(expected <= 2);
    }
}
