//! Roll guards, scoring credit and the triple-ones team wipe.

use std::time::Duration;

use bunco_backend::config::TotalPointsMode;
use bunco_backend::services::game_flow::{Disposition, IgnoreReason, RollOutcome};
use bunco_backend::AppError;

use crate::support::match_setup::{
    config_with_timings, eventually, quick_config, seeded_match, TestMatch, NEVER,
};

fn no_timers() -> bunco_backend::EngineConfig {
    config_with_timings(|t| {
        t.zero_roll_advance = NEVER;
        t.end_turn_enable_delay = NEVER;
    })
}

/// Long enough to interfere with a roll while its dice are in the air.
fn slow_presentation() -> bunco_backend::EngineConfig {
    config_with_timings(|t| {
        t.roll_presentation = Duration::from_millis(300);
        t.zero_roll_advance = NEVER;
        t.end_turn_enable_delay = NEVER;
    })
}

/// Run a roll at `table_id` and apply `interfere` once the table shows it rolling.
async fn roll_with_interference<F, Fut>(
    m: &TestMatch,
    table_id: u32,
    interfere: F,
) -> Result<Disposition<RollOutcome>, AppError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let roller = m.player_at(table_id as usize, 0).to_string();
    let (outcome, ()) = tokio::join!(m.service.roll(&m.code, table_id, &roller), async {
        let rolling = eventually(Duration::from_secs(2), || async move {
            m.table(table_id).await.is_rolling
        })
        .await;
        assert!(rolling, "roll should mark the table rolling first");
        interfere().await;
    });
    outcome
}

#[tokio::test]
async fn roll_abandoned_when_transition_starts_mid_roll() -> Result<(), AppError> {
    let owned = seeded_match(slow_presentation(), 2, false, [[1, 1, 2]]).await?;
    let m = &owned;

    let outcome = roll_with_interference(m, 0, || async {
        m.edit_game(|g| g.round_transition_in_progress = true).await;
    })
    .await?;

    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::Stale));
    let table = m.table(0).await;
    assert!(!table.is_rolling);
    assert!(table.last_roll.is_none());
    assert_eq!(table.current_turn, 0);
    assert_eq!(m.dice.remaining(), 1, "no dice should have been drawn");
    assert_eq!(m.player(m.player_at(0, 0)).await.points_this_round, 0);
    Ok(())
}

#[tokio::test]
async fn roll_abandoned_when_round_ends_mid_roll() -> Result<(), AppError> {
    let owned = seeded_match(slow_presentation(), 2, false, [[1, 1, 2]]).await?;
    let m = &owned;

    let outcome = roll_with_interference(m, 1, || async {
        m.edit_table(1, |t| t.round_over = true).await;
    })
    .await?;

    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::Stale));
    let table = m.table(1).await;
    assert!(!table.is_rolling);
    assert!(table.round_over);
    assert_eq!(table.dice, [1, 1, 1]);
    assert_eq!(m.dice.remaining(), 1, "no dice should have been drawn");
    assert_eq!(m.player(m.player_at(1, 0)).await.points_this_round, 0);
    Ok(())
}

#[tokio::test]
async fn roll_by_non_current_player_changes_nothing() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[1, 1, 2]]).await?;
    let m = &owned;
    let before = m.snapshot().await;

    let outcome = m.service.roll(&m.code, 0, m.player_at(0, 1)).await?;

    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::NotYourTurn));
    assert_eq!(m.snapshot().await, before);
    assert_eq!(m.dice.remaining(), 1, "no dice should have been drawn");
    Ok(())
}

#[tokio::test]
async fn roll_is_ignored_while_transition_runs() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, []).await?;
    let m = &owned;
    m.edit_game(|g| g.round_transition_in_progress = true).await;
    let before = m.snapshot().await;

    let outcome = m.service.roll(&m.code, 0, m.player_at(0, 0)).await?;

    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::TransitionInProgress));
    assert_eq!(m.snapshot().await, before);
    Ok(())
}

#[tokio::test]
async fn roll_is_ignored_after_round_over_or_mid_roll() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, []).await?;
    let m = &owned;

    m.edit_table(1, |t| t.round_over = true).await;
    let before = m.snapshot().await;
    let outcome = m.service.roll(&m.code, 1, m.player_at(1, 0)).await?;
    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::RoundOver));
    assert_eq!(m.snapshot().await, before);

    m.edit_table(0, |t| t.is_rolling = true).await;
    let before = m.snapshot().await;
    let outcome = m.service.roll(&m.code, 0, m.player_at(0, 0)).await?;
    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::RollInFlight));
    assert_eq!(m.snapshot().await, before);
    Ok(())
}

#[tokio::test]
async fn roll_is_ignored_before_start_and_after_game_over() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, []).await?;
    let m = &owned;

    m.edit_game(|g| g.started = false).await;
    let outcome = m.service.roll(&m.code, 0, m.player_at(0, 0)).await?;
    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::GameNotStarted));

    m.edit_game(|g| {
        g.started = true;
        g.game_over = true;
    })
    .await;
    let outcome = m.service.roll(&m.code, 0, m.player_at(0, 0)).await?;
    assert_eq!(outcome.ignored_reason(), Some(IgnoreReason::GameOver));
    Ok(())
}

#[tokio::test]
async fn scoring_roll_credits_round_points_only() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[1, 1, 2]]).await?;
    let m = &owned;
    let roller = m.player_at(1, 0);

    let outcome = m.service.roll(&m.code, 1, roller).await?;

    let Disposition::Applied(out) = outcome else {
        panic!("roll should apply");
    };
    assert_eq!(out.dice, [1, 1, 2]);
    assert_eq!(out.score.points, 2);
    assert!(!out.ended_round);

    let table = m.table(1).await;
    assert_eq!(table.dice, [1, 1, 2]);
    assert!(!table.is_rolling);
    let last = table.last_roll.expect("last roll recorded");
    assert_eq!(last.points, 2);
    assert_eq!(last.player_id.as_deref(), Some(roller));

    let player = m.player(roller).await;
    assert_eq!(player.points_this_round, 2);
    assert_eq!(player.total_points, 0, "totals are credited at round end");
    Ok(())
}

#[tokio::test]
async fn per_roll_mode_credits_total_immediately() -> Result<(), AppError> {
    let mut config = no_timers();
    config.total_points_mode = TotalPointsMode::PerRoll;
    let owned = seeded_match(config, 2, false, [[1, 4, 1]]).await?;
    let m = &owned;
    let roller = m.player_at(1, 0);

    m.service.roll(&m.code, 1, roller).await?;

    let player = m.player(roller).await;
    assert_eq!(player.points_this_round, 2);
    assert_eq!(player.total_points, 2);
    Ok(())
}

#[tokio::test]
async fn bunco_scores_21_and_is_counted() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[1, 1, 1]]).await?;
    let m = &owned;
    let roller = m.player_at(1, 0);

    let out = m
        .service
        .roll(&m.code, 1, roller)
        .await?
        .applied()
        .expect("bunco roll applies");

    assert!(out.score.is_bunco);
    let player = m.player(roller).await;
    assert_eq!(player.points_this_round, 21);
    assert_eq!(player.bunco_count, 1);
    // Only the head table ends rounds.
    assert!(!m.table(0).await.round_over);
    assert!(!m.game().await.next_round_ready);
    Ok(())
}

#[tokio::test]
async fn triple_ones_zeroes_exactly_the_rollers_team() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[1, 1, 1]]).await?;
    let m = &owned;
    m.edit_table(1, |t| t.round = 2).await;
    for t in 0..2 {
        for seat in 0..4 {
            m.set_round_points(m.player_at(t, seat), 5).await;
        }
    }

    let out = m
        .service
        .roll(&m.code, 1, m.player_at(1, 0))
        .await?
        .applied()
        .expect("roll applies");
    assert!(out.score.is_triple_ones);
    assert_eq!(out.score.points, 0);

    assert_eq!(m.player(m.player_at(1, 0)).await.points_this_round, 0);
    assert_eq!(m.player(m.player_at(1, 2)).await.points_this_round, 0);
    assert_eq!(m.player(m.player_at(1, 1)).await.points_this_round, 5);
    assert_eq!(m.player(m.player_at(1, 3)).await.points_this_round, 5);
    for seat in 0..4 {
        assert_eq!(m.player(m.player_at(0, seat)).await.points_this_round, 5);
    }
    Ok(())
}

#[tokio::test]
async fn zero_roll_blocks_another_roll_in_the_same_turn() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[2, 3, 4], [1, 1, 1]]).await?;
    let m = &owned;
    let roller = m.player_at(0, 0);

    let first = m.service.roll(&m.code, 0, roller).await?;
    assert_eq!(first.applied().map(|o| o.score.points), Some(0));

    let second = m.service.roll(&m.code, 0, roller).await?;
    assert_eq!(second.ignored_reason(), Some(IgnoreReason::TurnFinished));
    assert_eq!(m.dice.remaining(), 1);
    Ok(())
}

#[tokio::test]
async fn scoring_roll_lets_the_player_roll_again() -> Result<(), AppError> {
    let owned = seeded_match(no_timers(), 2, false, [[1, 2, 3], [1, 1, 4]]).await?;
    let m = &owned;
    let roller = m.player_at(1, 0);

    assert!(m.service.roll(&m.code, 1, roller).await?.is_applied());
    assert!(m.service.roll(&m.code, 1, roller).await?.is_applied());

    assert_eq!(m.player(roller).await.points_this_round, 3);
    assert_eq!(m.table(1).await.current_turn, 0);
    Ok(())
}

#[tokio::test]
async fn zero_roll_hands_the_turn_on() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, [[2, 3, 4]]).await?;
    let m = &owned;

    m.service.roll(&m.code, 1, m.player_at(1, 0)).await?;

    let advanced = crate::support::match_setup::eventually(std::time::Duration::from_secs(2), || async move {
        m.table(1).await.current_turn == 1
    })
    .await;
    assert!(advanced, "zero roll should advance the turn");
    let table = m.table(1).await;
    assert!(table.last_roll.is_none());
    assert!(!table.can_end_turn);
    Ok(())
}
