//! The bot autoplay loop and its per-turn claim.

use std::time::Duration;

use bunco_backend::AppError;

use crate::support::match_setup::{config_with_timings, eventually, quick_config, seeded_match, NEVER};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn bot_rolls_until_it_misses_then_passes_the_turn() -> Result<(), AppError> {
    // Round 1: two points, one point, then a miss.
    let owned = seeded_match(quick_config(), 2, true, [[1, 1, 2], [1, 3, 4], [2, 3, 4]]).await?;
    let m = &owned;
    let table = m.table(1).await;

    assert!(m.service.maybe_spawn_bot_turn(&m.code, &table).await?);

    assert!(eventually(WAIT, || async move { m.table(1).await.current_turn == 1 }).await);
    assert_eq!(m.player(m.player_at(1, 0)).await.points_this_round, 3);
    assert_eq!(m.dice.remaining(), 0);
    assert!(!m.table(1).await.is_rolling);
    Ok(())
}

#[tokio::test]
async fn bot_triple_ones_ends_its_turn() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, true, [[3, 3, 4], [1, 1, 1], [3, 3, 3]]).await?;
    let m = &owned;
    m.edit_table(1, |t| t.round = 3).await;
    m.set_round_points(m.player_at(1, 2), 6).await;
    let table = m.table(1).await;

    assert!(m.service.maybe_spawn_bot_turn(&m.code, &table).await?);

    assert!(eventually(WAIT, || async move { m.table(1).await.current_turn == 1 }).await);
    assert_eq!(m.player(m.player_at(1, 0)).await.points_this_round, 0);
    assert_eq!(m.player(m.player_at(1, 2)).await.points_this_round, 0);
    assert_eq!(m.dice.remaining(), 1, "the turn ends on triple ones");
    Ok(())
}

#[tokio::test]
async fn one_bot_loop_per_turn() -> Result<(), AppError> {
    let config = config_with_timings(|t| t.bot_roll_presentation = NEVER);
    let owned = seeded_match(config, 2, true, []).await?;
    let m = &owned;
    let table = m.table(1).await;

    assert!(m.service.maybe_spawn_bot_turn(&m.code, &table).await?);
    assert!(!m.service.maybe_spawn_bot_turn(&m.code, &table).await?);

    // A turn the table has already left frees its claim.
    let mut moved_on = table.clone();
    moved_on.current_turn = 1;
    m.service.release_stale_bot_claim(&m.code, &moved_on);
    assert!(m.service.maybe_spawn_bot_turn(&m.code, &moved_on).await?);
    Ok(())
}

#[tokio::test]
async fn humans_never_get_a_bot_loop() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    let table = m.table(0).await;

    assert!(!m.service.maybe_spawn_bot_turn(&m.code, &table).await?);
    Ok(())
}

#[tokio::test]
async fn no_bot_loop_during_a_transition() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, true, []).await?;
    let m = &owned;
    m.edit_game(|g| g.round_transition_in_progress = true).await;
    let table = m.table(0).await;

    assert!(!m.service.maybe_spawn_bot_turn(&m.code, &table).await?);
    Ok(())
}

#[tokio::test]
async fn bot_stops_when_the_round_ends_elsewhere() -> Result<(), AppError> {
    let config = config_with_timings(|t| t.bot_result_display = Duration::from_millis(50));
    let owned = seeded_match(config, 2, true, [[1, 2, 3]]).await?;
    let m = &owned;
    let table = m.table(1).await;

    assert!(m.service.maybe_spawn_bot_turn(&m.code, &table).await?);
    assert!(eventually(WAIT, || async move { m.dice.remaining() == 0 }).await);
    m.edit_table(1, |t| t.round_over = true).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let table = m.table(1).await;
    assert_eq!(table.current_turn, 0);
    assert_eq!(m.player(m.player_at(1, 0)).await.points_this_round, 1);
    Ok(())
}
