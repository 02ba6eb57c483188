use bunco_backend::errors::ErrorCode;
use bunco_backend::repos::players;
use bunco_backend::AppError;

use crate::support::match_setup::{quick_config, seeded_match, TestMatch};

async fn set_tallies(m: &TestMatch, player_id: &str, rounds_won: u32, total_points: i64) {
    let mut player = m.player(player_id).await;
    player.rounds_won = rounds_won;
    player.total_points = total_points;
    players::put(m.store(), &m.code, &player)
        .await
        .expect("write player");
}

#[tokio::test]
async fn no_winner_before_target_rounds() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    set_tallies(m, m.player_at(0, 0), 5, 90).await;

    assert!(m.service.check_win_condition(&m.code).await?.is_none());
    let game = m.game().await;
    assert!(!game.game_over);
    assert!(game.winner.is_none());
    Ok(())
}

#[tokio::test]
async fn most_points_among_qualifiers_wins_once() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    set_tallies(m, m.player_at(0, 0), 6, 80).await;
    set_tallies(m, m.player_at(1, 3), 7, 95).await;
    // More points but not enough rounds.
    set_tallies(m, m.player_at(1, 0), 5, 200).await;

    let winner = m
        .service
        .check_win_condition(&m.code)
        .await?
        .expect("a winner");
    assert_eq!(winner.id, m.player_at(1, 3));
    assert_eq!(winner.rounds_won, 7);
    assert_eq!(winner.total_points, 95);

    let game = m.game().await;
    assert!(game.game_over);
    assert!(game.finished_at.is_some());
    assert_eq!(game.winner.as_ref(), Some(&winner));

    // Later changes cannot produce a second winner.
    set_tallies(m, m.player_at(0, 0), 9, 500).await;
    assert!(m.service.check_win_condition(&m.code).await?.is_none());
    assert_eq!(m.game().await.winner, Some(winner));
    Ok(())
}

#[tokio::test]
async fn custom_target_rounds_are_honoured() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    m.edit_game(|g| g.target_rounds = 2).await;
    set_tallies(m, m.player_at(0, 1), 2, 30).await;

    let winner = m.service.check_win_condition(&m.code).await?;
    assert_eq!(winner.map(|w| w.id), Some(m.player_at(0, 1).to_string()));
    Ok(())
}

#[tokio::test]
async fn zero_target_rounds_never_crowns_a_winner() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    m.edit_game(|g| g.target_rounds = 0).await;

    let err = m
        .service
        .check_win_condition(&m.code)
        .await
        .expect_err("a zero target is rejected when read");
    assert_eq!(err.code(), ErrorCode::MalformedDocument);

    let raw = m.store().get(&m.code.doc()).await?.expect("game document");
    assert_eq!(raw.get("gameOver"), Some(&serde_json::json!(false)));
    assert!(raw.get("winner").map_or(true, serde_json::Value::is_null));
    Ok(())
}
