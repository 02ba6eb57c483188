use bunco_backend::realtime::HostAgent;
use bunco_backend::AppError;

use crate::support::match_setup::{quick_config, seeded_match};

#[tokio::test]
async fn tick_ends_round_and_advances_when_enabled() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    m.set_round_points(m.player_at(0, 3), 21).await;

    let host = HostAgent::new(m.service.clone(), m.code.clone()).with_auto_advance(true);
    assert!(!host.tick().await?);

    let game = m.game().await;
    assert_eq!(game.rounds_completed, 1);
    assert!(!game.next_round_ready);
    assert_eq!(m.table(0).await.round, 2);
    Ok(())
}

#[tokio::test]
async fn tick_without_auto_advance_only_flags_the_round() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    m.set_round_points(m.player_at(0, 0), 25).await;

    let host = HostAgent::new(m.service.clone(), m.code.clone());
    assert!(!host.tick().await?);

    let game = m.game().await;
    assert!(game.next_round_ready);
    assert_eq!(game.rounds_completed, 0);
    assert!(m.table(1).await.round_over);
    Ok(())
}

#[tokio::test]
async fn tick_reports_game_over() -> Result<(), AppError> {
    let owned = seeded_match(quick_config(), 2, false, []).await?;
    let m = &owned;
    m.edit_game(|g| g.game_over = true).await;

    let host = HostAgent::new(m.service.clone(), m.code.clone());
    assert!(host.tick().await?);
    Ok(())
}
