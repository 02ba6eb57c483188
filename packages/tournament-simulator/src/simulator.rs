//! Runs one all-bot tournament against a fresh in-memory store.

use std::sync::Arc;
use std::time::Duration;

use bunco_backend::entities::{GameDoc, PlayerDoc};
use bunco_backend::realtime::{HostAgent, TableAgent};
use bunco_backend::repos::{games, players};
use bunco_backend::services::game_flow::{GameFlowService, MatchStart};
use bunco_backend::services::results::{load_results, MatchResults};
use bunco_backend::store::{decode, GameCode, MemoryStore};
use bunco_backend::{build_state, AppError, EngineConfig};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct TournamentResult {
    pub code: String,
    pub seed: u64,
    pub start: MatchStart,
    pub results: MatchResults,
    pub timed_out: bool,
}

pub struct Simulator {
    seed: u64,
    tournament_no: u32,
    players: usize,
    target_rounds: u32,
    timeout: Duration,
}

impl Simulator {
    pub fn new(seed: u64, tournament_no: u32, players: usize, target_rounds: u32, timeout: Duration) -> Self {
        Self {
            seed,
            tournament_no,
            players,
            target_rounds,
            timeout,
        }
    }

    fn config(&self) -> EngineConfig {
        EngineConfig {
            seed: Some(self.seed),
            auto_advance_rounds: true,
            ..EngineConfig::instant()
        }
    }

    pub async fn simulate_tournament(&self) -> Result<TournamentResult, AppError> {
        let state = build_state()
            .with_store(Arc::new(MemoryStore::new()))
            .with_config(self.config())
            .build()
            .await?;
        let store = state.store.as_ref();
        let code = GameCode::new(format!("SIM{:05}", self.tournament_no));

        for i in 0..self.players {
            let mut bot = PlayerDoc::new(format!("sim-{i}"), format!("Sim Bot {}", i + 1), true);
            bot.is_host = i == 0;
            players::put(store, &code, &bot).await?;
        }
        let game = GameDoc {
            target_rounds: self.target_rounds,
            ..GameDoc::default()
        };
        games::put(store, &code, &game).await?;

        let service = GameFlowService::new(&state);
        let start = service.start_match(&code).await?;

        let cancel = CancellationToken::new();
        let mut agents = Vec::with_capacity(start.tables + 1);
        for table_id in 0..start.tables as u32 {
            agents.push(TableAgent::new(service.clone(), code.clone(), table_id).spawn(cancel.child_token()));
        }
        agents.push(HostAgent::new(service.clone(), code.clone()).spawn(cancel.child_token()));

        let timed_out = tokio::time::timeout(self.timeout, wait_for_game_over(&service, &code))
            .await
            .is_err();
        if timed_out {
            warn!(game = %code, seed = self.seed, "Tournament timed out");
        }

        cancel.cancel();
        for agent in agents {
            if let Err(err) = agent.await {
                warn!(game = %code, error = %err, "Agent task panicked");
            }
        }
        service.shutdown();

        let results = load_results(store, &code).await?;
        debug!(game = %code, rounds = results.rounds_completed, "Tournament finished");
        Ok(TournamentResult {
            code: code.to_string(),
            seed: self.seed,
            start,
            results,
            timed_out,
        })
    }
}

async fn wait_for_game_over(service: &GameFlowService, code: &GameCode) {
    let path = code.doc();
    let mut stream = match service.store().subscribe(&path).await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(game = %code, error = %err, "Could not watch game document");
            return;
        }
    };
    while let Some(snapshot) = stream.next().await {
        let Some(doc) = snapshot else { continue };
        match decode::<GameDoc>(&path, doc) {
            Ok(game) if game.game_over => return,
            Ok(_) => {}
            Err(err) => warn!(game = %code, error = %err, "Skipping malformed game snapshot"),
        }
    }
}
