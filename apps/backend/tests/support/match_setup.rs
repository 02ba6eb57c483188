//! Fixtures that put a match into a known state without going through the
//! shuffled `start_match` path.

use std::sync::Arc;
use std::time::Duration;

use bunco_backend::config::{EngineConfig, Timings};
use bunco_backend::domain::{Dice, ScriptedDice};
use bunco_backend::entities::{GameDoc, PlayerDoc, TableDoc};
use bunco_backend::repos::{games, players, tables};
use bunco_backend::services::game_flow::GameFlowService;
use bunco_backend::store::{DocumentStore, FaultyStore, GameCode, MemoryStore};
use bunco_backend::{build_state, AppError, AppState};
use bunco_test_support::unique_helpers::unique_game_code;

/// Timings long enough that a timer never fires during a test.
pub const NEVER: Duration = Duration::from_secs(3600);

pub struct TestMatch {
    pub state: AppState,
    pub service: Arc<GameFlowService>,
    pub dice: Arc<ScriptedDice>,
    pub code: GameCode,
    /// `tables[t][seat]` is the player id seated there.
    pub tables: Vec<[String; 4]>,
}

impl TestMatch {
    pub fn store(&self) -> &dyn DocumentStore {
        self.state.store.as_ref()
    }

    pub fn player_at(&self, table: usize, seat: usize) -> &str {
        &self.tables[table][seat]
    }

    pub async fn game(&self) -> GameDoc {
        games::require(self.store(), &self.code)
            .await
            .expect("game document")
    }

    pub async fn table(&self, table_id: u32) -> TableDoc {
        tables::require(self.store(), &self.code, table_id)
            .await
            .expect("table document")
    }

    pub async fn player(&self, player_id: &str) -> PlayerDoc {
        players::require(self.store(), &self.code, player_id)
            .await
            .expect("player document")
    }

    pub async fn set_round_points(&self, player_id: &str, points: i64) {
        let mut player = self.player(player_id).await;
        player.points_this_round = points;
        players::put(self.store(), &self.code, &player)
            .await
            .expect("write player");
    }

    pub async fn edit_game(&self, edit: impl FnOnce(&mut GameDoc)) {
        let mut game = self.game().await;
        edit(&mut game);
        games::put(self.store(), &self.code, &game)
            .await
            .expect("write game");
    }

    pub async fn edit_table(&self, table_id: u32, edit: impl FnOnce(&mut TableDoc)) {
        let mut table = self.table(table_id).await;
        edit(&mut table);
        tables::put(self.store(), &self.code, &table)
            .await
            .expect("write table");
    }

    /// Raw snapshot of every document in the match, for "nothing changed" checks.
    pub async fn snapshot(&self) -> Vec<(String, Option<serde_json::Value>)> {
        let store = self.store();
        let mut docs = Vec::new();
        let game = store.get(&self.code.doc()).await.expect("read game");
        docs.push((self.code.doc().to_string(), game.map(serde_json::Value::Object)));
        for (id, doc) in store.list(&self.code.tables()).await.expect("list tables") {
            docs.push((format!("table/{id}"), Some(serde_json::Value::Object(doc))));
        }
        for (id, doc) in store.list(&self.code.players()).await.expect("list players") {
            docs.push((format!("player/{id}"), Some(serde_json::Value::Object(doc))));
        }
        docs
    }
}

pub fn quick_config() -> EngineConfig {
    EngineConfig::instant()
}

/// Instant everything except the timers named by `edit`.
pub fn config_with_timings(edit: impl FnOnce(&mut Timings)) -> EngineConfig {
    let mut config = EngineConfig::instant();
    edit(&mut config.timings);
    config
}

/// A started match with `table_count` full tables of humans (or bots), every
/// table in round 1 and turn 0.
pub async fn seeded_match(
    config: EngineConfig,
    table_count: usize,
    bots: bool,
    rolls: impl IntoIterator<Item = Dice>,
) -> Result<TestMatch, AppError> {
    seeded_match_on(Arc::new(MemoryStore::new()), config, table_count, bots, rolls).await
}

/// Same as [`seeded_match`] but writes go through a [`FaultyStore`].
pub async fn seeded_faulty_match(
    config: EngineConfig,
    table_count: usize,
) -> Result<(TestMatch, Arc<FaultyStore>), AppError> {
    let faulty = Arc::new(FaultyStore::new(Arc::new(MemoryStore::new())));
    let m = seeded_match_on(faulty.clone(), config, table_count, false, []).await?;
    Ok((m, faulty))
}

async fn seeded_match_on(
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
    table_count: usize,
    bots: bool,
    rolls: impl IntoIterator<Item = Dice>,
) -> Result<TestMatch, AppError> {
    let state = build_state().with_store(store).with_config(config).build().await?;
    let dice = Arc::new(ScriptedDice::new(rolls, [2, 3, 4]));
    let service = GameFlowService::with_dice(&state, dice.clone());
    let code = GameCode::new(unique_game_code());
    let store = state.store.as_ref();

    let mut layout = Vec::with_capacity(table_count);
    for t in 0..table_count {
        let ids: [String; 4] = std::array::from_fn(|seat| format!("t{t}s{seat}"));
        for (seat, id) in ids.iter().enumerate() {
            let mut player = PlayerDoc::new(id, format!("Player {id}"), bots);
            player.table = Some(t as u32);
            player.seat = Some(seat as u8);
            player.is_host = t == 0 && seat == 0;
            players::put(store, &code, &player).await?;
        }
        tables::put(store, &code, &TableDoc::new(t as u32, ids.to_vec(), 0)).await?;
        layout.push(ids);
    }

    let game = GameDoc {
        started: true,
        ..GameDoc::default()
    };
    games::put(store, &code, &game).await?;

    Ok(TestMatch {
        state,
        service,
        dice,
        code,
        tables: layout,
    })
}

/// Poll `check` until it returns true or `timeout` passes.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
