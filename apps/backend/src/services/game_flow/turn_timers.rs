use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use super::TableKey;

/// At most one pending turn timer per table. Arming a new one cancels the old.
#[derive(Default)]
pub(super) struct TurnTimers {
    tokens: DashMap<TableKey, CancellationToken>,
}

impl TurnTimers {
    pub fn arm(&self, key: TableKey) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.tokens.insert(key, token.clone()) {
            previous.cancel();
        }
        token
    }

    pub fn cancel(&self, key: &TableKey) {
        if let Some((_, token)) = self.tokens.remove(key) {
            token.cancel();
        }
    }

    /// Cancel and drop every timer belonging to `game`.
    pub fn cancel_game(&self, game: &str) {
        self.tokens.retain(|(code, _), token| {
            if code == game {
                token.cancel();
                false
            } else {
                true
            }
        });
    }

    pub fn cancel_all(&self) {
        for entry in self.tokens.iter() {
            entry.value().cancel();
        }
        self.tokens.clear();
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.tokens.len()
    }
}
