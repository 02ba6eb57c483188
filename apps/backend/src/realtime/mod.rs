//! Client-side agents that react to document changes.
//!
//! Each agent is an independent tokio task. There is no central scheduler:
//! agents subscribe to documents and call into [`GameFlowService`], which
//! re-checks every precondition against the store before acting.
//!
//! [`GameFlowService`]: crate::services::game_flow::GameFlowService

pub mod host;
pub mod session;
pub mod table_agent;

pub use host::HostAgent;
pub use session::{ClientSession, SessionHandle};
pub use table_agent::TableAgent;

use tracing::warn;

use crate::entities::GameDoc;
use crate::repos::games;
use crate::store::{DocPath, Document};

/// Decode a game snapshot, logging and dropping malformed ones.
pub(crate) fn game_snapshot(path: &DocPath, doc: Document) -> Option<GameDoc> {
    match games::from_snapshot(path, doc) {
        Ok(game) => Some(game),
        Err(err) => {
            warn!(path = %path, error = %err, "Skipping malformed game snapshot");
            None
        }
    }
}
