use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::SessionHandle;
use crate::domain::roles::Round;

/// Fire `on_deadline(round)` after `timeout` unless the token is cancelled first.
///
/// The task holds a weak reference, so a dropped session cancels nothing and
/// leaks nothing.
pub(super) fn schedule(
    handle: &Arc<SessionHandle>,
    round: Round,
    timeout: Duration,
) -> CancellationToken {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let weak = Arc::downgrade(handle);
    let game_id = handle.game_id();

    tokio::spawn(async move {
        tokio::select! {
            _ = cancelled.cancelled() => {
                debug!(game_id = %game_id, round, "Round deadline cancelled");
            }
            _ = tokio::time::sleep(timeout) => {
                if let Some(handle) = weak.upgrade() {
                    handle.on_deadline(round).await;
                }
            }
        }
    });

    token
}
