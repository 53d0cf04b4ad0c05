use std::{collections::HashMap, sync::Arc};

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{error::DispatchError, model::ServerMessage};

pub type SessionId = Arc<str>;

fn session_id() -> SessionId {
    uuid::Uuid::new_v4().to_string().into()
}

const SESSION_CHANNEL_CAPACITY: usize = 64;

/// One live session's directory entry: the exclusive sink towards the
/// client plus the token that tears the stream down on explicit close.
struct Session {
    tx: mpsc::Sender<ServerMessage>,
    closed: CancellationToken,
}

/// What the transport gets back from [`SessionDirectory::create`]: the
/// assigned id, the receiving end of the session's sink, and a token that
/// is cancelled when the directory closes the session.
pub struct SessionHandle {
    pub id: SessionId,
    pub rx: mpsc::Receiver<ServerMessage>,
    pub closed: CancellationToken,
}

/// The process-wide table of live sessions. The map behind the lock is the
/// only shared mutable state in the server; the lock is never held across a
/// channel send.
#[derive(Clone, Default)]
pub struct SessionDirectory {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh session. The id is inserted under the write lock
    /// before `create` returns, so a concurrent lookup can never observe an
    /// assigned id without a directory entry. A watcher task closes the
    /// session once the client side of the channel is gone.
    pub async fn create(&self) -> SessionHandle {
        let id = session_id();
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let closed = CancellationToken::new();
        self.sessions.write().await.insert(
            id.clone(),
            Session {
                tx: tx.clone(),
                closed: closed.clone(),
            },
        );
        tracing::debug!(session_id = %id, "session created");

        let directory = self.clone();
        let watched = id.clone();
        tokio::spawn(async move {
            tx.closed().await;
            directory.close(&watched).await;
        });

        SessionHandle { id, rx, closed }
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Delivers `message` to the session's sink, preserving per-session
    /// submission order. Absent or already-closed ids fail with
    /// [`DispatchError::NoActiveSession`]; the sink is never written after
    /// release.
    pub async fn push(&self, id: &str, message: ServerMessage) -> Result<(), DispatchError> {
        let tx = {
            let sessions = self.sessions.read().await;
            sessions.get(id).map(|session| session.tx.clone())
        };
        let Some(tx) = tx else {
            return Err(DispatchError::NoActiveSession(id.to_string()));
        };
        tx.send(message)
            .await
            .map_err(|_| DispatchError::NoActiveSession(id.to_string()))
    }

    /// Removes the session and ends its stream. Idempotent: close can race
    /// with the natural disconnect notification, so an unknown or
    /// already-closed id is a no-op.
    pub async fn close(&self, id: &str) {
        let removed = self.sessions.write().await.remove(id);
        if let Some(session) = removed {
            session.closed.cancel();
            tracing::debug!(session_id = id, "session closed");
        }
    }
}
