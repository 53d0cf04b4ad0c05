use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    dispatch::Dispatcher,
    error::DispatchError,
    model::ToolRequest,
    registry::ToolRegistry,
    session::{SessionDirectory, SessionHandle},
};

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(15);
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SseServerConfig {
    pub bind: SocketAddr,
    pub sse_path: String,
    pub post_path: String,
    pub ct: CancellationToken,
    pub sse_keep_alive: Option<Duration>,
    pub handler_timeout: Duration,
}

impl SseServerConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            sse_path: "/sse".to_string(),
            post_path: "/messages".to_string(),
            ct: CancellationToken::new(),
            sse_keep_alive: Some(DEFAULT_KEEP_ALIVE),
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }
}

#[derive(Clone)]
struct App {
    sessions: SessionDirectory,
    dispatcher: Dispatcher,
    post_path: Arc<str>,
    sse_ping_interval: Duration,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostQuery {
    session_id: String,
}

/// Request ingestion. The target session id must arrive explicitly in the
/// `sessionId` query parameter; there is no fallback routing. The 202
/// acknowledges ingestion only — the tool outcome arrives on the stream.
async fn post_handler(
    State(app): State<App>,
    Query(PostQuery { session_id }): Query<PostQuery>,
    Json(request): Json<ToolRequest>,
) -> Result<StatusCode, StatusCode> {
    tracing::debug!(session_id, tool = %request.tool_name, "inbound tool request");
    match app.dispatcher.handle(&session_id, request).await {
        Ok(()) => Ok(StatusCode::ACCEPTED),
        Err(DispatchError::NoActiveSession(_)) => Err(StatusCode::NOT_FOUND),
        Err(error) => {
            tracing::error!(%error, "dispatch failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Connection accept. Creates the session and holds the stream open: the
/// first frame is the `endpoint` event carrying the assigned session id,
/// every later frame is a `message` event with one server message.
async fn sse_handler(
    State(app): State<App>,
) -> Sse<impl Stream<Item = Result<Event, io::Error>>> {
    let SessionHandle { id, rx, closed } = app.sessions.create().await;
    tracing::info!(session_id = %id, "sse connection opened");

    let endpoint = format!("{}?sessionId={}", app.post_path, id);
    let stream = futures::stream::once(futures::future::ok(
        Event::default().event("endpoint").data(endpoint),
    ))
    .chain(
        ReceiverStream::new(rx)
            .map(|message| match serde_json::to_string(&message) {
                Ok(json) => Ok(Event::default().event("message").data(json)),
                Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            })
            .take_until(closed.cancelled_owned()),
    );

    Sse::new(stream).keep_alive(KeepAlive::new().interval(app.sse_ping_interval))
}

/// The boundary component owning wire-level HTTP: one `GET` route producing
/// sessions, one `POST` route feeding the dispatcher.
#[derive(Debug)]
pub struct SseServer {
    pub config: SseServerConfig,
}

impl SseServer {
    /// Binds the listener and serves in a background task until the
    /// cancellation token fires. `config.bind` is rewritten with the actual
    /// local address, so binding port 0 yields the chosen port.
    pub async fn serve(mut config: SseServerConfig, registry: ToolRegistry) -> io::Result<Self> {
        let listener = tokio::net::TcpListener::bind(config.bind).await?;
        config.bind = listener.local_addr()?;
        let (server, router) = Self::new(config, registry);
        let ct = server.config.ct.child_token();
        let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
            ct.cancelled().await;
            tracing::info!("sse server cancelled");
        });
        tokio::spawn(
            async move {
                if let Err(e) = serve.await {
                    tracing::error!(error = %e, "sse server shutdown with error");
                }
            }
            .instrument(tracing::info_span!("sse-server", bind_address = %server.config.bind)),
        );
        Ok(server)
    }

    pub fn new(config: SseServerConfig, registry: ToolRegistry) -> (Self, Router) {
        let sessions = SessionDirectory::new();
        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            sessions.clone(),
            config.handler_timeout,
        );
        let app = App {
            sessions,
            dispatcher,
            post_path: config.post_path.as_str().into(),
            sse_ping_interval: config.sse_keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE),
        };
        let router = Router::new()
            .route(&config.sse_path, get(sse_handler))
            .route(&config.post_path, post(post_handler))
            .with_state(app);

        (Self { config }, router)
    }

    pub fn cancel(&self) {
        self.config.ct.cancel();
    }
}
