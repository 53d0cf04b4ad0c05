use std::{sync::Arc, time::Duration};

use crate::{
    error::DispatchError,
    model::{CallToolResult, ServerMessage, ToolRequest},
    registry::ToolRegistry,
    session::SessionDirectory,
};

/// Validates and routes a tool invocation to its handler and the result
/// back to the originating session.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    sessions: SessionDirectory,
    handler_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        sessions: SessionDirectory,
        handler_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            sessions,
            handler_timeout,
        }
    }

    /// Ingests one request addressed to `target`. Returns `Ok(())` once the
    /// request has been accepted for that session — the tool outcome, result
    /// or error descriptor, travels on the session's stream. Only an invalid
    /// target fails the ingestion itself.
    pub async fn handle(&self, target: &str, request: ToolRequest) -> Result<(), DispatchError> {
        if !self.sessions.contains(target).await {
            return Err(DispatchError::NoActiveSession(target.to_string()));
        }

        let message = match self.call_tool(&request).await {
            Ok(result) => ServerMessage::Result(result),
            Err(error) => {
                tracing::debug!(tool = %request.tool_name, %error, "tool call failed");
                ServerMessage::Error {
                    error: error.to_error_data(),
                }
            }
        };

        if let Err(error) = self.sessions.push(target, message).await {
            // the client disconnected while the tool ran; nothing is left to
            // deliver to, so the response is discarded
            tracing::debug!(session_id = target, %error, "discarding response for closed session");
        }
        Ok(())
    }

    /// Resolves, validates and runs the tool. Handlers are CPU-bound, so the
    /// call runs on the blocking pool under a configurable execution bound;
    /// an exceeded bound or a panicking handler becomes a recoverable
    /// `HandlerFailure`.
    async fn call_tool(&self, request: &ToolRequest) -> Result<CallToolResult, DispatchError> {
        let tool = self.registry.resolve(&request.tool_name)?;
        let arguments = request.arguments.clone();
        let join = tokio::task::spawn_blocking(move || tool.call(arguments));
        match tokio::time::timeout(self.handler_timeout, join).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(DispatchError::HandlerFailure {
                tool: request.tool_name.clone(),
                reason: format!("handler panicked: {join_error}"),
            }),
            Err(_) => Err(DispatchError::HandlerFailure {
                tool: request.tool_name.clone(),
                reason: format!("handler exceeded the {:?} execution bound", self.handler_timeout),
            }),
        }
    }
}
