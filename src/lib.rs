//! An SSE tool server for gaming payments insights.
//!
//! Clients open a long-lived `GET /sse` stream and receive a session id in
//! the first `endpoint` event. Tool calls are submitted as short-lived
//! `POST /messages?sessionId=..` requests; the outcome of each call (result
//! or error descriptor) is pushed asynchronously onto the addressed
//! session's stream.
//!
//! The crate splits into the session transport core — [`session`],
//! [`dispatch`] and [`transport`] — and the pure tool handlers registered
//! through [`registry`].

pub mod dispatch;
pub mod error;
pub mod model;
pub mod registry;
pub mod session;
pub mod tools;
pub mod transport;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, RegistryError, ToolError};
pub use model::{CallToolResult, Content, ServerMessage, ToolRequest};
pub use registry::ToolRegistry;
pub use session::{SessionDirectory, SessionId};
pub use transport::{SseServer, SseServerConfig};
