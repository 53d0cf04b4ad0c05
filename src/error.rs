use crate::model::ErrorData;

/// Recoverable failures on the dispatch path. Each maps to a wire error
/// descriptor; none of them terminate the process or other sessions.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("no active session: {0}")]
    NoActiveSession(String),
    #[error("tool {tool} failed: {reason}")]
    HandlerFailure { tool: String, reason: String },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::UnknownTool(_) => "unknown_tool",
            DispatchError::InvalidArguments { .. } => "invalid_arguments",
            DispatchError::NoActiveSession(_) => "no_active_session",
            DispatchError::HandlerFailure { .. } => "handler_failure",
        }
    }

    pub fn to_error_data(&self) -> ErrorData {
        ErrorData {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Startup-time registration failures. Fatal: the process refuses to start
/// rather than silently shadowing a tool definition.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool {0:?} is already registered")]
    DuplicateTool(&'static str),
}

/// An error produced by a tool handler itself; surfaces to the client as a
/// `handler_failure` descriptor.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_data_carries_code_and_detail() {
        let error = DispatchError::InvalidArguments {
            tool: "get_player_payout_insights".to_string(),
            reason: "missing field `category`".to_string(),
        };
        let data = error.to_error_data();
        assert_eq!(data.code, "invalid_arguments");
        assert!(data.message.contains("missing field `category`"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DispatchError::UnknownTool(String::new()).code(), "unknown_tool");
        assert_eq!(
            DispatchError::NoActiveSession(String::new()).code(),
            "no_active_session"
        );
        assert_eq!(
            DispatchError::HandlerFailure {
                tool: String::new(),
                reason: String::new()
            }
            .code(),
            "handler_failure"
        );
    }
}
