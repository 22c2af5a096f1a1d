use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Error codes the WorkSpaces API uses when a caller is being rate limited.
pub const THROTTLING_CODES: [&str; 3] = [
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
];

/// Exit code for a run where every target was handled.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a run where some targets were unresolved or failed.
pub const EXIT_PARTIAL: i32 = 2;
/// Exit code for invalid input or a run where nothing matched.
pub const EXIT_INVALID: i32 = 3;
/// Exit code for AWS client or API errors.
pub const EXIT_PROVIDER: i32 = 4;

#[derive(Error, Debug)]
pub enum WsError {
    NotFound(String),
    Io(#[from] std::io::Error),
    Config(String),
    Provider {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl Display for WsError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            WsError::NotFound(s) => write!(f, "File not found: {}", s),
            WsError::Io(e) => write!(f, "I/O error: {}", e),
            WsError::Config(s) => write!(f, "Configuration error: {}", s),
            WsError::Provider {
                operation,
                code: Some(code),
                message,
            } => write!(f, "{} failed ({}): {}", operation, code, message),
            WsError::Provider {
                operation,
                code: None,
                message,
            } => write!(f, "{} failed: {}", operation, message),
        }
    }
}

impl WsError {
    pub fn provider(
        operation: &'static str,
        code: Option<impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        WsError::Provider {
            operation,
            code: code.map(Into::into),
            message: message.into(),
        }
    }

    /// The service error code, if the provider returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            WsError::Provider { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True when the provider rejected the call because of rate limiting.
    pub fn is_throttling(&self) -> bool {
        self.code()
            .is_some_and(|code| THROTTLING_CODES.contains(&code))
    }

    /// Process exit code this error maps to when it aborts a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            WsError::NotFound(_) | WsError::Io(_) => EXIT_INVALID,
            WsError::Config(_) | WsError::Provider { .. } => EXIT_PROVIDER,
        }
    }
}

pub type Result<T> = std::result::Result<T, WsError>;
