//! Centralized error handling.
//!
//! Every failure carries a stable machine code that reaches API clients and
//! logs unchanged. Raw upstream error bodies never leave the process.

use std::fmt;

/// Application-wide error type.
#[derive(Debug)]
pub struct AppError {
    /// Stable machine code for clients and monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Input validation — rejected before any I/O
    /// Address does not match `^0x[0-9a-fA-F]{40}$`
    InvalidAddress,
    /// Chain identifier is not one the service evaluates
    UnsupportedChain,

    // Configuration
    /// RPC endpoint URL is not configured
    MissingRpcUrl,
    /// Configuration value could not be parsed
    InvalidConfigValue,

    // Upstream RPC
    /// Non-success HTTP status or connection failure
    RpcTransport,
    /// Well-formed JSON-RPC error envelope from upstream
    RpcProtocol,
    /// Upstream request exceeded the client deadline
    RpcTimeout,
    /// Response body could not be decoded
    RpcInvalidResponse,

    // API
    /// Unrecognized path
    NotFound,
    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "invalid_address",
            Self::UnsupportedChain => "unsupported_chain",
            Self::MissingRpcUrl => "missing_rpc_url",
            Self::InvalidConfigValue => "invalid_config",
            Self::RpcTransport => "rpc_transport",
            Self::RpcProtocol => "rpc_protocol",
            Self::RpcTimeout => "rpc_timeout",
            Self::RpcInvalidResponse => "rpc_invalid_response",
            Self::NotFound => "not_found",
            Self::Internal => "internal_error",
        }
    }

    /// HTTP status for API responses.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidAddress | Self::UnsupportedChain => 400,
            Self::NotFound => 404,
            _ => 500,
        }
    }

    /// Transient failures worth one more attempt. Protocol-level errors are
    /// deterministic and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RpcTransport | Self::RpcTimeout)
    }
}

// Convenience constructors

impl AppError {
    pub fn invalid_address(raw: &str) -> Self {
        Self::new(
            ErrorCode::InvalidAddress,
            format!("malformed address: {:?}", raw),
        )
    }

    pub fn unsupported_chain(chain: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedChain,
            format!("unsupported chain: {:?}", chain),
        )
    }

    pub fn missing_rpc_url() -> Self {
        Self::new(ErrorCode::MissingRpcUrl, "RPC endpoint URL is not configured")
    }

    pub fn rpc_transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcTransport, msg)
    }

    pub fn rpc_protocol(code: i64, msg: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RpcProtocol,
            format!("{} (code {})", msg.into(), code),
        )
    }

    pub fn rpc_timeout() -> Self {
        Self::new(ErrorCode::RpcTimeout, "upstream request timed out")
    }

    pub fn rpc_invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::rpc_timeout()
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcTransport, "connection failed")
        } else {
            Self::with_source(ErrorCode::RpcTransport, "request failed", err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Internal, err.to_string())
    }
}
