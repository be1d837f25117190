use thiserror::Error;

/// Errors produced while collecting and aggregating work-log data.
///
/// The engine performs no I/O of its own, so every failure is either handed
/// through from the issue source or caused by malformed input records.
#[derive(Debug, Error)]
pub enum ReportError {
  /// The issue source failed; propagated as-is, never retried here.
  #[error("{operation} failed: {message}")]
  UpstreamFetch {
    /// Source operation that failed, e.g. "fetch_worklogs(X-1)".
    operation: String,
    /// Human-readable cause from the source.
    message: String,
  },

  /// A record carried a malformed date, number, or reference.
  #[error("data integrity: {0}")]
  DataIntegrity(String),

  /// The caller asked for something the engine cannot answer.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
}

impl ReportError {
  pub fn upstream(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
    Self::UpstreamFetch {
      operation: operation.into(),
      message: message.to_string(),
    }
  }

  pub fn integrity(message: impl Into<String>) -> Self {
    Self::DataIntegrity(message.into())
  }
}

pub type Result<T> = std::result::Result<T, ReportError>;
