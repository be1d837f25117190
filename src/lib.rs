//! Weekly work-log aggregation: fetch issues and work logs for a project,
//! bucket logged hours per calendar week and author, fall back to estimates
//! for tasks nobody logged against, and project the result into report views.

pub mod aggregate;
pub mod analyze;
pub mod cli;
pub mod error;
pub mod ext;
pub mod model;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod util;
pub mod window;

pub use analyze::Analyzer;
pub use error::{ReportError, Result};
pub use model::{AnalysisResult, AnalysisWindow, Issue, WorkLogEntry};
pub use source::{IssueSource, SnapshotSource};
