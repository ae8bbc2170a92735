//! gridlint-core - sheet model, configuration and storage.

pub mod config;
pub mod document;
pub mod error;
pub mod storage;

pub use config::AnalysisConfig;
pub use document::{Analysis, ClusterReport, FailureReport, FixReport, Sheet};
pub use error::{GridlintError, Result};

pub use gridlint_engine::engine::CellRef;
