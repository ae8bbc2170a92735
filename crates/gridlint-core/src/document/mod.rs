//! Sheet model and analysis (UI-agnostic).

mod analysis;
mod io;
mod state;

pub use analysis::{Analysis, ClusterReport, FailureReport, FixReport};
pub use state::{Grid, Sheet};
