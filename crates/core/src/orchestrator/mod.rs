//! Scrape orchestrator.
//!
//! Sequences the scrape lifecycle over the shared cache:
//! - **Empty**: on first demand, hydrate from the snapshot file if one
//!   exists, otherwise run the fast pass over the primary source
//! - **PartiallyReady**: fast pass merged; the remaining primary pages and
//!   the secondary source run as two background tasks, each merging on
//!   completion
//! - **Ready**: both background tasks settled, whatever their outcome

mod runner;
mod types;

pub use runner::ScrapeOrchestrator;
pub use types::{OrchestratorError, OrchestratorStatus, ScrapePlan, ScrapeState};
