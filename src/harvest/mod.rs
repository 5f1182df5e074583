//! Quota-aware execution of the harvest: pacing, retry and skip decisions,
//! page walking, diff sampling and the run orchestration.

pub mod executor;
pub mod policy;
pub mod runner;
pub mod sampler;
pub mod walker;

pub use executor::{CallExecutor, CancelFlag};
pub use policy::CallPolicy;
pub use runner::{HarvestOutcome, harvest_organisation};
pub use sampler::{DEFAULT_SAMPLE_BUDGET, DiffSample};
pub use walker::collect_all_pages;
