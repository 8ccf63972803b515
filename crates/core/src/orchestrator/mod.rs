//! Swap orchestrator for running face swap jobs.
//!
//! One job per request, each in its own workspace:
//! - **Admission**: bounded by a semaphore sized to what the host can run
//! - **Fetch / select**: inputs downloaded (or drawn from the pool) one at a time
//! - **Processing**: the variant's pass plan, stopping at the first failed pass
//! - **Upload**: all outputs or none
//!
//! # Example
//!
//! ```ignore
//! use faceswap_core::orchestrator::SwapOrchestrator;
//!
//! let orchestrator = SwapOrchestrator::new(
//!     config.jobs.clone(),
//!     config.tool.clone(),
//!     config.workspace.clone(),
//!     config.target_pool.clone(),
//!     fetcher,
//!     runner,
//!     publisher,
//! );
//! let request = faceswap_core::request::validate(JobVariant::SingleImage, &body)?;
//! let outcome = orchestrator.run(request).await?;
//! println!("Published {}", outcome.outputs[0].url);
//! ```

mod config;
mod error;
mod runner;
mod types;

pub use config::JobsConfig;
pub use error::{JobError, JobErrorKind};
pub use runner::SwapOrchestrator;
pub use types::{JobOutcome, OrchestratorStatus};
