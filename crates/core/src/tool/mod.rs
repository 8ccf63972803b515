//! Tool module for running the external face-swap program.
//!
//! The tool is treated as a black box with a command-line contract: exit
//! code 0 means success, anything else is a terminal failure with diagnostic
//! text on stderr.
//!
//! # Example
//!
//! ```ignore
//! use faceswap_core::tool::{FaceFusionRunner, PassPlan, PassSpec, PassTarget, SwapParameters, ToolRunner, run_passes};
//!
//! let runner = FaceFusionRunner::new(config.tool.clone());
//! runner.validate().await?;
//!
//! let params = SwapParameters::for_variant(JobVariant::SingleImage, &config.tool);
//! let plan = PassPlan::new().then(PassSpec::headless(
//!     vec![source],
//!     PassTarget::File(target),
//!     output,
//!     params,
//! ));
//! let results = run_passes(&runner, &plan.resolve()?).await?;
//! ```

mod config;
mod error;
mod pipeline;
mod process;
mod traits;
mod types;

pub use config::ToolConfig;
pub use error::ToolError;
pub use pipeline::{run_passes, PassFailure, PassPlan, PassSpec, PassTarget};
pub use process::FaceFusionRunner;
pub use traits::ToolRunner;
pub use types::{FaceSelectorOrder, Invocation, ProcessResult, SwapParameters, ToolCommand};
