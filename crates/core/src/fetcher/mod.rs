//! Fetcher module for bringing job inputs into the job workspace.
//!
//! Remote inputs are streamed over HTTP(S) with [`HttpFetcher`]; the
//! five-target variant instead draws its targets from a local pool with
//! [`TargetSelector`].
//!
//! # Example
//!
//! ```ignore
//! use faceswap_core::fetcher::{Fetcher, FetcherConfig, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(FetcherConfig::default())?;
//! let file = fetcher.fetch(&url, &workspace.input_path(InputRole::Source, "jpg")).await?;
//! println!("Fetched {} bytes", file.bytes);
//! ```

mod config;
mod error;
mod http;
mod selector;
mod traits;

pub use config::{FetcherConfig, TargetPoolConfig};
pub use error::{FetchError, SelectionError};
pub use http::HttpFetcher;
pub use selector::TargetSelector;
pub use traits::{FetchedFile, Fetcher};
