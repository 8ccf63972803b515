//! Publisher module for uploading job outputs to object storage.
//!
//! Every output gets a fresh `<uuid>.<ext>` key and a permanent public URL
//! built from bucket, region and key.
//!
//! # Example
//!
//! ```ignore
//! use faceswap_core::publisher::{MediaKind, Publisher, S3Publisher, StorageConfig};
//!
//! let publisher = S3Publisher::new(StorageConfig::new("outputs", "us-east-1").with_credentials(key, secret));
//! let object = publisher.publish(&output_path, MediaKind::Image).await?;
//! println!("Published at {}", object.url);
//! ```

mod config;
mod error;
mod key;
mod s3;
mod traits;

pub use crate::job::MediaKind;
pub use config::StorageConfig;
pub use error::UploadError;
pub use key::{object_key, public_url};
pub use s3::S3Publisher;
pub use traits::{PublishedObject, Publisher};
