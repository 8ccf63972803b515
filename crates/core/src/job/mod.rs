//! Job model for face-swap requests.
//!
//! A [`Job`] lives for exactly one HTTP request: it is created when the
//! request is accepted, walks `pending -> fetching -> processing -> uploading
//! -> done` (or ends in `failed`), and is discarded with the response.

mod types;

pub use types::{InputRole, Job, JobId, JobStatus, JobVariant, MediaKind, Stage};
