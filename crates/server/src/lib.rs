//! HTTP front end for the face swap service.

pub mod api;
pub mod metrics;
pub mod state;
