//! Client for a career-guidance backend: request lifecycle, failure
//! classification, retry, and CV form handling.

pub mod config;
pub mod controller;
pub mod cv;
pub mod errors;
pub mod flows;
pub mod render;
pub mod transport;

pub use controller::{Completion, GuidanceRequestController, RequestState};
pub use errors::{ErrorInfo, ErrorKind};
