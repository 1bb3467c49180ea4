//! Label service access.
//!
//! - [`LabelService`]: the remote service boundary
//! - [`HttpLabelService`]: `reqwest` implementation
//! - [`ApiActor`]: serializes calls and reports outcomes on a bus
//! - [`ApiError`]: call failures

mod actor;
mod error;
mod http;
mod service;

pub use actor::{ApiActor, ApiOutcome, ApiRequest, ApiState};
pub use error::ApiError;
pub use http::HttpLabelService;
pub use service::LabelService;
