//! Prediction service backends

use std::future::Future;

use crate::error::Error;
use crate::request::PredictionRequest;
use crate::state::CropName;

pub mod http;

// Re-export for convenience
pub use http::HttpPredictionService;

/// Anything that can turn a request into a crop recommendation.
///
/// One call is one outbound request: implementations must not retry.
/// Transport failures come back as `Network`/`Timeout`, non-2xx
/// replies as `Service`, bad bodies as `MalformedResponse` or
/// `UnreadableBody`.
pub trait PredictionService
{   fn predict(
      &self
    , request: &PredictionRequest
    ) -> impl Future<Output = Result<CropName, Error>> + Send;
}
