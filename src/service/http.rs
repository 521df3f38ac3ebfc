use log::{debug, error, trace};

use crate::config::ServiceConfig;
use crate::error::Error;
use crate::request::{HealthStatus, PredictionRequest, PredictionResponse};
use crate::state::CropName;

/// reqwest-backed client for the prediction service.
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpPredictionService
{   predict_url: String
  , health_url: String
  , http_client: reqwest::Client
}

impl HttpPredictionService
{   pub fn new(config: &ServiceConfig) -> Result<Self, Error>
    {   debug!("Creating HttpPredictionService");
        let predict_url = config.predict_url()?;
        let health_url = config.health_url()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout()
        {   debug!("Request timeout: {:?}", timeout);
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::InvalidConfiguration(e.to_string())
        })?;

        Ok(HttpPredictionService
        {   predict_url
          , health_url
          , http_client
        })
    }

    pub fn predict_url(&self) -> &str
    {   &self.predict_url
    }

    /// GET /health. Not part of any submission.
    pub async fn check_health(&self) -> Result<HealthStatus, Error>
    {   debug!("Checking service health");
        let response = self.http_client
          .get(&self.health_url)
          .send()
          .await
          .map_err(transport_error)?;

        let status = response.status();
        trace!("Health response status: {}", status);

        if !status.is_success()
        {   return Err(Error::Service
            {   status: status.as_u16()
              , message: None
            });
        }

        response.json::<HealthStatus>().await.map_err(|e| {
          error!("Parse error: {}", e);
          Error::UnreadableBody(e.to_string())
        })
    }
}

impl super::PredictionService for HttpPredictionService
{   async fn predict(
      &self
    , request: &PredictionRequest
    ) -> Result<CropName, Error>
    {   debug!("POST {}", self.predict_url);
        trace!("Prediction request: {:?}", request);

        let response = self.http_client
          .post(&self.predict_url)
          .header("Content-Type", "application/json")
          .json(request)
          .send()
          .await
          .map_err(transport_error)?;

        let status = response.status();
        trace!("Prediction response status: {}", status);

        let body = response.text().await.map_err(transport_error)?;

        PredictionResponse::from_http(status.as_u16(), &body)?
          .into_outcome()
    }
}

fn transport_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   error!("Request timed out: {}", e);
        Error::Timeout
    } else
    {   error!("HTTP error: {}", e);
        Error::Network(e.to_string())
    }
}
