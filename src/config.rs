//! Configuration for the prediction service connection

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Environment variable prefix, e.g. `CROPREC_SERVICE_BASE_URL`
pub const ENV_PREFIX: &str = "CROPREC_";

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig
{   /// Base URL of the prediction service; `/predict` is appended
    pub service_base_url: String
  , /// Whole-request timeout in seconds. None waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>
}

impl ServiceConfig
{   pub fn new(service_base_url: impl Into<String>) -> Self
    {   ServiceConfig
        {   service_base_url: service_base_url.into()
          , timeout_secs: None
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self
    {   self.timeout_secs = Some(secs);
        self
    }

    /// Load from `CROPREC_*` variables, reading `.env` first if present
    pub fn from_env() -> Result<Self, Error>
    {   dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit `(name, value)` pairs, names carrying the prefix
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
      I: IntoIterator<Item = (String, String)>
    {   let config: ServiceConfig = envy::prefixed(ENV_PREFIX)
          .from_iter(vars)
          .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        debug!("Loaded config for {}", config.service_base_url);
        Ok(config)
    }

    /// Base URL must be absolute http(s)
    pub fn validate(&self) -> Result<reqwest::Url, Error>
    {   let url = reqwest::Url::parse(self.service_base_url.trim())
          .map_err(|e| Error::InvalidConfiguration(format!(
            "service_base_url {:?}: {}", self.service_base_url, e
          )))?;
        match url.scheme()
        {   "http" | "https" => Ok(url)
          , other => Err(Error::InvalidConfiguration(format!(
              "unsupported scheme: {}", other
            )))
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<String, Error>
    {   self.validate()?;
        Ok(format!(
          "{}/{}",
          self.service_base_url.trim().trim_end_matches('/'),
          path.trim_start_matches('/')
        ))
    }

    pub fn predict_url(&self) -> Result<String, Error>
    {   self.endpoint("predict")
    }

    pub fn health_url(&self) -> Result<String, Error>
    {   self.endpoint("health")
    }

    pub fn timeout(&self) -> Option<Duration>
    {   self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)>
    {   pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect()
    }

    #[test]
    fn loads_prefixed_vars()
    {   let config = ServiceConfig::from_vars(vars(&[
          ("CROPREC_SERVICE_BASE_URL", "http://192.168.1.6:5000")
        , ("CROPREC_TIMEOUT_SECS", "15")
        , ("UNRELATED", "x")
        ])).unwrap();
        assert_eq!(config.service_base_url, "http://192.168.1.6:5000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn base_url_is_required()
    {   let err = ServiceConfig::from_vars(vars(&[
          ("CROPREC_TIMEOUT_SECS", "15")
        ])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn timeout_defaults_to_none()
    {   let config = ServiceConfig::from_vars(vars(&[
          ("CROPREC_SERVICE_BASE_URL", "https://crops.example.com")
        ])).unwrap();
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn rejects_non_http_urls()
    {   for url in ["", "not a url", "ftp://crops.example.com"]
        {   assert!(ServiceConfig::new(url).validate().is_err());
        }
    }

    #[test]
    fn endpoints_join_cleanly()
    {   for base in ["http://10.0.0.2:5000", "http://10.0.0.2:5000/"]
        {   let config = ServiceConfig::new(base);
            assert_eq!(
              config.predict_url().unwrap(),
              "http://10.0.0.2:5000/predict"
            );
            assert_eq!(
              config.health_url().unwrap(),
              "http://10.0.0.2:5000/health"
            );
        }
        let config = ServiceConfig::new("https://host/api/v1");
        assert_eq!(
          config.predict_url().unwrap(),
          "https://host/api/v1/predict"
        );
    }
}
