//! Wire types for the `/predict` endpoint

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::field::FieldKey;
use crate::state::{CropName, FormState};

/// Request body. Values are the raw strings the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest
{   #[serde(rename = "N")]
    pub n: String
  , #[serde(rename = "P")]
    pub p: String
  , #[serde(rename = "K")]
    pub k: String
  , pub temperature: String
  , pub humidity: String
  , pub ph: String
  , pub rainfall: String
}

impl PredictionRequest
{   /// Copy every field verbatim out of a form snapshot
    pub fn from_state(state: &FormState) -> Self
    {   let raw = |key| state.field(key).to_string();
        PredictionRequest
        {   n: raw(FieldKey::Nitrogen)
          , p: raw(FieldKey::Phosphorus)
          , k: raw(FieldKey::Potassium)
          , temperature: raw(FieldKey::Temperature)
          , humidity: raw(FieldKey::Humidity)
          , ph: raw(FieldKey::Ph)
          , rainfall: raw(FieldKey::Rainfall)
        }
    }

    pub fn get(&self, key: FieldKey) -> &str
    {   match key
        {   FieldKey::Nitrogen => &self.n
          , FieldKey::Phosphorus => &self.p
          , FieldKey::Potassium => &self.k
          , FieldKey::Temperature => &self.temperature
          , FieldKey::Humidity => &self.humidity
          , FieldKey::Ph => &self.ph
          , FieldKey::Rainfall => &self.rainfall
        }
    }
}

/// Decoded `/predict` reply, discriminated by HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionResponse
{   Success
    {   crop: CropName
    }
  , Failure
    {   status: u16
      , error: Option<String>
    }
}

impl PredictionResponse
{   /// Decode a raw reply. Fails only when the body is not JSON.
    pub fn from_http(status: u16, body: &str)
      -> Result<Self, Error>
    {   trace!("Decoding {} response: {}", status, body);
        let value: Value = serde_json::from_str(body)
          .map_err(|e| Error::UnreadableBody(e.to_string()))?;

        let text = |name: &str| value
          .get(name)
          .and_then(Value::as_str)
          .filter(|s| !s.trim().is_empty())
          .map(str::to_string);

        if (200..300).contains(&status)
        {   match text("crop")
            {   Some(crop) => Ok(PredictionResponse::Success { crop })
              , None => Err(Error::MalformedResponse(
                  "success body has no crop".to_string()
                ))
            }
        } else
        {   Ok(PredictionResponse::Failure
            {   status
              , error: text("error")
            })
        }
    }

    /// Collapse into the submission outcome
    pub fn into_outcome(self) -> Result<CropName, Error>
    {   match self
        {   PredictionResponse::Success { crop } => Ok(crop)
          , PredictionResponse::Failure { status, error } => {
              Err(Error::Service { status, message: error })
            }
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus
{   pub status: String
  , #[serde(default)]
    pub service: Option<String>
}
