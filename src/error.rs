use std::fmt;

use crate::field::FieldKey;
use crate::state::Status;

/// Shown when the form is submitted with unfilled fields
pub const INCOMPLETE_FORM_MESSAGE: &str
  = "Please fill in all fields";

/// Shown when the service cannot be reached or answers gibberish
pub const CONNECTIVITY_MESSAGE: &str
  = "Could not connect to backend. Ensure server is running.";

/// Shown when the service fails without saying why
pub const FAILURE_MESSAGE: &str
  = "Failed to predict";

/// Custom error type for croprec operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Status change not allowed by the form state machine
    InvalidTransition
    {   from: Status
      , to: Status
    }
  , /// Success/Failed entered without a crop or message
    MissingPayload(Status)
  , /// Fields left empty at submit time
    Validation(Vec<FieldKey>)
  , /// Field name that is not one of the seven inputs
    UnknownField(String)
  , /// Connection refused, DNS failure and friends
    Network(String)
  , /// Request exceeded the configured timeout
    Timeout
  , /// Service answered with a non-2xx status
    Service
    {   status: u16
      , message: Option<String>
    }
  , /// 2xx response without a usable crop
    MalformedResponse(String)
  , /// Response body was not JSON
    UnreadableBody(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Session task is gone
    Disconnected(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Text the presentation boundary shows for this error
    pub fn user_message(&self) -> String
    {   match self
        {   Error::Validation(_) => {
              INCOMPLETE_FORM_MESSAGE.to_string()
            }
          , Error::Network(_)
          | Error::Timeout
          | Error::UnreadableBody(_) => {
              CONNECTIVITY_MESSAGE.to_string()
            }
          , Error::Service { message: Some(msg), .. }
              if !msg.is_empty() => {
              msg.clone()
            }
          , Error::Service { .. }
          | Error::MalformedResponse(_) => {
              FAILURE_MESSAGE.to_string()
            }
          , other => other.to_string()
        }
    }

    /// Whether this error came from talking to the service
    pub fn is_submission_failure(&self) -> bool
    {   matches!(
          self,
          Error::Network(_)
            | Error::Timeout
            | Error::Service { .. }
            | Error::MalformedResponse(_)
            | Error::UnreadableBody(_)
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidTransition { from, to } => {
              write!(f,
                "Invalid status transition: {:?} -> {:?}",
                from, to
              )
            }
          , Error::MissingPayload(status) => {
              write!(f, "Status {:?} requires a payload", status)
            }
          , Error::Validation(missing) => {
              let names: Vec<&str> = missing
                .iter()
                .map(|k| k.wire_name())
                .collect();
              write!(f, "Missing fields: {}", names.join(", "))
            }
          , Error::UnknownField(name) => {
              write!(f, "Unknown field: {}", name)
            }
          , Error::Network(msg) => {
              write!(f, "Network error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Service { status, message } => {
              match message
              {   Some(msg) => write!(f,
                    "Service error ({}): {}", status, msg
                  )
                , None => write!(f, "Service error ({})", status)
              }
            }
          , Error::MalformedResponse(msg) => {
              write!(f, "Malformed response: {}", msg)
            }
          , Error::UnreadableBody(msg) => {
              write!(f, "Unreadable response body: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Disconnected(msg) => {
              write!(f, "Disconnected: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
