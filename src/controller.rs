//! Submission lifecycle: validate, send, record the outcome

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::field::FieldKey;
use crate::request::PredictionRequest;
use crate::service::PredictionService;
use crate::state::{CropName, FormState, FormStateStore, Notice, SessionEvent, Status};

/// Drives a `FormStateStore` through one submission at a time.
///
/// `submit` is the whole lifecycle. `begin_submit` and `finish_submit`
/// are its two halves, for callers that poll the request themselves
/// and keep handling edits while it is in flight.
pub struct SubmissionController<S>
{   store: FormStateStore
  , service: S
}

impl<S: PredictionService> SubmissionController<S>
{   pub fn new(service: S) -> Self
    {   debug!("Creating SubmissionController");
        SubmissionController
        {   store: FormStateStore::new()
          , service
        }
    }

    pub fn state(&self) -> &FormState
    {   self.store.state()
    }

    pub fn service(&self) -> &S
    {   &self.service
    }

    pub fn subscribe(&mut self)
      -> mpsc::UnboundedReceiver<SessionEvent>
    {   self.store.subscribe()
    }

    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>)
    {   self.store.set_field(key, value);
    }

    pub fn reset(&mut self) -> Result<(), Error>
    {   self.store.reset()
    }

    /// Validate and send. Service and network failures end up in the
    /// state as `Failed`, not in the returned error; that is reserved for
    /// `Validation` (form back to `Idle`) and `InvalidTransition`
    /// (a request is already in flight).
    pub async fn submit(&mut self) -> Result<(), Error>
    {   let request = self.begin_submit()?;
        let outcome = self.service.predict(&request).await;
        self.finish_submit(outcome)
    }

    /// First half of `submit`: `-> Validating`, then either back to
    /// `Idle` with a notice, or on to `Submitting` with the request that
    /// must be sent.
    pub fn begin_submit(&mut self) -> Result<PredictionRequest, Error>
    {   self.store.transition(Status::Validating, None)?;

        let missing = self.store.state().missing_fields();
        if !missing.is_empty()
        {   info!("Submit rejected, {} field(s) empty", missing.len());
            self.store.transition(Status::Idle, None)?;
            self.store.notify(Notice::IncompleteForm
            {   missing: missing.clone()
            });
            return Err(Error::Validation(missing));
        }

        let request = PredictionRequest::from_state(self.store.state());
        self.store.transition(Status::Submitting, None)?;
        Ok(request)
    }

    /// Second half of `submit`: apply the outcome of the request
    /// issued after `begin_submit`, whatever was edited since.
    pub fn finish_submit(
      &mut self
    , outcome: Result<CropName, Error>
    ) -> Result<(), Error>
    {   match outcome
        {   Ok(crop) => {
              info!("Prediction succeeded: {}", crop);
              self.store.transition(Status::Success, Some(crop))
            }
          , Err(e) => {
              warn!("Prediction failed: {}", e);
              self.store.transition(Status::Failed, Some(e.user_message()))
            }
        }
    }
}
