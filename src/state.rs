//! Form state and the status machine that guards it

use log::{debug, trace};
use tokio::sync::mpsc;

use crate::error::{Error, INCOMPLETE_FORM_MESSAGE};
use crate::field::{is_filled, FieldKey};

/// Recommended crop identifier returned by the service
pub type CropName = String;

pub const SUBMIT_LABEL: &str = "Predict Crop";
pub const SUBMITTING_LABEL: &str = "Analyzing...";

/// Where the form is in its submit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status
{   #[default]
    Idle
  , Validating
  , Submitting
  , Success
  , Failed
}

impl Status
{   /// Whether `self -> to` is an edge of the status machine
    pub fn can_transition_to(self, to: Status) -> bool
    {   matches!(
          (self, to),
          (Status::Idle, Status::Validating)
            | (Status::Validating, Status::Submitting)
            | (Status::Validating, Status::Idle)
            | (Status::Submitting, Status::Success)
            | (Status::Submitting, Status::Failed)
            | (Status::Success, Status::Validating)
            | (Status::Failed, Status::Validating)
        )
    }
}

/// Snapshot of user input plus submission status.
///
/// Fields are kept exactly as typed. `result` is only present in
/// `Success` and `error_message` only in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState
{   fields: [String; 7]
  , status: Status
  , result: Option<CropName>
  , error_message: Option<String>
}

impl FormState
{   pub fn field(&self, key: FieldKey) -> &str
    {   &self.fields[key.index()]
    }

    /// `(key, raw value)` pairs in form order
    pub fn fields(&self)
      -> impl Iterator<Item = (FieldKey, &str)> + '_
    {   FieldKey::ALL
          .into_iter()
          .map(move |k| (k, self.field(k)))
    }

    pub fn status(&self) -> Status
    {   self.status
    }

    pub fn result(&self) -> Option<&str>
    {   self.result.as_deref()
    }

    pub fn error_message(&self) -> Option<&str>
    {   self.error_message.as_deref()
    }

    /// Keys whose value is not filled, in form order
    pub fn missing_fields(&self) -> Vec<FieldKey>
    {   self.fields()
          .filter(|(_, v)| !is_filled(v))
          .map(|(k, _)| k)
          .collect()
    }

    /// Submit control is disabled while a request is in flight
    pub fn can_submit(&self) -> bool
    {   self.status != Status::Submitting
    }

    pub fn submit_label(&self) -> &'static str
    {   if self.status == Status::Submitting
        {   SUBMITTING_LABEL
        } else
        {   SUBMIT_LABEL
        }
    }
}

/// Ephemeral notifications that are never stored in `FormState`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice
{   IncompleteForm
    {   missing: Vec<FieldKey>
    }
}

impl Notice
{   pub fn message(&self) -> &'static str
    {   match self
        {   Notice::IncompleteForm { .. } => INCOMPLETE_FORM_MESSAGE
        }
    }
}

/// What subscribers of a store receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent
{   StateChanged(FormState)
  , Notice(Notice)
}

/// Sole owner of the session's `FormState`.
/// Every mutation is published to subscribers as a fresh snapshot.
#[derive(Debug, Default)]
pub struct FormStateStore
{   state: FormState
  , subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>
}

impl FormStateStore
{   /// Empty fields, `Idle`
    pub fn new() -> Self
    {   debug!("Creating FormStateStore");
        FormStateStore::default()
    }

    pub fn state(&self) -> &FormState
    {   &self.state
    }

    pub fn subscribe(&mut self)
      -> mpsc::UnboundedReceiver<SessionEvent>
    {   let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        debug!("Subscriber added ({} total)", self.subscribers.len());
        rx
    }

    /// Replace the raw value of one field.
    /// Permitted in every status; an in-flight request keeps the
    /// values it was built from.
    pub fn set_field(&mut self, key: FieldKey, value: impl Into<String>)
    {   let value = value.into();
        trace!("set_field {} = {:?}", key, value);
        self.state.fields[key.index()] = value;
        self.publish();
    }

    /// Clear every field and go back to `Idle`.
    /// Refused while a request is in flight, since its outcome still
    /// has to land on `Submitting`.
    pub fn reset(&mut self) -> Result<(), Error>
    {   if self.state.status == Status::Submitting
        {   return Err(Error::InvalidTransition
            {   from: Status::Submitting
              , to: Status::Idle
            });
        }
        debug!("Resetting form");
        self.state = FormState::default();
        self.publish();
        Ok(())
    }

    /// Move to `to`. `payload` is the crop for `Success` and the error
    /// text for `Failed`; it is ignored for every other status.
    pub fn transition(
      &mut self
    , to: Status
    , payload: Option<String>
    ) -> Result<(), Error>
    {   let from = self.state.status;
        if !from.can_transition_to(to)
        {   debug!("Rejected transition {:?} -> {:?}", from, to);
            return Err(Error::InvalidTransition { from, to });
        }

        let (result, error_message) = match to
        {   Status::Success => {
              (Some(payload.ok_or(Error::MissingPayload(to))?), None)
            }
          , Status::Failed => {
              (None, Some(payload.ok_or(Error::MissingPayload(to))?))
            }
          , _ => (None, None)
        };

        debug!("Transition {:?} -> {:?}", from, to);
        self.state.status = to;
        self.state.result = result;
        self.state.error_message = error_message;
        self.publish();
        Ok(())
    }

    /// Deliver an ephemeral notice to subscribers
    pub fn notify(&mut self, notice: Notice)
    {   debug!("Notice: {:?}", notice);
        self.broadcast(SessionEvent::Notice(notice));
    }

    fn publish(&mut self)
    {   let snapshot = self.state.clone();
        self.broadcast(SessionEvent::StateChanged(snapshot));
    }

    fn broadcast(&mut self, event: SessionEvent)
    {   self.subscribers
          .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn filled_store() -> FormStateStore
    {   let mut store = FormStateStore::new();
        for key in FieldKey::ALL
        {   store.set_field(key, "1");
        }
        store
    }

    #[test]
    fn starts_empty_and_idle()
    {   let store = FormStateStore::new();
        let state = store.state();
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.result(), None);
        assert_eq!(state.error_message(), None);
        assert_eq!(state.missing_fields(), FieldKey::ALL.to_vec());
        assert_eq!(state.fields().count(), 7);
    }

    #[test]
    fn set_field_keeps_raw_text()
    {   let mut store = FormStateStore::new();
        store.set_field(FieldKey::Ph, " 6.50 ");
        store.set_field(FieldKey::Nitrogen, "0090");
        assert_eq!(store.state().field(FieldKey::Ph), " 6.50 ");
        assert_eq!(store.state().field(FieldKey::Nitrogen), "0090");
        store.set_field(FieldKey::Ph, "7");
        assert_eq!(store.state().field(FieldKey::Ph), "7");
    }

    #[test]
    fn full_happy_path()
    {   let mut store = filled_store();
        assert_ok!(store.transition(Status::Validating, None));
        assert_ok!(store.transition(Status::Submitting, None));
        assert!(!store.state().can_submit());
        assert_eq!(store.state().submit_label(), SUBMITTING_LABEL);
        assert_ok!(store.transition(
          Status::Success,
          Some("rice".to_string())
        ));
        assert_eq!(store.state().result(), Some("rice"));
        assert_eq!(store.state().error_message(), None);
        assert_eq!(store.state().submit_label(), SUBMIT_LABEL);
    }

    #[test]
    fn unlisted_transitions_are_rejected()
    {   let mut store = FormStateStore::new();
        assert_eq!(
          store.transition(Status::Submitting, None),
          Err(Error::InvalidTransition
          {   from: Status::Idle
            , to: Status::Submitting
          })
        );
        assert_err!(store.transition(Status::Success, Some("x".into())));
        assert_err!(store.transition(Status::Idle, None));

        assert_ok!(store.transition(Status::Validating, None));
        assert_ok!(store.transition(Status::Submitting, None));
        assert_err!(store.transition(Status::Validating, None));
        assert_err!(store.transition(Status::Idle, None));
        assert_eq!(store.state().status(), Status::Submitting);
    }

    #[test]
    fn every_edge_matches_the_table()
    {   let all = [
          Status::Idle
        , Status::Validating
        , Status::Submitting
        , Status::Success
        , Status::Failed
        ];
        let mut allowed = 0;
        for from in all
        {   for to in all
            {   if from.can_transition_to(to)
                {   allowed += 1;
                }
            }
        }
        assert_eq!(allowed, 7);
        assert!(!Status::Success.can_transition_to(Status::Idle));
        assert!(!Status::Failed.can_transition_to(Status::Submitting));
    }

    #[test]
    fn terminal_statuses_need_payload()
    {   let mut store = filled_store();
        assert_ok!(store.transition(Status::Validating, None));
        assert_ok!(store.transition(Status::Submitting, None));
        assert_eq!(
          store.transition(Status::Failed, None),
          Err(Error::MissingPayload(Status::Failed))
        );
        assert_eq!(store.state().status(), Status::Submitting);
        assert_ok!(store.transition(
          Status::Failed,
          Some("invalid pH".to_string())
        ));
        assert_eq!(store.state().error_message(), Some("invalid pH"));
        assert_eq!(store.state().result(), None);
    }

    #[test]
    fn revalidating_clears_previous_outcome()
    {   let mut store = filled_store();
        assert_ok!(store.transition(Status::Validating, None));
        assert_ok!(store.transition(Status::Submitting, None));
        assert_ok!(store.transition(Status::Failed, Some("boom".into())));
        assert_ok!(store.transition(Status::Validating, None));
        assert_eq!(store.state().error_message(), None);

        assert_ok!(store.transition(Status::Submitting, None));
        assert_ok!(store.transition(Status::Success, Some("maize".into())));
        assert_ok!(store.transition(Status::Validating, None));
        assert_eq!(store.state().result(), None);
    }

    #[test]
    fn reset_clears_fields_but_not_in_flight()
    {   let mut store = filled_store();
        assert_ok!(store.transition(Status::Validating, None));
        assert_ok!(store.transition(Status::Submitting, None));
        assert_err!(store.reset());
        assert_eq!(store.state().field(FieldKey::Ph), "1");

        assert_ok!(store.transition(Status::Success, Some("rice".into())));
        assert_ok!(store.reset());
        assert_eq!(store.state(), &FormState::default());
    }

    #[test]
    fn subscribers_see_every_change()
    {   let mut store = FormStateStore::new();
        let mut rx = store.subscribe();
        store.set_field(FieldKey::Potassium, "43");
        store.notify(Notice::IncompleteForm
        {   missing: vec![FieldKey::Ph]
        });

        match rx.try_recv()
        {   Ok(SessionEvent::StateChanged(state)) => {
              assert_eq!(state.field(FieldKey::Potassium), "43");
            }
          , other => panic!("unexpected event: {:?}", other)
        }
        match rx.try_recv()
        {   Ok(SessionEvent::Notice(notice)) => {
              assert_eq!(notice.message(), INCOMPLETE_FORM_MESSAGE);
            }
          , other => panic!("unexpected event: {:?}", other)
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_subscribers_are_dropped()
    {   let mut store = FormStateStore::new();
        let rx = store.subscribe();
        let _keep = store.subscribe();
        drop(rx);
        store.set_field(FieldKey::Humidity, "82");
        assert_eq!(store.subscribers.len(), 1);
    }
}
