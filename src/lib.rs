pub mod error;
pub mod config;
pub mod field;
pub mod state;
pub mod request;
pub mod service;
pub mod controller;
pub mod session;

pub use config::ServiceConfig;
pub use controller::SubmissionController;
pub use error::Error;
pub use field::{is_filled, FieldKey};
pub use request::{HealthStatus, PredictionRequest, PredictionResponse};
pub use service::{HttpPredictionService, PredictionService};
pub use session::CropSession;
pub use state::{CropName, FormState, FormStateStore, Notice, SessionEvent, Status};

/*

croprec (crop recommender) is an async-only client for a crop
prediction service: seven soil/climate readings go in as the text the
user typed, a crop name (or an error to show) comes out.

croprec/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and the session command types
│   ├── error.rs        # Error type and user-facing messages
│   ├── config.rs       # Service URL / timeout, from env
│   ├── field.rs        # The seven inputs and the fill rule
│   ├── state.rs        # FormState, status machine, subscribers
│   ├── request.rs      # /predict wire types
│   ├── controller.rs   # One submission, start to finish
│   ├── session.rs      # Same thing behind a task + channels
│   ├── service/        # Prediction backends
│   │   ├── mod.rs      # PredictionService trait
│   │   └── http.rs     # reqwest implementation
│   └── bin/croprec.rs  # Terminal front end
└── tests/              # Integration tests

*/

/// CROPREC SESSION INTERFACE:

// ===== SetField =====

pub type SetFieldReply = Result<(), crate::error::Error>;
pub type SetFieldReplySender
  = tokio::sync::mpsc::UnboundedSender<SetFieldReply>;

pub struct SetFieldArgs
{   pub key: crate::FieldKey
  , pub value: String
  , pub reply: SetFieldReplySender
}

// ===== Submit =====

/// `Ok` once the request is sent; `Validation` or
/// `InvalidTransition` when it is not
pub type SubmitReply = Result<(), crate::error::Error>;
pub type SubmitReplySender
  = tokio::sync::mpsc::UnboundedSender<SubmitReply>;

pub struct SubmitArgs
{   pub reply: SubmitReplySender
}

// ===== Reset =====

pub type ResetReply = Result<(), crate::error::Error>;
pub type ResetReplySender
  = tokio::sync::mpsc::UnboundedSender<ResetReply>;

pub struct ResetArgs
{   pub reply: ResetReplySender
}

// ===== Subscribe =====

pub type SubscribeReply
  = tokio::sync::mpsc::UnboundedReceiver<crate::SessionEvent>;

pub struct SubscribeArgs
{   pub reply: tokio::sync::mpsc::UnboundedSender<SubscribeReply>
}

// ===== Snapshot =====

pub struct SnapshotArgs
{   pub reply: tokio::sync::mpsc::UnboundedSender<crate::FormState>
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), crate::error::Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== SessionHand (sender side) =====

pub struct SessionHand
{   pub set_field_tx
      : tokio::sync::mpsc::UnboundedSender<SetFieldArgs>
  , pub submit_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitArgs>
  , pub reset_tx
      : tokio::sync::mpsc::UnboundedSender<ResetArgs>
  , pub subscribe_tx
      : tokio::sync::mpsc::UnboundedSender<SubscribeArgs>
  , pub snapshot_tx
      : tokio::sync::mpsc::UnboundedSender<SnapshotArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== SessionFoot (receiver side) =====

pub struct SessionFoot
{   pub set_field_rx
      : tokio::sync::mpsc::UnboundedReceiver<SetFieldArgs>
  , pub submit_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitArgs>
  , pub reset_rx
      : tokio::sync::mpsc::UnboundedReceiver<ResetArgs>
  , pub subscribe_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubscribeArgs>
  , pub snapshot_rx
      : tokio::sync::mpsc::UnboundedReceiver<SnapshotArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}
