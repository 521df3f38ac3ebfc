use std::future::Future;
use std::pin::Pin;

use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::controller::SubmissionController;
use crate::service::PredictionService;
use crate::state::CropName;
use crate::SessionFoot;

type InFlight
  = Pin<Box<dyn Future<Output = Result<CropName, crate::error::Error>> + Send>>;

/// Public API for a form session - owns the task.
///
/// The presentation boundary routes edits and submit taps through
/// here and watches `subscribe()` for state. Edits keep flowing while
/// a submission is in flight.
pub struct CropSession
{   hand: crate::SessionHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl CropSession
{   /// Create and spawn a new session.
    /// Returns immediately - spawns background task
    pub fn new<S>(service: S) -> Self
    where
      S: PredictionService + Clone + Send + Sync + 'static
    {   debug!("Creating CropSession with task ownership");

        let (set_field_tx, set_field_rx)
          = mpsc::unbounded_channel();
        let (submit_tx, submit_rx)
          = mpsc::unbounded_channel();
        let (reset_tx, reset_rx)
          = mpsc::unbounded_channel();
        let (subscribe_tx, subscribe_rx)
          = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let hand = crate::SessionHand
        {   set_field_tx
          , submit_tx
          , reset_tx
          , subscribe_tx
          , snapshot_tx
          , shutdown_tx
        };

        let foot = crate::SessionFoot
        {   set_field_rx
          , submit_rx
          , reset_rx
          , subscribe_rx
          , snapshot_rx
          , shutdown_rx
        };

        let controller = SubmissionController::new(service);
        let _task_handle = tokio::spawn(async move {
          run_session_loop(foot, controller).await
        });

        CropSession
        {   hand
          , _task_handle
        }
    }

    /// Replace one field's raw text - returns almost immediately
    pub async fn set_field(
      &self
    , key: crate::FieldKey
    , value: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SetFieldReply>,
        crate::error::Error
      >
    {   debug!("set_field queuing command for: {}", key);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SetFieldArgs
        {   key
          , value
          , reply: reply_tx
        };

        self.hand.set_field_tx
          .send(cmd)
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Submit the form. The reply arrives once validation is done and
    /// the request (if any) is on its way; watch events for the outcome.
    pub async fn submit(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SubmitReply>,
        crate::error::Error
      >
    {   debug!("submit queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.submit_tx
          .send(crate::SubmitArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Clear the form - returns almost immediately
    pub async fn reset(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::ResetReply>,
        crate::error::Error
      >
    {   debug!("reset queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.reset_tx
          .send(crate::ResetArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Stream of state snapshots and notices. Registered before this
    /// returns, so nothing sent afterwards is missed.
    pub async fn subscribe(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SessionEvent>,
        crate::error::Error
      >
    {   debug!("subscribe queuing command");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.subscribe_tx
          .send(crate::SubscribeArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        reply_rx.recv().await.ok_or_else(disconnected)
    }

    /// Current form state
    pub async fn snapshot(
      &self
    ) -> Result<crate::FormState, crate::error::Error>
    {   let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.snapshot_tx
          .send(crate::SnapshotArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        reply_rx.recv().await.ok_or_else(disconnected)
    }

    /// Gracefully shutdown the session.
    /// A request still in flight is dropped with the task.
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down CropSession");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.shutdown_tx
          .send(crate::ShutdownArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Session channel already closed");
            crate::error::Error::Disconnected(
              "Session already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Session shutdown confirmed");
            result
        } else
        {   error!("Session ended before confirming shutdown");
            Err(disconnected())
        }
    }
}

fn disconnected() -> crate::error::Error
{   error!("Session channel closed");
    crate::error::Error::Disconnected(
      "Session task is gone".to_string()
    )
}

async fn resolve(in_flight: &mut Option<InFlight>)
  -> Result<CropName, crate::error::Error>
{   match in_flight
    {   Some(request) => request.await
      , None => std::future::pending().await
    }
}

/// Main session event loop
///
/// Commands are handled in arrival order on this one task. The
/// in-flight request is just another select arm, so edits land while
/// it runs and its outcome is applied whenever it resolves.
async fn run_session_loop<S>(
  foot: SessionFoot
, mut controller: SubmissionController<S>
)
where
  S: PredictionService + Clone + Send + Sync + 'static
{   debug!("Starting CropSession event loop");
    let SessionFoot
    {   mut set_field_rx
      , mut submit_rx
      , mut reset_rx
      , mut subscribe_rx
      , mut snapshot_rx
      , mut shutdown_rx
    } = foot;
    let mut in_flight: Option<InFlight> = None;

    loop
    { tokio::select!
      { Some(cmd) = set_field_rx.recv() => {
          debug!("Received SetField for: {}", cmd.key);
          controller.set_field(cmd.key, cmd.value);
          let _ = cmd.reply.send(Ok(()));
        }
      , Some(cmd) = submit_rx.recv() => {
          debug!("Received Submit");
          match controller.begin_submit()
          {   Ok(request) => {
                let service = controller.service().clone();
                let pending: InFlight = Box::pin(async move {
                  service.predict(&request).await
                });
                in_flight = Some(pending);
                let _ = cmd.reply.send(Ok(()));
              }
            , Err(e) => {
                debug!("Submit not sent: {}", e);
                let _ = cmd.reply.send(Err(e));
              }
          }
        }
      , outcome = resolve(&mut in_flight), if in_flight.is_some() => {
          debug!("Prediction request resolved");
          in_flight = None;
          if let Err(e) = controller.finish_submit(outcome)
          {   error!("Could not apply prediction outcome: {}", e);
          }
        }
      , Some(cmd) = reset_rx.recv() => {
          debug!("Received Reset");
          let _ = cmd.reply.send(controller.reset());
        }
      , Some(cmd) = subscribe_rx.recv() => {
          debug!("Received Subscribe");
          let _ = cmd.reply.send(controller.subscribe());
        }
      , Some(cmd) = snapshot_rx.recv() => {
          let _ = cmd.reply.send(controller.state().clone());
        }
      , Some(cmd) = shutdown_rx.recv() => {
          debug!("Received Shutdown");
          let _ = cmd.reply.send(Ok(()));
          info!("CropSession shutting down");
          break;
        }
      , else => {
          debug!("All session handles dropped");
          break;
        }
      }
    }
}
