//! Terminal front end: `croprec N=90 P=42 ... rainfall=200`
//! or `croprec --health`. Service URL comes from
//! `CROPREC_SERVICE_BASE_URL` (a `.env` file works too).

use std::process::ExitCode;

use croprec::{
  Error, FieldKey, HttpPredictionService, Notice, ServiceConfig
, SessionEvent, Status, SubmissionController
};
use log::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode
{   env_logger::init();

    match run(std::env::args().skip(1).collect()).await
    {   Ok(code) => code
      , Err(e) => {
          error!("{}", e);
          eprintln!("Error: {}", e.user_message());
          ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<ExitCode, Error>
{   let config = ServiceConfig::from_env()?;
    let service = HttpPredictionService::new(&config)?;
    info!("Using {}", service.predict_url());

    if args.iter().any(|a| a == "--health")
    {   let health = service.check_health().await?;
        println!(
          "{} ({})",
          health.status,
          health.service.unwrap_or_else(|| "unknown service".to_string())
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut controller = SubmissionController::new(service);
    let mut events = controller.subscribe();

    for arg in &args
    {   let (name, value) = arg.split_once('=').ok_or_else(|| {
          Error::Other(format!("expected key=value, got {:?}", arg))
        })?;
        controller.set_field(name.parse::<FieldKey>()?, value);
    }

    // Validation failures arrive as a notice below
    match controller.submit().await
    {   Ok(()) | Err(Error::Validation(_)) => {}
      , Err(e) => return Err(e)
    }

    while let Ok(event) = events.try_recv()
    {   match event
        {   SessionEvent::StateChanged(state) => {
              debug!("status: {:?}", state.status());
            }
          , SessionEvent::Notice(notice) => {
              eprintln!("{}", notice.message());
              let Notice::IncompleteForm { missing } = notice;
              for key in missing
              {   eprintln!(
                    "  {}={} ({})",
                    key, key.placeholder(), key.label()
                  );
              }
            }
        }
    }

    let state = controller.state();
    match (state.status(), state.result(), state.error_message())
    {   (Status::Success, Some(crop), _) => {
          println!("Recommended crop: {}", crop);
          Ok(ExitCode::SUCCESS)
        }
      , (Status::Failed, _, Some(message)) => {
          eprintln!("Error: {}", message);
          Ok(ExitCode::FAILURE)
        }
      , _ => Ok(ExitCode::FAILURE)
    }
}
