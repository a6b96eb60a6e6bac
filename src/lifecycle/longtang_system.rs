use crate::collaborators::Services;
use crate::config::LongtangConfig;
use crate::framework::{ask, ActorRef, ActorSystem, RuntimeError};
use crate::logger_actor::{ConsoleSink, FileSink, LoggerActor};
use crate::model::TrackingSummary;
use crate::organizer_actor::OrganizerSupervisor;
use crate::protocol::{Message, OrganizerMessage};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Instrument};

pub const LOGGER_ID: &str = "logger";
pub const ORGANIZER_ID: &str = "organizer";

#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("Another run is in progress, {0} was not organized")]
    Rejected(PathBuf),
    #[error("Unexpected reply from the organizer: {0}")]
    UnexpectedReply(String),
}

/// The running pipeline.
///
/// `LongtangSystem` is responsible for:
/// - **Lifecycle Management**: starting the logger and the organizer (which
///   spawns the rest of the pipeline) and shutting everything down
/// - **Dependency Wiring**: handing the configured services to the organizer
/// - **Request/Response**: turning `organize` into an `ask` on the organizer
///
/// # Example
///
/// ```ignore
/// let config = LongtangConfig::load(Path::new("longtang.toml"))?;
/// let system = LongtangSystem::start(Services::from_config(&config), config).await?;
///
/// let summary = system.organize(Path::new("/downloads")).await?;
/// println!("{} files organized", summary.audio_successes(true).len());
///
/// system.shutdown().await?;
/// ```
pub struct LongtangSystem {
    system: ActorSystem<Message>,
    organizer: ActorRef<Message>,
    ask_timeout: Duration,
}

impl LongtangSystem {
    /// Spawns the logger actor (registered as the system's log sink) and the organizer.
    pub async fn start(services: Services, config: LongtangConfig) -> Result<Self, RuntimeError> {
        let system = ActorSystem::new("longtang");
        let level = config.logging.level;
        match &config.logging.file {
            Some(path) => system.spawn(LOGGER_ID, LoggerActor::new(level, FileSink::new(path))).await?,
            None => system.spawn(LOGGER_ID, LoggerActor::new(level, ConsoleSink)).await?,
        };
        system.set_log_sink(LOGGER_ID);

        let ask_timeout = config.runtime.ask_timeout();
        let organizer = system
            .spawn(ORGANIZER_ID, OrganizerSupervisor::new(services, config))
            .await?;
        info!(actors = system.actor_count(), "Pipeline started");

        Ok(Self {
            system,
            organizer,
            ask_timeout,
        })
    }

    pub fn system(&self) -> &ActorSystem<Message> {
        &self.system
    }

    /// Organizes every media file below `source` and waits for the summary.
    pub async fn organize(&self, source: &Path) -> Result<TrackingSummary, OrganizeError> {
        let span = tracing::info_span!("organize", source = %source.display());
        let request = OrganizerMessage::Organize {
            source: source.to_path_buf(),
        };
        let reply = ask(&self.system, &self.organizer, request.into(), self.ask_timeout)
            .instrument(span)
            .await?;

        match reply {
            Message::Organizer(OrganizerMessage::OrganizeFinished { summary }) => Ok(summary),
            Message::Organizer(OrganizerMessage::OrganizeRejected { source }) => Err(OrganizeError::Rejected(source)),
            other => Err(OrganizeError::UnexpectedReply(format!("{other:?}"))),
        }
    }

    /// Stops every actor and waits for their tasks to end.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        let marooned = self.system.marooned_count();
        if marooned > 0 {
            info!(marooned, "Messages without a handler during this session");
        }
        self.system.shutdown().await
    }
}
