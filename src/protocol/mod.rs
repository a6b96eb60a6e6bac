//! # Message Protocols
//!
//! Every actor in the pipeline speaks one or more **protocols**. Each protocol is
//! an enum whose variants carry the minimum data the receiver needs and, for
//! per-file stages, the [`TrackingToken`](crate::model::TrackingToken) of the
//! originating file.
//!
//! [`Message`] is the sum of all protocols and is the type routed through the
//! [`ActorSystem`](crate::framework::ActorSystem). An actor matches the protocol
//! variants it understands and hands everything else to
//! [`notify_marooned_message`](crate::framework::ActorContext::notify_marooned_message).
//!
//! ## Failure Replies
//!
//! Requests that somebody waits on have a failure counterpart. When the handler
//! of such a request faults, the runtime answers with that counterpart so the
//! waiting supervisor can move on:
//!
//! | Request | Failure reply |
//! |---------|---------------|
//! | `StartPolling` | `FilePollingDone` |
//! | `InflateFile` | `InflateFileFailed` |
//! | `InspectFileMetadata` | `FileMetadataCouldNotBeEvaluated` |
//! | `PerformFilePackaging` | `FilePackagingFailure` |
//! | `MediaFileAvailable` | `MediaFileProcessingFailed` |
//! | `Organize` | `OrganizeRejected` |

pub mod flow;
pub mod inflate;
pub mod logging;
pub mod metadata;
pub mod organizer;
pub mod packaging;
pub mod polling;
pub mod tracking;

pub use flow::*;
pub use inflate::*;
pub use logging::*;
pub use metadata::*;
pub use organizer::*;
pub use packaging::*;
pub use polling::*;
pub use tracking::*;

use crate::framework::{ActorId, Protocol};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Logging(LogEvent),
    Polling(PollingMessage),
    Inflate(InflateMessage),
    Metadata(MetadataMessage),
    Packaging(PackagingMessage),
    Flow(FlowMessage),
    Tracking(TrackingMessage),
    Organizer(OrganizerMessage),
}

macro_rules! impl_from_protocol {
    ($($variant:ident($protocol:ty)),* $(,)?) => {
        $(
            impl From<$protocol> for Message {
                fn from(message: $protocol) -> Self {
                    Message::$variant(message)
                }
            }
        )*
    };
}

impl_from_protocol!(
    Logging(LogEvent),
    Polling(PollingMessage),
    Inflate(InflateMessage),
    Metadata(MetadataMessage),
    Packaging(PackagingMessage),
    Flow(FlowMessage),
    Tracking(TrackingMessage),
    Organizer(OrganizerMessage),
);

impl Protocol for Message {
    fn failure_reply(&self, reason: &str) -> Option<Self> {
        let reason = reason.to_string();
        let reply: Message = match self {
            Message::Polling(PollingMessage::StartPolling { source }) => {
                PollingMessage::FilePollingDone { source: source.clone() }.into()
            }
            Message::Inflate(InflateMessage::InflateFile { path }) => InflateMessage::InflateFileFailed {
                path: path.clone(),
                reason,
            }
            .into(),
            Message::Metadata(MetadataMessage::InspectFileMetadata { path, tracking }) => {
                MetadataMessage::FileMetadataCouldNotBeEvaluated {
                    path: path.clone(),
                    reason,
                    tracking: tracking.clone(),
                }
                .into()
            }
            Message::Packaging(PackagingMessage::PerformFilePackaging { path, tracking, .. }) => {
                PackagingMessage::FilePackagingFailure {
                    path: path.clone(),
                    reason,
                    tracking: tracking.clone(),
                }
                .into()
            }
            Message::Flow(FlowMessage::MediaFileAvailable { tracking, .. }) => FlowMessage::MediaFileProcessingFailed {
                tracking: tracking.clone(),
                cause: FailureCause::Internal { reason },
            }
            .into(),
            Message::Organizer(OrganizerMessage::Organize { source }) => {
                OrganizerMessage::OrganizeRejected { source: source.clone() }.into()
            }
            _ => return None,
        };
        Some(reply)
    }

    fn fault_event(origin: &ActorId, reason: &str) -> Option<Self> {
        Some(LogEvent::error(origin, origin, format!("fault while processing message: {reason}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackingToken;
    use std::path::PathBuf;

    #[test]
    fn test_requests_have_failure_replies() {
        let tracking = TrackingToken::from("t1");
        let request: Message = MetadataMessage::InspectFileMetadata {
            path: PathBuf::from("a.mp3"),
            tracking: tracking.clone(),
        }
        .into();

        let reply = request.failure_reply("boom").unwrap();
        assert_eq!(
            reply,
            Message::Metadata(MetadataMessage::FileMetadataCouldNotBeEvaluated {
                path: PathBuf::from("a.mp3"),
                reason: "boom".to_string(),
                tracking,
            })
        );
    }

    #[test]
    fn test_start_polling_fails_into_polling_done() {
        let request: Message = PollingMessage::StartPolling {
            source: PathBuf::from("/music"),
        }
        .into();
        assert_eq!(
            request.failure_reply("walk crashed"),
            Some(Message::Polling(PollingMessage::FilePollingDone {
                source: PathBuf::from("/music")
            }))
        );
    }

    #[test]
    fn test_notifications_have_no_failure_reply() {
        let notification: Message = PollingMessage::AudioFileFound {
            path: PathBuf::from("a.mp3"),
        }
        .into();
        assert!(notification.failure_reply("boom").is_none());
    }

    #[test]
    fn test_fault_event_is_an_error_log() {
        let event = Message::fault_event(&ActorId::from("poller"), "boom").unwrap();
        match event {
            Message::Logging(event) => {
                assert_eq!(event.severity(), Severity::Error);
                assert_eq!(event.record().origin, ActorId::from("poller"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
