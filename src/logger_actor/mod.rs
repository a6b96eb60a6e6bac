//! # Logger Actor
//!
//! Terminal sink for the [`LogEvent`]s every other actor emits. It is also the
//! system's log sink, so faults caught at the dispatch boundary end up here.
//!
//! Events below the configured threshold are dropped. The rest are rendered as
//! `<origin> <subject>: <text>` and handed to a [`LogSink`]. Write errors are
//! swallowed: the logger never replies and never fails.

pub mod sink;

pub use sink::{ConsoleSink, FileSink, LogSink};

use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::protocol::{LogEvent, Message, Severity};
use async_trait::async_trait;
use tracing::warn;

pub struct LoggerActor {
    threshold: Severity,
    sink: Box<dyn LogSink>,
    dropped_writes: usize,
}

impl LoggerActor {
    pub fn new(threshold: Severity, sink: impl LogSink) -> Self {
        Self {
            threshold,
            sink: Box::new(sink),
            dropped_writes: 0,
        }
    }

    pub fn console(threshold: Severity) -> Self {
        Self::new(threshold, ConsoleSink)
    }

    fn write(&mut self, event: &LogEvent) {
        if event.severity() < self.threshold {
            return;
        }
        let record = event.record();
        let line = format!("{} {}: {}", record.origin, record.subject, record.text);
        if let Err(e) = self.sink.write_line(event.severity(), &line) {
            // Only the first failure is reported, the pipeline keeps going either way.
            if self.dropped_writes == 0 {
                warn!(error = %e, "Log sink write failed");
            }
            self.dropped_writes += 1;
        }
    }
}

#[async_trait]
impl Actor<Message> for LoggerActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match message {
            Message::Logging(event) => self.write(&event),
            other => ctx.notify_marooned_message(sender.as_ref(), other),
        }
        Ok(())
    }

    async fn post_stop(&mut self, _ctx: &ActorContext<Message>) {
        if self.dropped_writes > 0 {
            warn!(dropped = self.dropped_writes, "Log lines lost to sink errors");
        }
    }
}
