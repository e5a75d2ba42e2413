//! Poll loop: read the status document, decode it and publish the result.

use std::time::Duration;

use hive_common::{Error, StatusReader, StatusSnapshot, decode};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::publisher::publish;
use crate::registry::SharedRegistry;

/// How a single poll iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A snapshot was decoded and published.
    Published,
    /// The status document does not exist.
    NotFound,
    /// The status document exists but could not be read.
    ReadFailure,
    /// The document was read but could not be decoded; nothing was published.
    DecodeError,
}

impl PollOutcome {
    /// Label value used for the poll counter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PollOutcome::Published => "published",
            PollOutcome::NotFound => "not_found",
            PollOutcome::ReadFailure => "read_failure",
            PollOutcome::DecodeError => "decode_error",
        }
    }
}

/// Periodically republishes the status document into the registry.
pub struct StatusPoller {
    reader: StatusReader,
    registry: SharedRegistry,
    interval: Duration,
}

impl StatusPoller {
    /// Create a new poller.
    pub fn new(reader: StatusReader, registry: SharedRegistry, interval: Duration) -> Self {
        Self {
            reader,
            registry,
            interval,
        }
    }

    /// Read and decode the document without touching the registry.
    async fn fetch(&self) -> Result<StatusSnapshot, Error> {
        let data = self.reader.read().await?;
        decode(&data)
    }

    /// Run one iteration and record its outcome.
    ///
    /// A failed read or decode leaves every series at its previous value.
    pub async fn poll_once(&self) -> PollOutcome {
        let outcome = match self.fetch().await {
            Ok(snapshot) => {
                publish(&snapshot, &self.registry);
                debug!(
                    rig = %snapshot.rig_id,
                    cards = snapshot.card_count(),
                    "Published status snapshot"
                );
                PollOutcome::Published
            }
            Err(e @ Error::NotFound { .. }) => {
                warn!(error = %e, "Status file missing, retrying");
                PollOutcome::NotFound
            }
            Err(e @ Error::ReadFailure { .. }) => {
                warn!(error = %e, "Status file unreadable, retrying");
                PollOutcome::ReadFailure
            }
            Err(e) => {
                warn!(error = %e, "Status document not decodable, keeping previous values");
                PollOutcome::DecodeError
            }
        };

        self.registry.record_poll(outcome);
        outcome
    }

    /// Run the poll loop until the shutdown signal is received.
    ///
    /// The wait between iterations is the same fixed interval whatever the
    /// outcome, and is cut short by a shutdown request.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            path = %self.reader.path().display(),
            interval_secs = self.interval.as_secs_f64(),
            "Starting status poller"
        );

        loop {
            self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Status poller stopped");
    }
}
