//! Line-delimited JSON consumer for parse requests
//!
//! Each non-blank input line is decoded as a [`ParseRequest`] and handled on
//! its own task. Failures are logged and counted; they never stop the loop.

use crate::pipeline::events::ParseRequest;
use crate::pipeline::processor::RequestProcessor;
use crate::ProcessError;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Counters collected over one consumer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Lines decoded into requests
    pub received: u64,
    /// Requests that ended in a published fact
    pub published: u64,
    /// Requests that failed for any reason other than cancellation
    pub failed: u64,
    /// Requests aborted by cancellation
    pub cancelled: u64,
    /// Lines that could not be decoded
    pub malformed: u64,
}

enum Outcome {
    Published,
    Failed,
    Cancelled,
}

/// Feeds decoded requests to a shared processor
pub struct RequestConsumer {
    processor: Arc<RequestProcessor>,
}

impl RequestConsumer {
    pub fn new(processor: Arc<RequestProcessor>) -> Self {
        Self { processor }
    }

    /// Consumes requests until EOF or cancellation
    ///
    /// In-flight requests share `cancel`, so cancelling stops reading and
    /// aborts their pending waits. The call returns once every spawned task
    /// has finished.
    ///
    /// # Errors
    ///
    /// Returns the reader's I/O error; tasks already spawned are awaited first.
    pub async fn run<R>(
        &self,
        reader: R,
        cancel: CancellationToken,
    ) -> Result<ConsumerStats, std::io::Error>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = ConsumerStats::default();
        let mut tasks = JoinSet::new();
        let mut lines = reader.lines();

        let read_result = loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Received shutdown signal, stopping consumer");
                    break Ok(());
                }
                line = lines.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request: ParseRequest = match serde_json::from_str(line) {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to decode parse request");
                    stats.malformed += 1;
                    continue;
                }
            };
            stats.received += 1;

            let processor = Arc::clone(&self.processor);
            let cancel = cancel.clone();
            tasks.spawn(async move { handle_one(&processor, request, &cancel).await });

            while let Some(finished) = tasks.try_join_next() {
                record(&mut stats, finished);
            }
        };

        while let Some(finished) = tasks.join_next().await {
            record(&mut stats, finished);
        }

        tracing::info!(
            "Consumer stopped: {} received, {} published, {} failed, {} cancelled, {} malformed",
            stats.received,
            stats.published,
            stats.failed,
            stats.cancelled,
            stats.malformed
        );

        read_result.map(|()| stats)
    }
}

async fn handle_one(
    processor: &RequestProcessor,
    request: ParseRequest,
    cancel: &CancellationToken,
) -> Outcome {
    let url = request.url.clone();
    let product_id = request.product_id.clone();
    let event_id = request.event_id.clone();

    match processor.handle(request, cancel).await {
        Ok(_) => Outcome::Published,
        Err(ProcessError::Cancelled) => Outcome::Cancelled,
        Err(e) => {
            tracing::error!(
                error = %e,
                url = %url,
                product_id = %product_id,
                event_id = %event_id,
                "Failed to handle parse request"
            );
            Outcome::Failed
        }
    }
}

fn record(stats: &mut ConsumerStats, finished: Result<Outcome, tokio::task::JoinError>) {
    match finished {
        Ok(Outcome::Published) => stats.published += 1,
        Ok(Outcome::Failed) => stats.failed += 1,
        Ok(Outcome::Cancelled) => stats.cancelled += 1,
        Err(e) => {
            tracing::error!(error = %e, "Request task panicked");
            stats.failed += 1;
        }
    }
}
