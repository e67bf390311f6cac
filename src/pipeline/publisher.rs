//! Publish sinks for outbound facts

use crate::PublishError;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Destination for encoded outbound events
///
/// Implementations deliver one keyed message per call and report failure
/// instead of dropping the message.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Writes each message as `<key>\t<payload>\n` to an async writer
///
/// Writes are serialized so lines from concurrent publishers never interleave.
pub struct JsonLinesPublisher<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesPublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the publisher and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Publisher for JsonLinesPublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        if key.contains(['\t', '\n']) {
            return Err(PublishError::Rejected(format!(
                "key contains a field separator: {:?}",
                key
            )));
        }

        let mut line = Vec::with_capacity(key.len() + payload.len() + 2);
        line.extend_from_slice(key.as_bytes());
        line.push(b'\t');
        line.extend_from_slice(payload);
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}
