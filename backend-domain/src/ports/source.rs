use async_trait::async_trait;

use crate::entities::SourceRecord;
use crate::errors::EngineError;

/// Outcome of one poll of the event source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePoll {
    Record(SourceRecord),
    /// Nothing available yet; poll again later.
    Pending,
    /// End of stream. No further records will arrive.
    Exhausted,
}

/// Ordered (best effort) supplier of source records.
///
/// `Err(EventMalformed)` means one record was unreadable and has been
/// consumed; `Err(SourceFault)` is terminal.
#[async_trait]
pub trait EventSource: Send {
    async fn poll_next(&mut self) -> Result<SourcePoll, EngineError>;
    fn describe(&self) -> String;
}
