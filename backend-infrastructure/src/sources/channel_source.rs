use async_trait::async_trait;
use backend_domain::{EngineError, EventSource, SourcePoll, SourceRecord};
use tokio::sync::mpsc;

/// In-process event feed. The stream ends once every sender is dropped.
pub struct ChannelSource {
    receiver: mpsc::Receiver<SourceRecord>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<SourceRecord>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self { receiver })
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn poll_next(&mut self) -> Result<SourcePoll, EngineError> {
        Ok(match self.receiver.recv().await {
            Some(record) => SourcePoll::Record(record),
            None => SourcePoll::Exhausted,
        })
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::RetractRecord;

    #[tokio::test]
    async fn delivers_records_then_ends_when_senders_drop() {
        let (sender, mut source) = ChannelSource::new(4);
        sender
            .send(SourceRecord::Retract(RetractRecord {
                alert_id: Some("u1@2024-01-01T00:00:00Z".to_string()),
                ..RetractRecord::default()
            }))
            .await
            .expect("send");
        drop(sender);

        assert!(matches!(
            source.poll_next().await.expect("record"),
            SourcePoll::Record(SourceRecord::Retract(_))
        ));
        assert_eq!(source.poll_next().await.expect("end"), SourcePoll::Exhausted);
    }
}
