use backend_domain::{classify, AnomalyDecision, LoginEvent, Observation, UserHistoryBook};
use tokio::sync::Mutex;

/// Process-wide user history behind one lock.
///
/// A single global lock is enough: the critical section is a set lookup and
/// insert, negligible next to the risk-assessment call that follows it.
#[derive(Debug, Default)]
pub struct HistoryStore {
    book: Mutex<UserHistoryBook>,
}

impl HistoryStore {
    pub async fn observe(&self, user_id: &str, country: &str) -> Observation {
        self.book.lock().await.observe(user_id, country)
    }

    pub async fn classify(&self, event: &LoginEvent) -> AnomalyDecision {
        let mut book = self.book.lock().await;
        classify(event, &mut book)
    }

    pub async fn user_count(&self) -> usize {
        self.book.lock().await.user_count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::login;

    #[tokio::test]
    async fn concurrent_first_sightings_yield_one_anomaly() {
        let store = Arc::new(HistoryStore::default());
        let mut handles = Vec::new();
        for minute in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let ts = format!("2024-01-01T00:{:02}:00Z", minute);
                store.classify(&login("u1", &ts, "RU")).await.is_anomaly
            }));
        }
        let mut anomalies = 0;
        for handle in handles {
            if handle.await.expect("join") {
                anomalies += 1;
            }
        }
        assert_eq!(anomalies, 1);
        let again = store.observe("u1", "RU").await;
        assert!(!again.was_new_country);
        assert_eq!(again.previous, vec!["RU".to_string()]);
    }

    #[tokio::test]
    async fn observe_and_classify_share_history() {
        let store = HistoryStore::default();
        assert!(store.observe("u1", "US").await.was_new_country);
        let decision = store.classify(&login("u1", "2024-01-01T00:00:00Z", "US")).await;
        assert!(!decision.is_anomaly);
        assert_eq!(store.user_count().await, 1);
    }
}
