use crate::entities::{AnomalyDecision, LoginEvent};
use crate::services::UserHistoryBook;

/// Anomaly iff the event's country was not yet in the user's history.
///
/// The history always ends up containing the country, so only the first
/// occurrence per (user, country) is anomalous. Classification follows
/// arrival order; event timestamps play no part.
pub fn classify(event: &LoginEvent, history: &mut UserHistoryBook) -> AnomalyDecision {
    let observation = history.observe(&event.user_id, &event.country);
    AnomalyDecision {
        is_anomaly: observation.was_new_country,
        previous_countries: observation.previous,
    }
}
