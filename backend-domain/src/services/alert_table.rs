use std::collections::HashMap;

use crate::entities::{Alert, AlertChange};
use crate::value_objects::AlertId;

/// Canonical alert table: at most one live alert per `AlertId`.
#[derive(Debug, Default, Clone)]
pub struct AlertTable {
    rows: HashMap<AlertId, Alert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Replaced,
    Removed,
    /// Upsert of an identical row, or retract of an absent key.
    Unchanged,
}

impl ApplyOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, ApplyOutcome::Unchanged)
    }
}

impl AlertTable {
    pub fn apply(&mut self, change: AlertChange) -> ApplyOutcome {
        match change {
            AlertChange::Upsert(alert) => match self.rows.get_mut(&alert.alert_id) {
                Some(existing) if *existing == alert => ApplyOutcome::Unchanged,
                Some(existing) => {
                    *existing = alert;
                    ApplyOutcome::Replaced
                }
                None => {
                    self.rows.insert(alert.alert_id.clone(), alert);
                    ApplyOutcome::Inserted
                }
            },
            AlertChange::Retract(id) => match self.rows.remove(&id) {
                Some(_) => ApplyOutcome::Removed,
                None => ApplyOutcome::Unchanged,
            },
        }
    }

    pub fn get(&self, id: &AlertId) -> Option<&Alert> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Newest timestamp first; ties broken by id ascending.
    pub fn ordered(&self) -> Vec<Alert> {
        let mut alerts = self.rows.values().cloned().collect::<Vec<_>>();
        alerts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.alert_id.cmp(&b.alert_id))
        });
        alerts
    }
}
