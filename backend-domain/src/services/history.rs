use std::collections::{BTreeSet, HashMap};

/// Per-user set of countries seen so far.
///
/// Growth is monotonic: a country is never removed once observed, and users
/// are never evicted. Memory therefore grows with the number of distinct
/// (user, country) pairs for the lifetime of the process. No retention
/// policy is applied.
#[derive(Debug, Default)]
pub struct UserHistoryBook {
    countries: HashMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub was_new_country: bool,
    /// Countries known before this observation, sorted.
    pub previous: Vec<String>,
}

impl UserHistoryBook {
    /// Check-and-insert in one step. Callers sharing a book across tasks must
    /// hold a single lock around this call.
    pub fn observe(&mut self, user_id: &str, country: &str) -> Observation {
        let seen = self.countries.entry(user_id.to_string()).or_default();
        let previous = seen.iter().cloned().collect::<Vec<_>>();
        let was_new_country = seen.insert(country.to_string());
        Observation {
            was_new_country,
            previous,
        }
    }

    pub fn user_count(&self) -> usize {
        self.countries.len()
    }
}
