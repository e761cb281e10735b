// Event entities
// Records yielded by the event source: login events and retractions

use chrono::{DateTime, ParseError, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::EngineError;
use crate::value_objects::AlertId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginEvent {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl LoginEvent {
    /// Validates the event and returns it with `user_id` trimmed, `country`
    /// upper-cased and an empty `location` rebuilt from city and country.
    pub fn normalized(mut self) -> Result<Self, EngineError> {
        self.user_id = self.user_id.trim().to_string();
        self.country = self.country.trim().to_uppercase();
        self.city = self.city.trim().to_string();
        self.ip_address = self.ip_address.trim().to_string();

        if self.user_id.is_empty() {
            return Err(EngineError::malformed("user_id is empty"));
        }
        if self.country.is_empty() {
            return Err(EngineError::malformed(format!(
                "country is empty for user {}",
                self.user_id
            )));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(EngineError::malformed(format!("lat out of range: {}", self.lat)));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(EngineError::malformed(format!("lon out of range: {}", self.lon)));
        }

        if self.location.trim().is_empty() {
            self.location = if self.city.is_empty() {
                self.country.clone()
            } else {
                format!("{}, {}", self.city, self.country)
            };
        } else {
            self.location = self.location.trim().to_string();
        }
        Ok(self)
    }

    pub fn alert_id(&self) -> AlertId {
        AlertId::derive(&self.user_id, &self.timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RetractRecord {
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RetractRecord {
    /// An explicit `alert_id` wins; otherwise the id is derived from
    /// `user_id` and `timestamp` exactly like an alert's own id.
    pub fn resolve(&self) -> Result<AlertId, EngineError> {
        if let Some(raw) = self.alert_id.as_deref() {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Ok(AlertId(trimmed.to_string()));
            }
        }
        match (self.user_id.as_deref(), self.timestamp.as_ref()) {
            (Some(user), Some(ts)) if !user.trim().is_empty() => Ok(AlertId::derive(user, ts)),
            _ => Err(EngineError::malformed(
                "retract needs alert_id or user_id + timestamp",
            )),
        }
    }
}

/// RFC 3339, also accepting minute precision such as `2024-01-01T00:00Z`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let raw = raw.trim();
    let err = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => return Ok(ts.with_timezone(&Utc)),
        Err(err) => err,
    };
    let bytes = raw.as_bytes();
    if bytes.len() <= 16 || bytes[13] != b':' || bytes[16] == b':' || !raw.is_char_boundary(16) {
        return Err(err);
    }
    let widened = format!("{}:00{}", &raw[..16], &raw[16..]);
    DateTime::parse_from_rfc3339(&widened)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| err)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Login(LoginEvent),
    Retract(RetractRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(country: &str) -> LoginEvent {
        LoginEvent {
            timestamp: "2024-01-01T00:00:00Z".parse().expect("ts"),
            user_id: " u1 ".to_string(),
            ip_address: "10.0.0.1".to_string(),
            location: String::new(),
            city: "Moscow".to_string(),
            country: country.to_string(),
            lat: 55.7558,
            lon: 37.6173,
        }
    }

    #[test]
    fn normalized_fills_location_and_uppercases_country() {
        let normalized = event(" ru ").normalized().expect("valid");
        assert_eq!(normalized.user_id, "u1");
        assert_eq!(normalized.country, "RU");
        assert_eq!(normalized.location, "Moscow, RU");
    }

    #[test]
    fn normalized_rejects_blank_country_and_bad_coordinates() {
        assert!(matches!(
            event("  ").normalized(),
            Err(EngineError::EventMalformed(_))
        ));
        let mut bad = event("RU");
        bad.lat = 120.0;
        assert!(bad.normalized().is_err());
        let mut nan = event("RU");
        nan.lon = f64::NAN;
        assert!(nan.normalized().is_err());
    }

    #[test]
    fn source_record_decodes_tagged_lines() {
        let login: SourceRecord = serde_json::from_str(
            r#"{"kind":"login","timestamp":"2024-01-01T00:00:00Z","user_id":"u1","ip_address":"1.2.3.4","location":"Moscow, RU","city":"Moscow","country":"RU","lat":55.7,"lon":37.6}"#,
        )
        .expect("login");
        assert!(matches!(login, SourceRecord::Login(ref e) if e.user_id == "u1"));

        let retract: SourceRecord =
            serde_json::from_str(r#"{"kind":"retract","alert_id":"u1@2024-01-01T00:00:00Z"}"#)
                .expect("retract");
        match retract {
            SourceRecord::Retract(record) => assert_eq!(
                record.resolve().expect("id").as_str(),
                "u1@2024-01-01T00:00:00Z"
            ),
            _ => panic!("unexpected record"),
        }
    }

    #[test]
    fn minute_precision_timestamps_are_accepted() {
        let login: SourceRecord = serde_json::from_str(
            r#"{"kind":"login","timestamp":"2024-01-01T00:00Z","user_id":"u1","country":"RU","lat":55.7,"lon":37.6}"#,
        )
        .expect("login");
        match login {
            SourceRecord::Login(event) => {
                assert_eq!(event.alert_id().as_str(), "u1@2024-01-01T00:00:00Z")
            }
            _ => panic!("unexpected record"),
        }

        let retract: SourceRecord = serde_json::from_str(
            r#"{"kind":"retract","user_id":"u1","timestamp":"2024-01-01T01:30+01:00"}"#,
        )
        .expect("retract");
        match retract {
            SourceRecord::Retract(record) => assert_eq!(
                record.resolve().expect("id").as_str(),
                "u1@2024-01-01T00:30:00Z"
            ),
            _ => panic!("unexpected record"),
        }

        assert!(parse_timestamp("2024-01-01T00Z").is_err());
        assert!(parse_timestamp("yesterday at noon").is_err());
    }

    #[test]
    fn retract_derives_id_from_user_and_timestamp() {
        let record = RetractRecord {
            alert_id: None,
            user_id: Some("u1".to_string()),
            timestamp: Some("2024-01-01T01:00:00+01:00".parse().expect("ts")),
        };
        assert_eq!(
            record.resolve().expect("id").as_str(),
            "u1@2024-01-01T00:00:00Z"
        );
        assert!(RetractRecord::default().resolve().is_err());
    }
}
