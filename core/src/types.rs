//! Appointment records as stored and as handed to callers.
//!
//! # Design
//! The store keeps each appointment as a bare value under a generated key;
//! the key is never part of the value. `AppointmentData` is that value and
//! doubles as the PUT/POST payload. `Appointment` re-attaches the key as `id`
//! once a record has been read back. Every field is required, so a stored
//! value missing one fails deserialization instead of producing a blank.

use serde::{Deserialize, Serialize};

/// The four stored fields of an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentData {
    pub user_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl AppointmentData {
    pub fn new(
        user_id: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date: date.into(),
            time: time.into(),
            reason: reason.into(),
        }
    }
}

/// An appointment read back from the store, annotated with its key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl Appointment {
    pub fn from_record(id: impl Into<String>, data: AppointmentData) -> Self {
        Self {
            id: id.into(),
            user_id: data.user_id,
            date: data.date,
            time: data.time,
            reason: data.reason,
        }
    }

    /// The stored value without its key.
    pub fn data(&self) -> AppointmentData {
        AppointmentData {
            user_id: self.user_id.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            reason: self.reason.clone(),
        }
    }
}

/// Body the store returns for a POST: the key it generated.
#[derive(Debug, Clone, Deserialize)]
pub struct PushResult {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_serializes_with_camel_case_keys() {
        let data = AppointmentData::new("u1", "2024-01-01", "10:00", "checkup");
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "u1",
                "date": "2024-01-01",
                "time": "10:00",
                "reason": "checkup"
            })
        );
    }

    #[test]
    fn data_rejects_missing_reason() {
        let result: Result<AppointmentData, _> =
            serde_json::from_str(r#"{"userId":"u1","date":"2024-01-01","time":"10:00"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn data_ignores_extra_fields() {
        let data: AppointmentData = serde_json::from_str(
            r#"{"userId":"u1","date":"2024-01-01","time":"10:00","reason":"x","room":7}"#,
        )
        .unwrap();
        assert_eq!(data.reason, "x");
    }

    #[test]
    fn appointment_keeps_key_as_id() {
        let data = AppointmentData::new("u1", "2024-01-01", "10:00", "x");
        let appointment = Appointment::from_record("-Nabc", data.clone());
        assert_eq!(appointment.id, "-Nabc");
        assert_eq!(appointment.data(), data);
    }
}
