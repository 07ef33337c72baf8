//! Error types for the appointment client.
//!
//! # Design
//! The store signals "no matching keys" with a `null` body or an empty
//! object. That is not an error: it is normalized to an empty result before
//! any of these variants come into play. Deleting an absent key is likewise
//! reported as success. Everything else that can go wrong between building a
//! request and reshaping its response lands here.

use thiserror::Error;

/// Errors returned by `AppointmentClient`, `AppointmentService` and `Scheduler`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip (DNS, connect, timeout).
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body is not JSON.
    #[error("malformed response body: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The response body is JSON but neither `null` nor a keyed collection.
    #[error("expected a keyed collection, got {0}")]
    UnexpectedShape(&'static str),

    /// A stored value under `key` is missing a field or has a mistyped one.
    #[error("record {key} is malformed: {source}")]
    InvalidRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The record key would address something other than a single record.
    #[error("invalid record key {0:?}")]
    InvalidKey(String),

    /// The collection URL cannot have a record key appended.
    #[error("invalid collection URL {0:?}")]
    InvalidBaseUrl(String),

    /// A booking rule refused the appointment.
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

/// Reasons a booking or a change is refused before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("date {0:?} is not a valid YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("time {0:?} is not a valid HH:MM time")]
    InvalidTime(String),

    #[error("date {0} is in the past")]
    PastDate(String),

    #[error("no more appointments can be made today after 16:00")]
    DayClosed,

    #[error("time {0} has already passed today")]
    TimeNotInFuture(String),

    #[error("{date} {time} is not an available slot")]
    SlotUnavailable { date: String, time: String },

    #[error("no appointment {0} for this user")]
    UnknownAppointment(String),
}
