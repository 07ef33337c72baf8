//! Client core for appointment records kept in a Realtime Database.
//!
//! # Overview
//! `AppointmentClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). The async
//! `AppointmentService` drives one client through an `HttpTransport`, and
//! `Scheduler` adds the clinic's booking rules on top of several databases.
//!
//! # Design
//! - `AppointmentClient` is stateless: it holds only the collection URL.
//! - Each operation is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit.
//! - Keyed reads go through `Snapshot`, which turns the store's `null` /
//!   `{}` answers into an explicit `Empty` case.
//! - Record keys are assigned by the store and only ever round-tripped.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod schedule;
pub mod scheduler;
pub mod service;
pub mod shard;
pub mod snapshot;
pub mod transport;
pub mod types;

pub use client::AppointmentClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Rejection};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{user_id_from_query, user_id_from_url};
pub use scheduler::Scheduler;
pub use service::AppointmentService;
pub use shard::ShardRouter;
pub use snapshot::Snapshot;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{Appointment, AppointmentData};
