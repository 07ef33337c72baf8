//! One async call per appointment operation.
//!
//! `AppointmentService` pairs an `AppointmentClient` with an `HttpTransport`
//! and runs build → execute → parse for each operation. Each call is a single
//! request; nothing is cached, retried or shared between calls. Dropping the
//! returned future abandons the request.

use tracing::{debug, instrument, warn};

use crate::client::AppointmentClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::HttpTransport;
use crate::types::{Appointment, AppointmentData};

#[derive(Debug, Clone)]
pub struct AppointmentService<T> {
    client: AppointmentClient,
    transport: T,
}

impl<T: HttpTransport> AppointmentService<T> {
    pub fn new(client: AppointmentClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &AppointmentClient {
        &self.client
    }

    /// Times already booked on `date`.
    #[instrument(skip(self), fields(base = %self.client.base_url()))]
    pub async fn query_appointments_by_date(&self, date: &str) -> Result<Vec<String>, ApiError> {
        let response = self.send(self.client.build_query_by_date(date)).await?;
        self.client.parse_query_by_date(response)
    }

    /// Every appointment on `date`, full records.
    #[instrument(skip(self), fields(base = %self.client.base_url()))]
    pub async fn find_appointments_by_date(&self, date: &str) -> Result<Vec<Appointment>, ApiError> {
        let response = self.send(self.client.build_query_by_date(date)).await?;
        self.client.parse_appointments(response)
    }

    /// Every appointment owned by `user_id`.
    #[instrument(skip(self), fields(base = %self.client.base_url()))]
    pub async fn query_appointments_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Vec<Appointment>, ApiError> {
        let response = self.send(self.client.build_query_by_user_id(user_id)).await?;
        self.client.parse_query_by_user_id(response)
    }

    #[instrument(skip(self), fields(base = %self.client.base_url()))]
    pub async fn delete_appointment(&self, id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete(id)?).await?;
        self.client.parse_delete(response)
    }

    /// Full replace of the record at `id`.
    #[instrument(skip(self, data), fields(base = %self.client.base_url()))]
    pub async fn update_appointment(&self, id: &str, data: &AppointmentData) -> Result<(), ApiError> {
        let response = self.send(self.client.build_update(id, data)?).await?;
        self.client.parse_update(response)
    }

    #[instrument(skip(self, data), fields(base = %self.client.base_url(), user_id = %data.user_id))]
    pub async fn create_appointment(&self, data: AppointmentData) -> Result<Appointment, ApiError> {
        let response = self.send(self.client.build_create(&data)?).await?;
        let key = self.client.parse_create(response)?;
        debug!(%key, "appointment created");
        Ok(Appointment::from_record(key, data))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "store answered with a non-success status");
        }
        Ok(response)
    }
}
