//! Booking across several databases.
//!
//! Each user's appointments live on the database the `ShardRouter` picks for
//! them, but a time slot is shared clinic-wide: a slot is free only if no
//! database holds an appointment at that date and time.

use chrono::{Local, NaiveDateTime};
use tracing::{info, instrument};

use crate::client::AppointmentClient;
use crate::error::{ApiError, Rejection};
use crate::schedule;
use crate::service::AppointmentService;
use crate::shard::ShardRouter;
use crate::transport::HttpTransport;
use crate::types::{Appointment, AppointmentData};

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    router: ShardRouter,
    transport: T,
}

impl<T: HttpTransport + Clone> Scheduler<T> {
    pub fn new(router: ShardRouter, transport: T) -> Self {
        Self { router, transport }
    }

    pub fn router(&self) -> &ShardRouter {
        &self.router
    }

    /// The user's appointments ordered by date and time.
    #[instrument(skip(self))]
    pub async fn appointments_for_user(&self, user_id: &str) -> Result<Vec<Appointment>, ApiError> {
        let mut appointments = self
            .service(self.router.client_for(user_id))
            .query_appointments_by_user_id(user_id)
            .await?;
        schedule::sort_by_schedule(&mut appointments);
        Ok(appointments)
    }

    /// Times booked on `date` on any database.
    #[instrument(skip(self))]
    pub async fn reserved_times(&self, date: &str) -> Result<Vec<String>, ApiError> {
        let mut reserved = Vec::new();
        for client in self.router.clients() {
            reserved.extend(self.service(client).query_appointments_by_date(date).await?);
        }
        Ok(reserved)
    }

    /// Every appointment on `date` across all databases, ordered by time.
    #[instrument(skip(self))]
    pub async fn appointments_on(&self, date: &str) -> Result<Vec<Appointment>, ApiError> {
        let mut appointments = Vec::new();
        for client in self.router.clients() {
            appointments.extend(self.service(client).find_appointments_by_date(date).await?);
        }
        schedule::sort_by_schedule(&mut appointments);
        Ok(appointments)
    }

    pub async fn available_times(&self, date: &str) -> Result<Vec<&'static str>, ApiError> {
        let reserved = self.reserved_times(date).await?;
        Ok(schedule::available_times(reserved.iter().map(String::as_str)))
    }

    pub async fn book(&self, data: AppointmentData) -> Result<Appointment, ApiError> {
        self.book_at(data, Local::now().naive_local()).await
    }

    /// Book `data` as if the current local time were `now`.
    #[instrument(skip(self, data), fields(user_id = %data.user_id, date = %data.date, time = %data.time))]
    pub async fn book_at(
        &self,
        data: AppointmentData,
        now: NaiveDateTime,
    ) -> Result<Appointment, ApiError> {
        let date = schedule::validate_date(&data.date)?;
        let time = schedule::validate_time(&data.time)?;
        schedule::check_bookable(date, time, now)?;

        let free = self.available_times(&data.date).await?;
        if !free.contains(&data.time.as_str()) {
            return Err(Rejection::SlotUnavailable {
                date: data.date,
                time: data.time,
            }
            .into());
        }

        let appointment = self
            .service(self.router.client_for(&data.user_id))
            .create_appointment(data)
            .await?;
        info!(id = %appointment.id, "appointment booked");
        Ok(appointment)
    }

    pub async fn reschedule(
        &self,
        user_id: &str,
        id: &str,
        new: AppointmentData,
    ) -> Result<Appointment, ApiError> {
        self.reschedule_at(user_id, id, new, Local::now().naive_local())
            .await
    }

    /// Move the user's appointment `id` to `new.date` and `new.time` with
    /// `new.reason`, as if the current local time were `now`. The booking
    /// rules of `book_at` apply to the new slot; the appointment's own slot
    /// counts as free. The record keeps its owner and is replaced in full.
    #[instrument(skip(self, new), fields(date = %new.date, time = %new.time))]
    pub async fn reschedule_at(
        &self,
        user_id: &str,
        id: &str,
        new: AppointmentData,
        now: NaiveDateTime,
    ) -> Result<Appointment, ApiError> {
        let date = schedule::validate_date(&new.date)?;
        let time = schedule::validate_time(&new.time)?;

        let current = self
            .appointments_for_user(user_id)
            .await?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Rejection::UnknownAppointment(id.to_string()))?;

        schedule::check_bookable(date, time, now)?;

        let taken = self
            .appointments_on(&new.date)
            .await?
            .iter()
            .any(|a| a.time == new.time && !(a.id == current.id && a.user_id == current.user_id));
        if taken || !schedule::SLOTS.contains(&new.time.as_str()) {
            return Err(Rejection::SlotUnavailable {
                date: new.date,
                time: new.time,
            }
            .into());
        }

        let data = AppointmentData {
            user_id: current.user_id,
            ..new
        };
        self.service(self.router.client_for(user_id))
            .update_appointment(&current.id, &data)
            .await?;
        info!(%id, "appointment rescheduled");
        Ok(Appointment::from_record(current.id, data))
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: &str, id: &str) -> Result<(), ApiError> {
        self.service(self.router.client_for(user_id))
            .delete_appointment(id)
            .await
    }

    /// Cancel the user's appointment at `date` and `time`. Returns whether
    /// one was found.
    #[instrument(skip(self))]
    pub async fn cancel_slot(&self, user_id: &str, date: &str, time: &str) -> Result<bool, ApiError> {
        let appointments = self.appointments_for_user(user_id).await?;
        let Some(target) = appointments
            .into_iter()
            .find(|a| a.date == date && a.time == time)
        else {
            return Ok(false);
        };
        self.cancel(user_id, &target.id).await?;
        info!(id = %target.id, "appointment cancelled");
        Ok(true)
    }

    fn service(&self, client: AppointmentClient) -> AppointmentService<T> {
        AppointmentService::new(client, self.transport.clone())
    }
}
