//! Stateless HTTP request builder and response parser for an appointment
//! collection.
//!
//! # Design
//! `AppointmentClient` holds only the collection URL (for example
//! `https://db.example/appointments`) and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Addressing follows the Realtime Database REST convention: the collection
//! is `{base}.json`, one record is `{base}/{key}.json`.

use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::schedule;
use crate::snapshot::Snapshot;
use crate::types::{Appointment, AppointmentData, PushResult};

/// Synchronous, stateless client for one appointment collection.
#[derive(Debug, Clone)]
pub struct AppointmentClient {
    base_url: String,
}

impl AppointmentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Records whose `date` equals `date`. The value is not validated.
    pub fn build_query_by_date(&self, date: &str) -> HttpRequest {
        self.build_query("date", date)
    }

    /// Records whose `userId` equals `user_id`.
    pub fn build_query_by_user_id(&self, user_id: &str) -> HttpRequest {
        self.build_query("userId", user_id)
    }

    pub fn build_delete(&self, id: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.record_url(id)?,
            headers: Vec::new(),
            body: None,
        })
    }

    /// Replace the record at `id` with `data`. Fields stored earlier but not
    /// part of `data` do not survive.
    pub fn build_update(&self, id: &str, data: &AppointmentData) -> Result<HttpRequest, ApiError> {
        let url = self.record_url(id)?;
        let body = serde_json::to_string(data).map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url,
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// Push a new record. Date and time must be well formed; the key is
    /// chosen by the store.
    pub fn build_create(&self, data: &AppointmentData) -> Result<HttpRequest, ApiError> {
        schedule::validate_date(&data.date)?;
        schedule::validate_time(&data.time)?;
        let body = serde_json::to_string(data).map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}.json", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// Booked times, in the order the store returned the records.
    pub fn parse_query_by_date(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        let snapshot = parse_snapshot(&response)?;
        Ok(snapshot
            .into_records()
            .into_iter()
            .map(|(_, data)| data.time)
            .collect())
    }

    pub fn parse_query_by_user_id(&self, response: HttpResponse) -> Result<Vec<Appointment>, ApiError> {
        self.parse_appointments(response)
    }

    /// Full records of a keyed read, each carrying its key as `id`. Works
    /// for either query.
    pub fn parse_appointments(&self, response: HttpResponse) -> Result<Vec<Appointment>, ApiError> {
        let snapshot = parse_snapshot(&response)?;
        Ok(snapshot
            .into_records()
            .into_iter()
            .map(|(key, data)| Appointment::from_record(key, data))
            .collect())
    }

    /// The store answers `200 null` whether or not the key existed. A 404
    /// means the request did not address a record and is an error.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Key the store generated for a pushed record.
    pub fn parse_create(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let pushed: PushResult =
            serde_json::from_str(&response.body).map_err(ApiError::Deserialization)?;
        Ok(pushed.name)
    }

    fn build_query(&self, field: &str, value: &str) -> HttpRequest {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("orderBy", &json_string(field))
            .append_pair("equalTo", &json_string(value))
            .finish();
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}.json?{query}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The key becomes one percent-encoded path segment, so `?`, `%` or a
    /// space stay part of it. An empty key or one with `/` would address the
    /// whole collection or a different path.
    fn record_url(&self, id: &str) -> Result<String, ApiError> {
        if id.is_empty() || id.contains('/') {
            return Err(ApiError::InvalidKey(id.to_string()));
        }
        let invalid_base = || ApiError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .push(&format!("{id}.json"));
        Ok(url.into())
    }
}

/// Query values are JSON literals: `"date"`, `"2024-01-01"`.
fn json_string(value: &str) -> String {
    Value::from(value).to_string()
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn parse_snapshot(response: &HttpResponse) -> Result<Snapshot<AppointmentData>, ApiError> {
    check_status(response)?;
    Snapshot::from_body(&response.body)
}

/// Map non-success status codes to `ApiError::Http`, lifting the store's
/// `{"error": ...}` message when present.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;

    fn client() -> AppointmentClient {
        AppointmentClient::new("http://localhost:3000/appointments")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn data() -> AppointmentData {
        AppointmentData::new("u1", "2024-02-02", "11:00", "y")
    }

    #[test]
    fn build_query_by_date_produces_correct_request() {
        let req = client().build_query_by_date("2024-01-01");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/appointments.json?orderBy=%22date%22&equalTo=%222024-01-01%22"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_query_by_user_id_produces_correct_request() {
        let req = client().build_query_by_user_id("u1");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/appointments.json?orderBy=%22userId%22&equalTo=%22u1%22"
        );
    }

    #[test]
    fn query_value_is_escaped() {
        let req = client().build_query_by_user_id(r#"a&b"c"#);
        assert!(req.url.ends_with("equalTo=%22a%26b%5C%22c%22"), "{}", req.url);
    }

    #[test]
    fn build_delete_produces_correct_request() {
        let req = client().build_delete("a1").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/appointments/a1.json");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_delete_refuses_collection_wide_keys() {
        assert!(matches!(client().build_delete(""), Err(ApiError::InvalidKey(_))));
        assert!(matches!(client().build_delete("a/b"), Err(ApiError::InvalidKey(_))));
    }

    #[test]
    fn build_update_sends_full_record() {
        let req = client().build_update("a1", &data()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/appointments/a1.json");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"userId": "u1", "date": "2024-02-02", "time": "11:00", "reason": "y"})
        );
    }

    #[test]
    fn build_update_forwards_unvalidated_fields() {
        let odd = AppointmentData::new("u1", "someday", "noonish", "");
        assert!(client().build_update("a1", &odd).is_ok());
    }

    #[test]
    fn build_create_posts_to_collection() {
        let req = client().build_create(&data()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/appointments.json");
        assert!(req.body.is_some());
    }

    #[test]
    fn build_create_rejects_bad_time() {
        let bad = AppointmentData::new("u1", "2024-02-02", "11am", "y");
        let err = client().build_create(&bad).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(Rejection::InvalidTime(_))));
    }

    #[test]
    fn parse_query_by_date_extracts_times() {
        let body = r#"{
            "-a": {"userId":"u1","date":"2024-01-01","time":"10:00","reason":"x"},
            "-b": {"userId":"u2","date":"2024-01-01","time":"13:00","reason":"y"}
        }"#;
        let times = client().parse_query_by_date(ok(body)).unwrap();
        assert_eq!(times, ["10:00", "13:00"]);
    }

    #[test]
    fn parse_query_null_is_empty() {
        assert!(client().parse_query_by_date(ok("null")).unwrap().is_empty());
        assert!(client().parse_query_by_user_id(ok("null")).unwrap().is_empty());
    }

    #[test]
    fn parse_appointments_reads_date_query() {
        let body = r#"{
            "-a": {"userId":"u1","date":"2024-01-01","time":"10:00","reason":"x"},
            "-b": {"userId":"u2","date":"2024-01-01","time":"13:00","reason":"y"}
        }"#;
        let list = client().parse_appointments(ok(body)).unwrap();
        let users: Vec<&str> = list.iter().map(|a| a.user_id.as_str()).collect();
        assert_eq!(users, ["u1", "u2"]);
        assert_eq!(list[1].id, "-b");
    }

    #[test]
    fn parse_query_by_user_id_rebuilds_appointments() {
        let body = r#"{"a1": {"userId":"u1","date":"2024-01-01","time":"10:00","reason":"x"}}"#;
        let list = client().parse_query_by_user_id(ok(body)).unwrap();
        assert_eq!(
            list,
            vec![Appointment {
                id: "a1".to_string(),
                user_id: "u1".to_string(),
                date: "2024-01-01".to_string(),
                time: "10:00".to_string(),
                reason: "x".to_string(),
            }]
        );
    }

    #[test]
    fn parse_query_surfaces_store_error_message() {
        let response = HttpResponse {
            status: 400,
            headers: Vec::new(),
            body: r#"{"error":"Index not defined, add \".indexOn\": \"date\""}"#.to_string(),
        };
        let err = client().parse_query_by_date(response).unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("Index not defined"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_query_bad_json() {
        let err = client().parse_query_by_user_id(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn build_delete_encodes_key_as_one_segment() {
        let req = client().build_delete("a?b").unwrap();
        assert_eq!(req.url, "http://localhost:3000/appointments/a%3Fb.json");
        let req = client().build_delete("50% off #2").unwrap();
        assert_eq!(req.url, "http://localhost:3000/appointments/50%25%20off%20%232.json");
    }

    #[test]
    fn build_update_encodes_key() {
        let req = client().build_update("a?b", &data()).unwrap();
        assert_eq!(req.url, "http://localhost:3000/appointments/a%3Fb.json");
    }

    #[test]
    fn unparseable_base_url_is_refused() {
        let client = AppointmentClient::new("not a url");
        assert!(matches!(client.build_delete("a1"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn parse_delete_accepts_absent_record() {
        assert!(client().parse_delete(ok("null")).is_ok());
    }

    #[test]
    fn parse_delete_not_found_is_an_error() {
        let not_found = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_delete(not_found).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
    }

    #[test]
    fn parse_delete_server_error() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_delete(response).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, ref message } if message == "internal error"));
    }

    #[test]
    fn parse_update_ignores_body() {
        assert!(client().parse_update(ok("whatever the store echoes")).is_ok());
    }

    #[test]
    fn parse_create_returns_generated_key() {
        let key = client().parse_create(ok(r#"{"name":"-NxYz"}"#)).unwrap();
        assert_eq!(key, "-NxYz");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = AppointmentClient::new("http://localhost:3000/appointments/");
        let req = client.build_delete("a1").unwrap();
        assert_eq!(req.url, "http://localhost:3000/appointments/a1.json");
    }
}
