//! Companion backend client.
//!
//! The backend speaks bearer-token REST; tokens come from the host
//! application's federated identity through [`IdTokenProvider`] and are
//! passed per call, never cached here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unipal_core::{AssignmentAppData, AssignmentList, ClassAppData, Timetable};
use unipal_fetch::{ClientMode, FetchError, HttpRequest, Method, Transport};

use crate::error::ProviderError;

/// Supplies a fresh bearer token for backend calls.
#[async_trait]
pub trait IdTokenProvider: Send + Sync {
    /// Returns a currently valid ID token.
    async fn id_token(&self) -> Result<String, FetchError>;
}

/// Partial update for one stored assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    /// Completion timestamp; `null` clears it.
    pub done_at: Option<DateTime<Utc>>,
    /// New deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    /// Replacement app data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data: Option<AssignmentAppData>,
}

/// Partial update for one stored class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetablePatch {
    /// Term the class belongs to.
    pub term: String,
    /// LMS class identity.
    pub manabo_id: String,
    /// Replacement app data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data: Option<ClassAppData>,
}

/// One stored attendance record. The attendance payload is owned by the
/// host application and stays opaque here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Backend-assigned record ID.
    pub id: String,
    /// Opaque app-side payload.
    pub app_data: serde_json::Value,
}

/// Attendance records of one class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceList {
    /// LMS class the records belong to.
    pub manabo_id: String,
    /// Stored records.
    pub attendances: Vec<AttendanceRecord>,
}

/// Bearer-token REST client for the companion backend.
pub struct HubApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl HubApiClient {
    /// Creates the client against a backend origin.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    fn authed(&self, request: HttpRequest, token: &str) -> HttpRequest {
        request
            .mode(ClientMode::HubApi)
            .header("Authorization", format!("Bearer {token}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registers the session with the backend.
    pub async fn login(&self, token: &str) -> Result<(), ProviderError> {
        let request = HttpRequest::json(Method::Post, self.url("/v1/auth/login"), serde_json::json!({}));
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Fetches the stored timetable.
    pub async fn timetable(&self, token: &str) -> Result<Timetable, ProviderError> {
        let request = HttpRequest::get(self.url("/v1/timetable"));
        let response = self.transport.send(self.authed(request, token)).await?;
        Ok(response.json()?)
    }

    /// Replaces the stored timetable wholesale.
    pub async fn put_timetable(&self, token: &str, timetable: &Timetable) -> Result<(), ProviderError> {
        let body = serde_json::to_value(timetable)
            .map_err(|e| FetchError::Network(format!("Unencodable timetable: {e}")))?;
        let request = HttpRequest::json(Method::Post, self.url("/v1/timetable"), body);
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Fetches the stored assignments.
    pub async fn assignments(&self, token: &str) -> Result<AssignmentList, ProviderError> {
        let request = HttpRequest::get(self.url("/v1/assignments"));
        let response = self.transport.send(self.authed(request, token)).await?;
        Ok(response.json()?)
    }

    /// Stages newly discovered assignments.
    pub async fn post_assignments(
        &self,
        token: &str,
        assignments: &AssignmentList,
    ) -> Result<(), ProviderError> {
        let body = serde_json::to_value(assignments)
            .map_err(|e| FetchError::Network(format!("Unencodable assignments: {e}")))?;
        let request = HttpRequest::json(Method::Post, self.url("/v1/assignments"), body);
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Applies a partial update to one assignment.
    pub async fn patch_assignment(
        &self,
        token: &str,
        assignment_id: &str,
        patch: &AssignmentPatch,
    ) -> Result<(), ProviderError> {
        let body = serde_json::to_value(patch)
            .map_err(|e| FetchError::Network(format!("Unencodable patch: {e}")))?;
        let request = HttpRequest::json(
            Method::Patch,
            self.url(&format!("/v1/assignments/{assignment_id}")),
            body,
        );
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Deletes one stored assignment.
    pub async fn delete_assignment(&self, token: &str, assignment_id: &str) -> Result<(), ProviderError> {
        let request = HttpRequest::delete(self.url(&format!("/v1/assignments/{assignment_id}")));
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Applies a partial update to one stored class.
    pub async fn patch_timetable(&self, token: &str, patch: &TimetablePatch) -> Result<(), ProviderError> {
        let body = serde_json::to_value(patch)
            .map_err(|e| FetchError::Network(format!("Unencodable patch: {e}")))?;
        let request = HttpRequest::json(Method::Patch, self.url("/v1/timetable"), body);
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Fetches the attendance records of one class.
    pub async fn attendance(&self, token: &str, manabo_id: &str) -> Result<AttendanceList, ProviderError> {
        let request = HttpRequest::get(self.url(&format!("/v1/attendance/{manabo_id}")));
        let response = self.transport.send(self.authed(request, token)).await?;
        Ok(response.json()?)
    }

    /// Records one attendance entry for a class.
    pub async fn post_attendance(
        &self,
        token: &str,
        manabo_id: &str,
        app_data: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let body = serde_json::json!({ "appData": app_data });
        let request = HttpRequest::json(
            Method::Post,
            self.url(&format!("/v1/attendance/{manabo_id}")),
            body,
        );
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Replaces the payload of one attendance record.
    pub async fn patch_attendance(
        &self,
        token: &str,
        manabo_id: &str,
        record_id: &str,
        app_data: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let body = serde_json::json!({ "appData": app_data });
        let request = HttpRequest::json(
            Method::Patch,
            self.url(&format!("/v1/attendance/{manabo_id}/{record_id}")),
            body,
        );
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Deletes one attendance record.
    pub async fn delete_attendance(
        &self,
        token: &str,
        manabo_id: &str,
        record_id: &str,
    ) -> Result<(), ProviderError> {
        let request =
            HttpRequest::delete(self.url(&format!("/v1/attendance/{manabo_id}/{record_id}")));
        self.transport.send(self.authed(request, token)).await?;
        Ok(())
    }

    /// Fetches the bus timetable document. The document is served as-is
    /// to the host application, so it stays untyped here.
    pub async fn bus_timetable(&self, token: &str) -> Result<serde_json::Value, ProviderError> {
        let request = HttpRequest::get(self.url("/v1/bus/timetable"));
        let response = self.transport.send(self.authed(request, token)).await?;
        Ok(response.json()?)
    }

    /// Fetches the academic calendar document.
    pub async fn calendar(&self, token: &str) -> Result<serde_json::Value, ProviderError> {
        let request = HttpRequest::get(self.url("/v1/calendar"));
        let response = self.transport.send(self.authed(request, token)).await?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use unipal_fetch::HttpResponse;

    struct RecordingTransport {
        requests: Mutex<Vec<HttpRequest>>,
        status: u16,
        sends: std::sync::atomic::AtomicU32,
    }

    impl RecordingTransport {
        fn new(status: u16) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                status,
                sends: std::sync::atomic::AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.status == 503 {
                return Err(match request.mode {
                    ClientMode::Portal => FetchError::PortalMaintenance,
                    ClientMode::HubApi => FetchError::ApiMaintenance,
                });
            }
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                final_url: "https://api.example.test".into(),
                status: self.status,
                body: "{}".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_token_and_api_mode() {
        let transport = Arc::new(RecordingTransport::new(200));
        let client = HubApiClient::new("https://api.example.test", transport.clone());
        client.login("tok-1").await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.test/v1/auth/login");
        assert_eq!(requests[0].mode, ClientMode::HubApi);
        assert!(requests[0]
            .headers
            .iter()
            .any(|(n, v)| n == "Authorization" && v == "Bearer tok-1"));
    }

    #[tokio::test]
    async fn test_attendance_routes_are_scoped_by_class_and_record() {
        let transport = Arc::new(RecordingTransport::new(200));
        let client = HubApiClient::new("https://api.example.test", transport.clone());

        client
            .post_attendance("tok", "123", &serde_json::json!({"present": true}))
            .await
            .unwrap();
        client.delete_attendance("tok", "123", "a-9").await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://api.example.test/v1/attendance/123");
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[1].url,
            "https://api.example.test/v1/attendance/123/a-9"
        );
        assert_eq!(requests[1].method, Method::Delete);
        assert!(requests[1].body.is_none());
    }

    #[tokio::test]
    async fn test_maintenance_maps_to_api_error() {
        let transport = Arc::new(RecordingTransport::new(503));
        let client = HubApiClient::new("https://api.example.test", transport);
        let err = client.bus_timetable("tok").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Fetch(FetchError::ApiMaintenance)
        ));
    }
}
