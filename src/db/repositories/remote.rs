//! Remote repository speaking to the real fleet backend.
//!
//! Every call crosses a JSON boundary shaped as
//! `{ "is_success": bool, "error": string?, "value": ... }`. An unsuccessful
//! envelope becomes [`RepositoryError::Rejected`] carrying the backend's
//! message; transport failures become connection/timeout errors.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{
    AssignmentStatus, Convoy, ConvoyId, DayType, DepotId, DispatchBusLineId, DispatchDay,
    ReplacementRequest, ScheduledRepair, StatementId,
};
use crate::db::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{DispatchRepository, FleetRepository};
use crate::models::HolidayTable;

/// Connection settings for the fleet backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

fn default_request_timeout_sec() -> u64 {
    30
}

impl RemoteConfig {
    /// Read connection settings from the environment.
    ///
    /// `FLEET_BACKEND_URL` is required; `FLEET_BACKEND_TIMEOUT_SEC` optional.
    pub fn from_env() -> Result<Self, String> {
        let base_url = std::env::var("FLEET_BACKEND_URL")
            .map_err(|_| "FLEET_BACKEND_URL environment variable not set".to_string())?;
        let request_timeout_sec = std::env::var("FLEET_BACKEND_TIMEOUT_SEC")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_request_timeout_sec);
        Ok(Self {
            base_url,
            request_timeout_sec,
        })
    }
}

/// JSON envelope wrapping every backend response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    is_success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default = "Option::default")]
    value: Option<T>,
}

fn unwrap_envelope<T>(envelope: Envelope<T>, operation: &str) -> RepositoryResult<T> {
    if !envelope.is_success {
        let message = envelope
            .error
            .unwrap_or_else(|| "Backend reported failure without a message".to_string());
        return Err(RepositoryError::rejected_with_context(
            message,
            ErrorContext::new(operation),
        ));
    }
    envelope.value.ok_or_else(|| {
        RepositoryError::internal(format!("Backend returned success without a value ({operation})"))
    })
}

fn unwrap_unit_envelope(envelope: Envelope<serde_json::Value>, operation: &str) -> RepositoryResult<()> {
    if !envelope.is_success {
        let message = envelope
            .error
            .unwrap_or_else(|| "Backend reported failure without a message".to_string());
        return Err(RepositoryError::rejected_with_context(
            message,
            ErrorContext::new(operation),
        ));
    }
    Ok(())
}

/// HTTP client for the fleet backend.
pub struct RemoteRepository {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteRepository {
    pub fn new(config: &RemoteConfig) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_sec))
            .build()
            .map_err(|e| RepositoryError::configuration(format!("HTTP client build: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> RepositoryResult<T> {
        let envelope: Envelope<T> = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(RepositoryError::from)?
            .json()
            .await
            .map_err(RepositoryError::from)?;
        unwrap_envelope(envelope, operation)
    }

    /// Like `get_json`, but a successful envelope with a null/omitted value
    /// yields the default (used where "nothing found" is a valid answer).
    async fn get_json_or_default<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> RepositoryResult<T> {
        let envelope: Envelope<T> = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(RepositoryError::from)?
            .json()
            .await
            .map_err(RepositoryError::from)?;
        if !envelope.is_success {
            let message = envelope
                .error
                .unwrap_or_else(|| "Backend reported failure without a message".to_string());
            return Err(RepositoryError::rejected_with_context(
                message,
                ErrorContext::new(operation),
            ));
        }
        Ok(envelope.value.unwrap_or_default())
    }

    async fn post_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> RepositoryResult<()> {
        let envelope: Envelope<serde_json::Value> = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(RepositoryError::from)?
            .json()
            .await
            .map_err(RepositoryError::from)?;
        unwrap_unit_envelope(envelope, operation)
    }
}

#[async_trait]
impl DispatchRepository for RemoteRepository {
    async fn get_full_dispatch_by_date(
        &self,
        date: NaiveDate,
        convoy_id: ConvoyId,
        day_type: DayType,
    ) -> RepositoryResult<DispatchDay> {
        self.get_json(
            "/v1/dispatches/full",
            &[
                ("date", date.to_string()),
                ("convoy_id", convoy_id.to_string()),
                ("day_type", day_type.to_string()),
            ],
            "get_full_dispatch_by_date",
        )
        .await
    }

    async fn replace_assignment(&self, request: ReplacementRequest) -> RepositoryResult<()> {
        self.post_unit("/v1/dispatches/replace", &request, "replace_assignment")
            .await
            .map_err(|e| e.with_operation("replace_assignment"))
    }

    async fn update_dispatch_status(
        &self,
        line_id: DispatchBusLineId,
        status: AssignmentStatus,
        is_released: bool,
    ) -> RepositoryResult<()> {
        let body = serde_json::json!({
            "dispatch_bus_line_id": line_id,
            "status": status.code(),
            "is_released": is_released,
        });
        self.post_unit("/v1/dispatches/status", &body, "update_dispatch_status")
            .await
            .map_err(|e| e.with_operation("update_dispatch_status"))
    }

    async fn fetch_scheduled_repairs(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduledRepair>> {
        self.get_json(
            "/v1/repairs",
            &[
                ("convoy_id", convoy_id.to_string()),
                ("date", date.to_string()),
            ],
            "fetch_scheduled_repairs",
        )
        .await
    }
}

#[async_trait]
impl FleetRepository for RemoteRepository {
    async fn get_by_depot_id(&self, depot_id: DepotId) -> RepositoryResult<Vec<Convoy>> {
        self.get_json(
            "/v1/convoys/by-depot",
            &[("depot_id", depot_id.to_string())],
            "get_by_depot_id",
        )
        .await
    }

    async fn fetch_holiday_table(&self, year: i32) -> RepositoryResult<HolidayTable> {
        self.get_json(
            "/v1/holidays",
            &[("year", year.to_string())],
            "fetch_holiday_table",
        )
        .await
    }

    async fn find_statement(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<StatementId>> {
        self.get_json_or_default(
            "/v1/statements",
            &[
                ("convoy_id", convoy_id.to_string()),
                ("date", date.to_string()),
            ],
            "find_statement",
        )
        .await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        match self
            .get_json::<bool>("/health", &[], "health_check")
            .await
        {
            Ok(ok) => Ok(ok),
            Err(RepositoryError::Rejected { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_failure_maps_to_rejected() {
        let envelope: Envelope<i64> = serde_json::from_str(
            r#"{"is_success": false, "error": "driver is already on a line"}"#,
        )
        .unwrap();
        let err = unwrap_envelope(envelope, "replace_assignment").unwrap_err();
        assert!(matches!(err, RepositoryError::Rejected { .. }));
        assert!(err.to_string().contains("driver is already on a line"));
    }

    #[test]
    fn test_envelope_success_yields_value() {
        let envelope: Envelope<i64> =
            serde_json::from_str(r#"{"is_success": true, "value": 7}"#).unwrap();
        assert_eq!(unwrap_envelope(envelope, "find_statement").unwrap(), 7);
    }

    #[test]
    fn test_envelope_missing_message_gets_fallback() {
        let envelope: Envelope<i64> = serde_json::from_str(r#"{"is_success": false}"#).unwrap();
        let err = unwrap_envelope(envelope, "x").unwrap_err();
        assert!(err.to_string().contains("without a message"));
    }

    #[test]
    fn test_unit_envelope_ignores_value() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"is_success": true}"#).unwrap();
        assert!(unwrap_unit_envelope(envelope, "update_dispatch_status").is_ok());
    }
}
