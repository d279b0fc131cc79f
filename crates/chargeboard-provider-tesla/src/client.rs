//! HTTP client for the Tesla owner and ownership APIs
//!
//! Only the three calls chargeboard needs are implemented. Both base URLs can
//! be overridden so tests can point the client at a local mock server.

use chargeboard_core::error::{ChargeboardError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Base URL of the owner API (vehicle list, daily history)
pub const OWNER_API_BASE: &str = "https://owner-api.teslamotors.com";
/// Base URL of the ownership API (session history)
pub const OWNERSHIP_API_BASE: &str = "https://ownership.tesla.com";

const CHARGING_HISTORY_PATH: &str = "/mobile-app/charging/history";
const CHARGING_HISTORY_OPERATION: &str = "getChargingHistoryV2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A vehicle on the account
#[derive(Debug, Clone, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub id_s: Option<String>,
    pub vin: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Vehicle {
    /// Identifier used in owner API paths
    ///
    /// Prefers the string form, since the numeric id can exceed what some
    /// JSON producers represent exactly.
    pub fn api_id(&self) -> String {
        self.id_s.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct VehicleList {
    #[serde(default)]
    response: Vec<Vehicle>,
}

/// Authenticated Tesla API client
#[derive(Clone)]
pub struct TeslaClient {
    client: Client,
    token: String,
    owner_base: String,
    ownership_base: String,
}

impl TeslaClient {
    /// Create a client for the production endpoints
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ChargeboardError::Auth("access token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChargeboardError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            owner_base: OWNER_API_BASE.to_string(),
            ownership_base: OWNERSHIP_API_BASE.to_string(),
        })
    }

    /// Point the client at different API hosts
    pub fn with_base_urls(
        mut self,
        owner_base: impl Into<String>,
        ownership_base: impl Into<String>,
    ) -> Self {
        self.owner_base = owner_base.into().trim_end_matches('/').to_string();
        self.ownership_base = ownership_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_json(&self, endpoint: &str, request: RequestBuilder) -> Result<Value> {
        debug!("Requesting {}", endpoint);
        let response = request.bearer_auth(&self.token).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<Value>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChargeboardError::Auth(
                format!("{endpoint} rejected the access token"),
            )),
            status => Err(ChargeboardError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    /// List the vehicles on the account
    pub async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        let url = format!("{}/api/1/vehicles", self.owner_base);
        let body = self.send_json("vehicles", self.client.get(&url)).await?;
        let list: VehicleList = serde_json::from_value(body)?;
        Ok(list.response)
    }

    /// The first vehicle on the account
    pub async fn first_vehicle(&self) -> Result<Vehicle> {
        self.vehicles()
            .await?
            .into_iter()
            .next()
            .ok_or(ChargeboardError::NoVehicle)
    }

    /// Daily charging history of a vehicle, with the `response` envelope removed
    pub async fn charge_history(&self, vehicle: &Vehicle) -> Result<Value> {
        let url = format!(
            "{}/api/1/vehicles/{}/charge_history",
            self.owner_base,
            vehicle.api_id()
        );
        let mut body = self
            .send_json("charge_history", self.client.post(&url))
            .await?;

        Ok(match body.get_mut("response") {
            Some(inner) => inner.take(),
            None => body,
        })
    }

    /// One page of the session history, or the full list when `page` is `None`
    ///
    /// `page` is `(offset, page_size)`.
    pub async fn charging_history(
        &self,
        vin: &str,
        page: Option<(usize, usize)>,
    ) -> Result<Vec<Value>> {
        let url = format!("{}{}", self.ownership_base, CHARGING_HISTORY_PATH);
        let mut query: Vec<(&str, String)> = vec![
            ("vin", vin.to_string()),
            ("deviceLanguage", "en".to_string()),
            ("deviceCountry", "US".to_string()),
            ("operationName", CHARGING_HISTORY_OPERATION.to_string()),
        ];
        if let Some((offset, page_size)) = page {
            query.push(("offset", offset.to_string()));
            query.push(("pageSize", page_size.to_string()));
        }

        let body = self
            .send_json("charging/history", self.client.get(&url).query(&query))
            .await?;
        Ok(extract_session_list(body))
    }
}

/// Pull the session list out of whichever envelope the API used
///
/// Seen shapes: a bare list, `{data: [...]}` and `{data: {data: [...]}}`.
pub fn extract_session_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => extract_session_list(inner),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> TeslaClient {
        TeslaClient::new("test_token")
            .unwrap()
            .with_base_urls(server.url(), server.url())
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            TeslaClient::new("  "),
            Err(ChargeboardError::Auth(_))
        ));
    }

    #[test]
    fn test_extract_session_list_shapes() {
        let sessions = json!([{ "a": 1 }, { "a": 2 }]);
        assert_eq!(extract_session_list(sessions.clone()).len(), 2);
        assert_eq!(
            extract_session_list(json!({ "data": sessions.clone() })).len(),
            2
        );
        assert_eq!(
            extract_session_list(json!({ "data": { "data": sessions } })).len(),
            2
        );
        assert!(extract_session_list(json!({ "other": [] })).is_empty());
        assert!(extract_session_list(json!(null)).is_empty());
    }

    #[tokio::test]
    async fn test_first_vehicle() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/1/vehicles")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "response": [
                        { "id": 1492931337, "id_s": "1492931337", "vin": "5YJ3E1EA7KF000001" },
                        { "id": 7, "vin": "5YJ3E1EA7KF000002" }
                    ],
                    "count": 2
                })
                .to_string(),
            )
            .create_async()
            .await;

        let vehicle = client_for(&server).first_vehicle().await.unwrap();
        assert_eq!(vehicle.vin, "5YJ3E1EA7KF000001");
        assert_eq!(vehicle.api_id(), "1492931337");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_vehicles() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/1/vehicles")
            .with_status(200)
            .with_body(json!({ "response": [], "count": 0 }).to_string())
            .create_async()
            .await;

        let result = client_for(&server).first_vehicle().await;
        assert!(matches!(result, Err(ChargeboardError::NoVehicle)));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/1/vehicles")
            .with_status(401)
            .create_async()
            .await;

        let result = client_for(&server).vehicles().await;
        assert!(matches!(result, Err(ChargeboardError::Auth(_))));
    }

    #[tokio::test]
    async fn test_charge_history_unwraps_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/1/vehicles/42/charge_history")
            .with_status(200)
            .with_body(
                json!({ "response": { "charging_history_graph": { "data_points": [] } } })
                    .to_string(),
            )
            .create_async()
            .await;

        let vehicle = Vehicle {
            id: 42,
            id_s: None,
            vin: "VIN".to_string(),
            display_name: None,
        };
        let body = client_for(&server).charge_history(&vehicle).await.unwrap();
        assert!(body.get("charging_history_graph").is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_charging_history_page_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/mobile-app/charging/history")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vin".into(), "VIN123".into()),
                Matcher::UrlEncoded("operationName".into(), "getChargingHistoryV2".into()),
                Matcher::UrlEncoded("offset".into(), "50".into()),
                Matcher::UrlEncoded("pageSize".into(), "50".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "data": [{ "chargeStartDateTime": "x" }] }).to_string())
            .create_async()
            .await;

        let page = client_for(&server)
            .charging_history("VIN123", Some((50, 50)))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_charging_history_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/mobile-app/charging/history")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = client_for(&server).charging_history("VIN", None).await;
        assert!(matches!(
            result,
            Err(ChargeboardError::Api { status: 503, .. })
        ));
    }
}
