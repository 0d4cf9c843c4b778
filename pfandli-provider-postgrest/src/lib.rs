//! Geo store provider speaking to PostgREST-style RPC functions.
//!
//! The store exposes two stored procedures, `nearby_points` and
//! `nearby_machines`, both taking the user coordinate and a radius. Distance
//! computation and sorting happen server-side; this client only maps rows
//! into core records.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pfandli_core::{
    model::{GeoPoint, MachineId, MachineStatus, PointId, RawMachineRecord, RawPointRecord},
    ports::{GeoStorePort, PortError},
};

const POINTS_RPC: &str = "nearby_points";
const MACHINES_RPC: &str = "nearby_machines";

/// Parameters shared by both stored procedures.
#[derive(Debug, Serialize)]
struct RpcParams {
    user_lat: f64,
    user_lng: f64,
    radius_km: f64,
}

/// Row returned by `nearby_points`.
#[derive(Debug, Deserialize)]
struct PointRow {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    operating_hours: String,
    #[serde(default)]
    phone: String,
    distance: f64,
}

impl From<PointRow> for RawPointRecord {
    fn from(row: PointRow) -> Self {
        RawPointRecord {
            id: PointId(row.id),
            name: row.name,
            kind: row.kind,
            latitude: row.latitude,
            longitude: row.longitude,
            operating_hours: row.operating_hours,
            phone: row.phone,
            distance_km: row.distance,
        }
    }
}

/// Row returned by `nearby_machines`.
#[derive(Debug, Deserialize)]
struct MachineRow {
    location_id: String,
    machine_id: String,
    machine_type: String,
    status: String,
    capacity: f64,
}

impl From<MachineRow> for RawMachineRecord {
    fn from(row: MachineRow) -> Self {
        RawMachineRecord {
            location_id: PointId(row.location_id),
            machine_id: MachineId(row.machine_id),
            machine_kind: row.machine_type,
            status: MachineStatus::from(row.status),
            capacity_pct: row.capacity,
        }
    }
}

/// Geo store implementation for a PostgREST endpoint.
pub struct PostgrestGeoStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestGeoStore {
    /// Create a new store client for the given endpoint and API key.
    #[must_use]
    pub fn new<U: Into<String>, K: Into<String>>(client: Client, base_url: U, api_key: K) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }

    fn rpc(&self, function: &str, params: &RpcParams) -> RequestBuilder {
        self.client
            .post(format!("{}/rest/v1/rpc/{function}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(params)
    }
}

#[async_trait]
impl GeoStorePort for PostgrestGeoStore {
    async fn nearby_points(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RawPointRecord>, PortError> {
        let params = RpcParams {
            user_lat: origin.latitude,
            user_lng: origin.longitude,
            radius_km,
        };

        let rows: Vec<PointRow> = fetch_json(self.rpc(POINTS_RPC, &params)).await?;
        debug!(rows = rows.len(), "nearby_points resolved");

        Ok(rows.into_iter().map(RawPointRecord::from).collect())
    }

    async fn nearby_machines(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RawMachineRecord>, PortError> {
        let params = RpcParams {
            user_lat: origin.latitude,
            user_lng: origin.longitude,
            radius_km,
        };

        let rows: Vec<MachineRow> = fetch_json(self.rpc(MACHINES_RPC, &params)).await?;
        debug!(rows = rows.len(), "nearby_machines resolved");

        Ok(rows.into_iter().map(RawMachineRecord::from).collect())
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use pfandli_core::{
        model::{GeoPoint, MachineStatus},
        ports::{GeoStorePort, PortError},
    };

    use super::PostgrestGeoStore;

    fn origin() -> GeoPoint {
        GeoPoint {
            latitude: 52.52,
            longitude: 13.40,
        }
    }

    fn store(server: &MockServer) -> PostgrestGeoStore {
        PostgrestGeoStore::new(Client::new(), server.uri(), "test-key")
    }

    #[tokio::test]
    async fn points_rpc_rows_map_to_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/nearby_points"))
            .and(header("apikey", "test-key"))
            .and(body_partial_json(json!({
                "user_lat": 52.52,
                "user_lng": 13.40,
                "radius_km": 5.0,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "A",
                    "name": "Park St Bin",
                    "type": "deposit station",
                    "latitude": 52.5,
                    "longitude": 13.4,
                    "operating_hours": "24/7",
                    "phone": "555-0100",
                    "distance": 1.2,
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = store(&server)
            .nearby_points(origin(), 5.0)
            .await
            .expect("rpc succeeds");

        assert_eq!(records.len(), 1, "one row maps to one record");
        assert_eq!(records[0].name, "Park St Bin");
        assert_eq!(records[0].kind, "deposit station");
        assert!((records[0].distance_km - 1.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn machine_rows_keep_unknown_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/nearby_machines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "location_id": "A",
                    "machine_id": "M1",
                    "machine_type": "bottle deposit",
                    "status": "offline",
                    "capacity": 90,
                },
                {
                    "location_id": "A",
                    "machine_id": "M2",
                    "machine_type": "can crusher",
                    "status": "vandalized",
                    "capacity": 10,
                }
            ])))
            .mount(&server)
            .await;

        let records = store(&server)
            .nearby_machines(origin(), 5.0)
            .await
            .expect("rpc succeeds");

        assert_eq!(records.len(), 2, "both rows map to records");
        assert_eq!(records[0].status, MachineStatus::Offline);
        assert_eq!(
            records[1].status,
            MachineStatus::Other(String::from("vandalized")),
            "unknown statuses degrade instead of failing"
        );
    }

    #[tokio::test]
    async fn server_error_surfaces_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/nearby_points"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = store(&server).nearby_points(origin(), 5.0).await;

        assert!(
            matches!(result, Err(PortError::Network(_))),
            "non-2xx responses become network errors"
        );
    }
}
