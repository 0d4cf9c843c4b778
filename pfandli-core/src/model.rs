//! Domain data structures for recycling points, machines, and coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Search radius used for every discovery cycle, in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A coordinate supplied by the location capability, one per discovery cycle.
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a recycling point; join key between the two geo queries.
pub struct PointId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a single recycling machine.
pub struct MachineId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Operational status reported for a machine.
///
/// The set is open-ended: statuses the store introduces later are carried
/// through as [`MachineStatus::Other`] instead of failing deserialization.
pub enum MachineStatus {
    /// Machine accepts containers.
    Operational,
    /// Machine is temporarily serviced.
    Maintenance,
    /// Machine is out of order.
    Offline,
    /// Any status string this client does not know about.
    Other(String),
}

impl From<String> for MachineStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "operational" => MachineStatus::Operational,
            "maintenance" => MachineStatus::Maintenance,
            "offline" => MachineStatus::Offline,
            _ => MachineStatus::Other(raw),
        }
    }
}

impl From<MachineStatus> for String {
    fn from(status: MachineStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MachineStatus::Operational => "operational",
            MachineStatus::Maintenance => "maintenance",
            MachineStatus::Offline => "offline",
            MachineStatus::Other(raw) => raw.as_str(),
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result row from the `nearby_points` query.
pub struct RawPointRecord {
    /// Unique identifier; machines reference it via `location_id`.
    pub id: PointId,
    /// Human-friendly name of the drop-off location.
    pub name: String,
    /// Kind of facility (container park, deposit station, ...).
    pub kind: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-form opening hours text.
    pub operating_hours: String,
    /// Contact phone number.
    pub phone: String,
    /// Distance from the query origin, precomputed by the store (km).
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result row from the `nearby_machines` query.
pub struct RawMachineRecord {
    /// Recycling point this machine is installed at.
    pub location_id: PointId,
    /// Unique machine identifier.
    pub machine_id: MachineId,
    /// Kind of machine (bottle deposit, can crusher, ...).
    pub machine_kind: String,
    /// Reported operational status.
    pub status: MachineStatus,
    /// Fill level as a percentage. Nominally 0..=100, but the value is
    /// displayed as reported; range checks only produce warnings.
    pub capacity_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A machine as shown to the user, with the join key dropped.
pub struct Machine {
    /// Unique machine identifier.
    pub id: MachineId,
    /// Kind of machine.
    pub kind: String,
    /// Reported operational status.
    pub status: MachineStatus,
    /// Fill level percentage as reported by the store.
    pub capacity_pct: f64,
}

impl From<RawMachineRecord> for Machine {
    fn from(record: RawMachineRecord) -> Self {
        Machine {
            id: record.machine_id,
            kind: record.machine_kind,
            status: record.status,
            capacity_pct: record.capacity_pct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Denormalized view of one physical location and the machines installed there.
///
/// `machines` holds exactly the machines whose `location_id` matched this
/// point's id, in the order the store returned them. A point without machines
/// carries an empty vector, never an absent field.
pub struct RecyclingPoint {
    /// Unique identifier.
    pub id: PointId,
    /// Human-friendly name.
    pub name: String,
    /// Kind of facility.
    pub kind: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-form opening hours text.
    pub operating_hours: String,
    /// Contact phone number.
    pub phone: String,
    /// Distance from the query origin (km).
    pub distance_km: f64,
    /// Machines installed at this point, in store order.
    pub machines: Vec<Machine>,
}

impl RecyclingPoint {
    /// Coordinate of this point.
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MachineStatus;

    #[test]
    fn known_statuses_parse_to_variants() {
        assert_eq!(
            MachineStatus::from(String::from("operational")),
            MachineStatus::Operational
        );
        assert_eq!(
            MachineStatus::from(String::from("maintenance")),
            MachineStatus::Maintenance
        );
        assert_eq!(
            MachineStatus::from(String::from("offline")),
            MachineStatus::Offline
        );
    }

    #[test]
    fn unknown_status_is_carried_through() {
        let status = MachineStatus::from(String::from("vandalized"));
        assert_eq!(status, MachineStatus::Other(String::from("vandalized")));
        assert_eq!(status.to_string(), "vandalized");
    }
}
