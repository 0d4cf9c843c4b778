//! Joining the two query results into denormalized [`RecyclingPoint`]s.

use std::collections::HashMap;
use std::fmt;

use crate::model::{Machine, MachineId, PointId, RawMachineRecord, RawPointRecord, RecyclingPoint};

/// Join point records with the machines installed at them.
///
/// Output order matches the input `points` order, and each point's machines
/// keep the relative order the store returned them in. Machines referencing a
/// `location_id` with no matching point are dropped. A point without machines
/// gets an empty vector.
#[must_use]
pub fn aggregate(
    points: Vec<RawPointRecord>,
    machines: Vec<RawMachineRecord>,
) -> Vec<RecyclingPoint> {
    // Single pass index keyed by location; insertion order per key is kept.
    let mut by_location: HashMap<PointId, Vec<Machine>> = HashMap::new();
    for record in machines {
        by_location
            .entry(record.location_id.clone())
            .or_default()
            .push(Machine::from(record));
    }

    points
        .into_iter()
        .map(|point| {
            // Lookup, not removal: a duplicated point id gets its machines
            // on every occurrence.
            let machines = by_location.get(&point.id).cloned().unwrap_or_default();
            RecyclingPoint {
                id: point.id,
                name: point.name,
                kind: point.kind,
                latitude: point.latitude,
                longitude: point.longitude,
                operating_hours: point.operating_hours,
                phone: point.phone,
                distance_km: point.distance_km,
                machines,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
/// Anomalous value spotted while checking query results at the join boundary.
///
/// Warnings never block a discovery cycle; the offending value is still
/// rendered as reported.
pub enum ValidationWarning {
    /// Machine capacity outside the nominal 0..=100 percent range.
    CapacityOutOfRange {
        /// Machine carrying the value.
        machine: MachineId,
        /// The reported percentage.
        capacity_pct: f64,
    },
    /// Store reported a negative distance for a point.
    NegativeDistance {
        /// Point carrying the value.
        point: PointId,
        /// The reported distance in kilometres.
        distance_km: f64,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::CapacityOutOfRange {
                machine,
                capacity_pct,
            } => write!(
                formatter,
                "machine {} reports capacity {capacity_pct}% outside 0-100%",
                machine.0
            ),
            ValidationWarning::NegativeDistance { point, distance_km } => write!(
                formatter,
                "point {} reports negative distance {distance_km} km",
                point.0
            ),
        }
    }
}

/// Check raw query results for out-of-range values the store promised not to
/// send.
#[must_use]
pub fn validate_records(
    points: &[RawPointRecord],
    machines: &[RawMachineRecord],
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for point in points {
        if point.distance_km < 0.0 {
            warnings.push(ValidationWarning::NegativeDistance {
                point: point.id.clone(),
                distance_km: point.distance_km,
            });
        }
    }

    for machine in machines {
        if !(0.0..=100.0).contains(&machine.capacity_pct) {
            warnings.push(ValidationWarning::CapacityOutOfRange {
                machine: machine.machine_id.clone(),
                capacity_pct: machine.capacity_pct,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::{ValidationWarning, aggregate, validate_records};
    use crate::model::{
        MachineId, MachineStatus, PointId, RawMachineRecord, RawPointRecord,
    };

    fn point(id: &str, name: &str, distance_km: f64) -> RawPointRecord {
        RawPointRecord {
            id: PointId(id.to_owned()),
            name: name.to_owned(),
            kind: String::from("container park"),
            latitude: 52.52,
            longitude: 13.40,
            operating_hours: String::from("08:00-20:00"),
            phone: String::from("+49 30 1234"),
            distance_km,
        }
    }

    fn machine(location: &str, id: &str, status: MachineStatus, capacity: f64) -> RawMachineRecord {
        RawMachineRecord {
            location_id: PointId(location.to_owned()),
            machine_id: MachineId(id.to_owned()),
            machine_kind: String::from("bottle deposit"),
            status,
            capacity_pct: capacity,
        }
    }

    #[test]
    fn output_matches_point_order_and_machine_order() {
        let points = vec![point("B", "Second", 2.0), point("A", "First", 1.0)];
        let machines = vec![
            machine("A", "M2", MachineStatus::Operational, 10.0),
            machine("B", "M3", MachineStatus::Offline, 95.0),
            machine("A", "M1", MachineStatus::Maintenance, 50.0),
        ];

        let result = aggregate(points, machines);

        assert_eq!(result.len(), 2, "one output per input point");
        assert_eq!(result[0].id, PointId(String::from("B")));
        assert_eq!(result[1].id, PointId(String::from("A")));

        // Machines keep store order, not sorted by id.
        let ids: Vec<&str> = result[1]
            .machines
            .iter()
            .map(|machine| machine.id.0.as_str())
            .collect();
        assert_eq!(ids, ["M2", "M1"], "machine order follows the query result");
    }

    #[test]
    fn point_without_machines_gets_empty_vec() {
        let result = aggregate(vec![point("A", "Lonely", 0.5)], Vec::new());
        assert_eq!(result.len(), 1, "point survives without machines");
        assert!(result[0].machines.is_empty(), "machines default to empty");
    }

    #[test]
    fn duplicated_point_id_gets_machines_on_every_occurrence() {
        let points = vec![point("A", "First copy", 1.0), point("A", "Second copy", 1.0)];
        let machines = vec![machine("A", "M1", MachineStatus::Operational, 20.0)];

        let result = aggregate(points, machines);

        assert_eq!(result.len(), 2, "duplicates are not collapsed");
        assert_eq!(result[0].machines.len(), 1, "first occurrence is joined");
        assert_eq!(result[1].machines.len(), 1, "second occurrence is joined too");
    }

    #[test]
    fn orphan_machines_are_dropped() {
        let points = vec![point("A", "Known", 0.5)];
        let machines = vec![
            machine("A", "M1", MachineStatus::Operational, 20.0),
            machine("GONE", "M2", MachineStatus::Operational, 20.0),
        ];

        let result = aggregate(points, machines);

        assert_eq!(result.len(), 1, "orphans never add output points");
        assert_eq!(result[0].machines.len(), 1, "orphan machine is not joined");
        assert_eq!(result[0].machines[0].id, MachineId(String::from("M1")));
    }

    #[test]
    fn end_to_end_park_street_scenario() {
        let points = vec![point("A", "Park St Bin", 1.2)];
        let machines = vec![machine("A", "M1", MachineStatus::Offline, 90.0)];

        let result = aggregate(points, machines);

        assert_eq!(result.len(), 1, "single joined point expected");
        assert_eq!(result[0].name, "Park St Bin");
        assert_eq!(result[0].machines.len(), 1, "one machine joined");
        assert_eq!(result[0].machines[0].status, MachineStatus::Offline);
        assert!((result[0].machines[0].capacity_pct - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_flags_out_of_range_values() {
        let points = vec![point("A", "Odd", -0.3)];
        let machines = vec![
            machine("A", "M1", MachineStatus::Operational, 120.0),
            machine("A", "M2", MachineStatus::Operational, 100.0),
        ];

        let warnings = validate_records(&points, &machines);

        assert_eq!(warnings.len(), 2, "boundary values stay unflagged");
        assert!(matches!(
            warnings[0],
            ValidationWarning::NegativeDistance { .. }
        ));
        assert!(matches!(
            warnings[1],
            ValidationWarning::CapacityOutOfRange { .. }
        ));
    }
}
