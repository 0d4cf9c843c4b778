//! Pure mappings from domain state to display primitives.
//!
//! Nothing in this module does I/O or validation; out-of-range values are
//! rendered as reported (range checks happen at the query boundary).

use std::fmt::Write as _;

use crate::model::{Machine, MachineStatus, RecyclingPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Color swatch representing a machine status.
pub enum StatusSwatch {
    /// Machine is operational.
    Green,
    /// Machine is under maintenance.
    Amber,
    /// Machine is offline.
    Red,
    /// Status unknown to this client.
    Neutral,
}

/// Map a machine status to its swatch.
///
/// Total over all inputs: unrecognized statuses degrade to
/// [`StatusSwatch::Neutral`] instead of erroring.
#[must_use]
pub fn status_swatch(status: &MachineStatus) -> StatusSwatch {
    match status {
        MachineStatus::Operational => StatusSwatch::Green,
        MachineStatus::Maintenance => StatusSwatch::Amber,
        MachineStatus::Offline => StatusSwatch::Red,
        MachineStatus::Other(_) => StatusSwatch::Neutral,
    }
}

/// One-line summary of a machine: kind, status, and fill level.
#[must_use]
pub fn machine_summary(machine: &Machine) -> String {
    format!(
        "{}: {} ({}% full)",
        machine.kind, machine.status, machine.capacity_pct
    )
}

/// Distance text shown in the list view.
#[must_use]
pub fn distance_label(distance_km: f64) -> String {
    format!("{distance_km} km")
}

/// Link opening the point in an external maps application.
#[must_use]
pub fn directions_url(point: &RecyclingPoint) -> String {
    format!(
        "https://maps.google.com/?q={},{}",
        point.latitude, point.longitude
    )
}

/// Multi-line popup text for a point's map marker.
#[must_use]
pub fn point_popup(point: &RecyclingPoint) -> String {
    let mut text = format!(
        "{}\n{}\nOperating hours: {}\nPhone: {}\nRecycling machines:",
        point.name, point.kind, point.operating_hours, point.phone
    );

    if point.machines.is_empty() {
        text.push_str("\n  No machines available");
    } else {
        for machine in &point.machines {
            let _ = write!(text, "\n  {}", machine_summary(machine));
        }
    }

    text
}
