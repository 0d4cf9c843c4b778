//! Keyed reconciliation of map markers against the latest aggregated data.

use std::collections::HashMap;

use crate::model::{GeoPoint, PointId, RecyclingPoint};
use crate::present::point_popup;

/// Popup text for the user-location marker.
const USER_POPUP: &str = "Your location";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Identity of a marker across refreshes.
pub enum MarkerKey {
    /// The single user-location marker.
    User,
    /// Marker for a recycling point.
    Point(PointId),
}

#[derive(Debug, Clone, PartialEq)]
/// A placed marker with its popup content.
pub struct Marker {
    /// Stable identity used for reconciliation.
    pub key: MarkerKey,
    /// Where the marker sits.
    pub position: GeoPoint,
    /// Popup text shown when the marker is opened.
    pub popup: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
/// Changes a refresh applied to the marker set, keyed by identity.
///
/// Surfaces that track per-marker handles only need to touch these keys
/// instead of rebuilding every marker.
pub struct MarkerDelta {
    /// Keys placed for the first time.
    pub added: Vec<MarkerKey>,
    /// Keys no longer present after the refresh.
    pub removed: Vec<MarkerKey>,
    /// Keys whose position or popup changed.
    pub updated: Vec<MarkerKey>,
}

impl MarkerDelta {
    /// Whether the refresh changed anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug)]
enum ViewState {
    Uninitialized,
    Ready {
        center: GeoPoint,
        markers: Vec<Marker>,
    },
}

#[derive(Debug)]
/// State of the rendered map: either no map exists yet, or a map centered on
/// the first location fix with a keyed marker set.
///
/// After any refresh the marker set holds exactly one user marker plus one
/// marker per aggregated point, ordered user-first then aggregate order; no
/// key from a prior cycle survives unless the new data still contains it.
pub struct MapView {
    state: ViewState,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    /// Create a view with no map instance yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewState::Uninitialized,
        }
    }

    /// Whether a map instance exists.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ViewState::Ready { .. })
    }

    /// Center of the map, once initialized.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        match &self.state {
            ViewState::Uninitialized => None,
            ViewState::Ready { center, .. } => Some(*center),
        }
    }

    /// Currently placed markers, user marker first.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        match &self.state {
            ViewState::Uninitialized => &[],
            ViewState::Ready { markers, .. } => markers,
        }
    }

    /// Bring the rendered state in line with a fresh aggregated list.
    ///
    /// The first call initializes the map centered on `user`; later calls
    /// reconcile by marker key and report the delta, so unchanged markers
    /// carry over untouched.
    pub fn refresh(&mut self, user: GeoPoint, points: &[RecyclingPoint]) -> MarkerDelta {
        let mut next = Vec::with_capacity(points.len() + 1);
        next.push(Marker {
            key: MarkerKey::User,
            position: user,
            popup: USER_POPUP.to_owned(),
        });
        for point in points {
            next.push(Marker {
                key: MarkerKey::Point(point.id.clone()),
                position: point.position(),
                popup: point_popup(point),
            });
        }

        let mut previous: HashMap<MarkerKey, Marker> = match &mut self.state {
            ViewState::Uninitialized => HashMap::new(),
            ViewState::Ready { markers, .. } => markers
                .drain(..)
                .map(|marker| (marker.key.clone(), marker))
                .collect(),
        };

        let mut delta = MarkerDelta::default();
        for marker in &next {
            match previous.remove(&marker.key) {
                None => delta.added.push(marker.key.clone()),
                Some(old) if old != *marker => delta.updated.push(marker.key.clone()),
                Some(_) => {}
            }
        }
        delta.removed.extend(previous.into_keys());

        self.state = ViewState::Ready {
            center: user,
            markers: next,
        };

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::{MapView, MarkerKey};
    use crate::model::{PointId, RecyclingPoint};

    fn point(id: &str, latitude: f64) -> RecyclingPoint {
        RecyclingPoint {
            id: PointId(id.to_owned()),
            name: format!("Point {id}"),
            kind: String::from("container park"),
            latitude,
            longitude: 13.4,
            operating_hours: String::from("24/7"),
            phone: String::from("555-0100"),
            distance_km: 1.0,
            machines: Vec::new(),
        }
    }

    fn user() -> crate::model::GeoPoint {
        crate::model::GeoPoint {
            latitude: 52.52,
            longitude: 13.40,
        }
    }

    #[test]
    fn first_refresh_initializes_and_places_all_markers() {
        let mut view = MapView::new();
        assert!(!view.is_ready(), "no map before the first fix");
        assert!(view.markers().is_empty(), "nothing rendered yet");

        let points = [point("A", 52.0), point("B", 53.0)];
        let delta = view.refresh(user(), &points);

        assert!(view.is_ready(), "first fix creates the map");
        assert_eq!(view.markers().len(), 3, "user marker plus one per point");
        assert_eq!(delta.added.len(), 3, "everything is new on the first cycle");
        assert!(delta.removed.is_empty(), "nothing to remove initially");
        assert_eq!(
            view.markers()[0].key,
            MarkerKey::User,
            "user marker leads the order"
        );
    }

    #[test]
    fn refresh_removes_stale_and_keeps_order() {
        let mut view = MapView::new();
        view.refresh(user(), &[point("A", 52.0), point("B", 53.0)]);

        let delta = view.refresh(user(), &[point("C", 54.0), point("A", 52.0)]);

        let keys: Vec<&MarkerKey> = view.markers().iter().map(|marker| &marker.key).collect();
        assert_eq!(view.markers().len(), 3, "count is points plus user");
        assert_eq!(
            keys,
            [
                &MarkerKey::User,
                &MarkerKey::Point(PointId(String::from("C"))),
                &MarkerKey::Point(PointId(String::from("A"))),
            ],
            "marker order mirrors the aggregated order"
        );

        assert_eq!(
            delta.added,
            vec![MarkerKey::Point(PointId(String::from("C")))],
            "only the new point is added"
        );
        assert_eq!(
            delta.removed,
            vec![MarkerKey::Point(PointId(String::from("B")))],
            "the dropped point is removed"
        );
        assert!(delta.updated.is_empty(), "unchanged markers stay untouched");
    }

    #[test]
    fn changed_marker_is_reported_as_updated() {
        let mut view = MapView::new();
        view.refresh(user(), &[point("A", 52.0)]);

        let mut moved = point("A", 52.5);
        moved.operating_hours = String::from("08:00-20:00");
        let delta = view.refresh(user(), &[moved]);

        assert_eq!(
            delta.updated,
            vec![MarkerKey::Point(PointId(String::from("A")))],
            "changed popup/position counts as update"
        );
        assert!(delta.added.is_empty(), "no additions expected");
        assert!(delta.removed.is_empty(), "no removals expected");
    }

    #[test]
    fn empty_discovery_leaves_only_user_marker() {
        let mut view = MapView::new();
        view.refresh(user(), &[point("A", 52.0)]);

        let delta = view.refresh(user(), &[]);

        assert_eq!(view.markers().len(), 1, "only the user marker remains");
        assert_eq!(delta.removed.len(), 1, "stale point marker is removed");
    }
}
