//! High-level service facade combining the classifier and the geo store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::aggregate::{ValidationWarning, aggregate, validate_records};
use crate::busy::{BusyState, BusyTracker};
use crate::gate::{CLASSIFY_PROMPT, Classification, classify_text};
use crate::model::{DEFAULT_RADIUS_KM, GeoPoint, RecyclingPoint};
use crate::ports::{ClassifierPort, GeoStorePort, ImageData, PortError};

#[derive(Debug, Clone)]
/// Result of one discovery cycle: the joined points plus any boundary
/// warnings about values the store should not have sent.
pub struct Discovery {
    /// Aggregated points in store order.
    pub points: Vec<RecyclingPoint>,
    /// Non-fatal anomalies found while validating the raw results.
    pub warnings: Vec<ValidationWarning>,
}

/// Public entry point for classification and nearby-point discovery.
pub struct DiscoveryService {
    geo: Arc<dyn GeoStorePort>,
    classifier: Arc<dyn ClassifierPort>,
    busy: BusyTracker,
}

impl DiscoveryService {
    /// Create a new service bound to the provided ports.
    #[must_use]
    pub fn new(geo: Arc<dyn GeoStorePort>, classifier: Arc<dyn ClassifierPort>) -> Self {
        Self {
            geo,
            classifier,
            busy: BusyTracker::new(),
        }
    }

    /// Observable busy state covering all outstanding operations.
    #[must_use]
    pub fn busy_state(&self) -> BusyState {
        self.busy.state()
    }

    /// Ask the oracle about an image and interpret its answer.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Input`] for an empty image and propagates oracle
    /// failures. The busy count drops on every exit path.
    pub async fn classify_image(&self, image: &ImageData) -> Result<Classification, PortError> {
        let _guard = self.busy.start();

        if image.is_empty() {
            return Err(PortError::Input(String::from("image contains no data")));
        }

        debug!(bytes = image.bytes.len(), mime = %image.mime_type, "submitting image to classifier");
        let text = self.classifier.classify(image, CLASSIFY_PROMPT).await?;
        Ok(classify_text(text))
    }

    /// Run one discovery cycle around `origin`.
    ///
    /// Both nearby queries are dispatched concurrently; the join only runs
    /// once both succeed. Results are validated at this boundary, then
    /// aggregated in store order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::GeoQuery`] when either query fails; no partial
    /// aggregation happens in that case.
    pub async fn discover(&self, origin: GeoPoint) -> Result<Discovery, PortError> {
        let _guard = self.busy.start();

        debug!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            radius_km = DEFAULT_RADIUS_KM,
            "dispatching nearby queries"
        );

        let (points, machines) = tokio::try_join!(
            self.geo.nearby_points(origin, DEFAULT_RADIUS_KM),
            self.geo.nearby_machines(origin, DEFAULT_RADIUS_KM),
        )
        .map_err(|err| PortError::GeoQuery(err.to_string()))?;

        debug!(
            points = points.len(),
            machines = machines.len(),
            "nearby queries resolved"
        );

        let warnings = validate_records(&points, &machines);
        for warning in &warnings {
            warn!(%warning, "store returned an out-of-range value");
        }

        Ok(Discovery {
            points: aggregate(points, machines),
            warnings,
        })
    }
}
