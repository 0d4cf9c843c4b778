//! Traits describing the external collaborators and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{GeoPoint, RawMachineRecord, RawPointRecord};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the external collaborators.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The classification oracle call failed.
    #[error("Classification failed: {0}")]
    Classification(String),
    /// One of the geospatial queries failed; the join never ran.
    #[error("Geo query failed: {0}")]
    GeoQuery(String),
    /// The location capability is unavailable or was denied.
    #[error("Location unavailable: {0}")]
    Location(String),
    /// The map surface could not be initialized.
    #[error("Map failed to initialize: {0}")]
    MapInit(String),
    /// The supplied image is missing or malformed.
    #[error("Invalid image: {0}")]
    Input(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
/// An encoded image held in memory, ready to send to the oracle.
pub struct ImageData {
    /// Raw encoded bytes (JPEG, PNG, ...).
    pub bytes: Vec<u8>,
    /// MIME type matching the encoding.
    pub mime_type: String,
}

impl ImageData {
    /// Wrap encoded image bytes with their MIME type.
    #[must_use]
    pub fn new<M: Into<String>>(bytes: Vec<u8>, mime_type: M) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Check whether there is any image content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
/// Store backend answering the two nearby-entity queries.
pub trait GeoStorePort: Send + Sync {
    /// Fetch recycling points within `radius_km` of `origin`.
    ///
    /// The store pre-sorts results (typically by distance) and precomputes
    /// `distance_km`; this client does not re-sort.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the remote query fails.
    async fn nearby_points(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RawPointRecord>, PortError>;

    /// Fetch machine records within `radius_km` of `origin`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the remote query fails.
    async fn nearby_machines(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<RawMachineRecord>, PortError>;
}

#[async_trait]
/// Classification oracle turning an image plus instruction into free-form text.
///
/// The response carries no schema guarantee beyond being natural-language
/// text; interpreting it is the gate's job, not the provider's.
pub trait ClassifierPort: Send + Sync {
    /// Submit an image and instruction prompt, returning the oracle's text.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the oracle call fails or yields no text.
    async fn classify(&self, image: &ImageData, prompt: &str) -> Result<String, PortError>;
}

/// Device capability producing the user's current coordinate.
pub trait LocationPort: Send + Sync {
    /// Resolve the current location.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Location`] when no fix is available.
    fn locate(&self) -> Result<GeoPoint, PortError>;
}
