use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use pfandli_core::{
    gate::Classification,
    model::{GeoPoint, RecyclingPoint},
    ports::LocationPort,
    reconcile::MapView,
    service::{Discovery, DiscoveryService},
};

/// How long a reported error stays in the status bar.
const ERROR_BANNER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Screen {
    Capture,
    Results,
}

pub(crate) struct App {
    pub service: Arc<DiscoveryService>,
    pub location: Arc<dyn LocationPort>,

    pub screen: Screen,
    pub image_path_input: String,

    pub classification: Option<Classification>,
    pub points: Vec<RecyclingPoint>,
    pub warning_count: usize,
    pub map: MapView,
    pub list_index: usize,
    pub last_refresh: Option<DateTime<Local>>,

    pub is_loading: bool,
    pub error_message: Option<String>,
    error_since: Option<Instant>,
}

impl App {
    pub(crate) fn new(service: Arc<DiscoveryService>, location: Arc<dyn LocationPort>) -> Self {
        Self {
            service,
            location,
            screen: Screen::Capture,
            image_path_input: String::new(),
            classification: None,
            points: Vec::new(),
            warning_count: 0,
            map: MapView::new(),
            list_index: 0,
            last_refresh: None,
            is_loading: false,
            error_message: None,
            error_since: None,
        }
    }

    /// Surface an error in the status bar; it auto-dismisses after a while.
    pub(crate) fn report_error<M: Into<String>>(&mut self, message: M) {
        self.error_message = Some(message.into());
        self.error_since = Some(Instant::now());
    }

    /// Called once per event-loop turn to expire a stale error banner.
    pub(crate) fn tick(&mut self) {
        if let Some(since) = self.error_since
            && since.elapsed() >= ERROR_BANNER
        {
            self.error_message = None;
            self.error_since = None;
        }
    }

    /// Install the results of a completed discovery cycle.
    pub(crate) fn apply_discovery(
        &mut self,
        user: GeoPoint,
        discovery: Discovery,
    ) {
        self.warning_count = discovery.warnings.len();
        self.points = discovery.points;
        self.map.refresh(user, &self.points);
        if self.list_index >= self.points.len() {
            self.list_index = 0;
        }
        self.last_refresh = Some(Local::now());
    }

    /// Drop rendered results after a failed cycle, keeping the user marker.
    pub(crate) fn clear_discovery(&mut self, user: Option<GeoPoint>) {
        self.points.clear();
        self.warning_count = 0;
        self.list_index = 0;
        if let Some(user) = user {
            self.map.refresh(user, &[]);
        }
    }

    pub(crate) fn selected_point(&self) -> Option<&RecyclingPoint> {
        self.points.get(self.list_index)
    }
}
