//! Terminal UI for pfandli: classify an image, then browse nearby recycling
//! points with live machine status.

mod app;
mod input;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::{env, io, sync::Arc, time::Duration as StdDuration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use pfandli_core::{
    model::GeoPoint,
    ports::{ImageData, LocationPort, PortError},
    service::DiscoveryService,
};
use pfandli_provider_gemini::GeminiClassifier;
use pfandli_provider_postgrest::PostgrestGeoStore;

use crate::app::{App, Screen};
use crate::input::Action;

struct Config {
    store_url: String,
    store_key: String,
    gemini_key: String,
    location: Option<GeoPoint>,
}

impl Config {
    fn from_env() -> Result<Self> {
        let store_url = env::var("PFANDLI_STORE_URL").context("PFANDLI_STORE_URL is not set")?;
        let store_key = env::var("PFANDLI_STORE_KEY").context("PFANDLI_STORE_KEY is not set")?;
        let gemini_key = env::var("PFANDLI_GEMINI_KEY").context("PFANDLI_GEMINI_KEY is not set")?;

        let location = match (env::var("PFANDLI_LAT"), env::var("PFANDLI_LNG")) {
            (Ok(lat), Ok(lng)) => Some(GeoPoint {
                latitude: lat.parse().context("PFANDLI_LAT is not a number")?,
                longitude: lng.parse().context("PFANDLI_LNG is not a number")?,
            }),
            _ => None,
        };

        Ok(Self {
            store_url,
            store_key,
            gemini_key,
            location,
        })
    }
}

/// Stand-in for a device geolocation capability: a coordinate from the
/// environment, or a location error when none is configured.
struct FixedLocation {
    point: Option<GeoPoint>,
}

impl LocationPort for FixedLocation {
    fn locate(&self) -> Result<GeoPoint, PortError> {
        self.point.ok_or_else(|| {
            PortError::Location(String::from(
                "set PFANDLI_LAT and PFANDLI_LNG to your coordinate",
            ))
        })
    }
}

/// Log to pfandli.log when `PFANDLI_LOG` is set; the alternate screen makes
/// stderr useless while the UI runs.
fn init_tracing() -> Result<()> {
    let Ok(filter) = env::var("PFANDLI_LOG") else {
        return Ok(());
    };
    let file = File::create("pfandli.log").context("failed to create pfandli.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let config = Config::from_env()?;

    // HTTP + service setup
    let client = Client::builder().user_agent("pfandli/0.1").build()?;

    let geo = Arc::new(PostgrestGeoStore::new(
        client.clone(),
        config.store_url,
        config.store_key,
    ));
    let classifier = Arc::new(GeminiClassifier::new(client, config.gemini_key));
    let service = Arc::new(DiscoveryService::new(geo, classifier));
    let location = Arc::new(FixedLocation {
        point: config.location,
    });

    // App state
    let app = App::new(service, location);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.tick();

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::ClassifyImage => {
                    let path = app.image_path_input.trim().to_owned();
                    if path.is_empty() {
                        app.report_error("Enter the path of an image file first");
                        continue;
                    }

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let image = match tokio::fs::read(&path).await {
                        Ok(bytes) => ImageData::new(bytes, mime_for_path(&path)),
                        Err(err) => {
                            app.is_loading = false;
                            app.report_error(format!("Could not read image: {err}"));
                            continue;
                        }
                    };

                    match app.service.classify_image(&image).await {
                        Ok(classification) => {
                            let recyclable = classification.recyclable;
                            app.classification = Some(classification);
                            app.screen = Screen::Results;

                            // Discovery only runs when the gate passes.
                            if recyclable {
                                refresh_locations(&mut app).await;
                            }
                        }
                        Err(err) => {
                            app.report_error(format!("Classification failed: {err}"));
                        }
                    }

                    app.is_loading = false;
                }
                Action::RefreshLocations => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    refresh_locations(&mut app).await;

                    app.is_loading = false;
                }
            }
        }
    }

    Ok(())
}

/// One discovery cycle: locate, query, and reconcile the rendered state.
async fn refresh_locations(app: &mut App) {
    let user = match app.location.locate() {
        Ok(user) => user,
        // No fix: the map stays uninitialized and nothing is rendered.
        Err(err) => {
            app.report_error(err.to_string());
            return;
        }
    };

    match app.service.discover(user).await {
        Ok(discovery) => app.apply_discovery(user, discovery),
        Err(err) => {
            // Fail soft: an empty list, never partial markers.
            app.clear_discovery(app.map.is_ready().then_some(user));
            app.report_error(format!("Failed to fetch recycling points: {err}"));
        }
    }
}

fn mime_for_path(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().map(str::to_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
