//! Application state management for the oaracle terminal UI.
//!
//! `App` wraps the core `AppContext` (workflow, map and collaborators) and
//! adds what only the terminal needs: overlay state, the status line and the
//! scroll position of the results panel.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use oaracle_core::api::{build_http_client, ApiClient, IpLocator, NominatimClient};
use oaracle_core::map::PanDirection;
use oaracle_core::{AppContext, Collaborators, Config, GeoPoint, MapView};

/// Number of lines to scroll the results panel on page up/down.
pub const PAGE_SCROLL_SIZE: u16 = 10;

/// Overall application state (overlays on top of the map)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Main application state container
pub struct App {
    pub config: Config,
    pub ctx: AppContext<MapView>,
    pub state: AppState,

    /// When the results on screen arrived
    pub fetched_at: Option<DateTime<Local>>,
    pub results_scroll: u16,
}

impl App {
    /// Create the app with the real HTTP collaborators.
    pub fn new(config: Config) -> Result<Self> {
        debug!(api = %config.api_base_url, geocoder = %config.geocoder_url, "App::new() starting");

        // One connection pool shared by all three clients
        let http = build_http_client(&config.user_agent)?;
        let collaborators = Collaborators {
            resolver: Arc::new(NominatimClient::with_client(http.clone(), &config)),
            conditions: Arc::new(ApiClient::with_client(http.clone(), &config)),
            locator: Arc::new(IpLocator::with_client(http, &config)),
        };

        Ok(Self::with_collaborators(config, collaborators))
    }

    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Self {
        let map = MapView::initialize(config.map_center, config.map_zoom);
        Self {
            ctx: AppContext::new(map, collaborators),
            config,
            state: AppState::Normal,
            fetched_at: None,
            results_scroll: 0,
        }
    }

    // =========================================================================
    // Map interaction
    // =========================================================================

    /// Translate a mouse click at absolute terminal coordinates. Clicks
    /// outside the map area are ignored.
    pub fn click(&mut self, map_area: Rect, column: u16, row: u16) {
        if column < map_area.x || row < map_area.y {
            return;
        }
        let col = column - map_area.x;
        let row = row - map_area.y;
        if let Some(point) = self
            .ctx
            .map
            .point_at(map_area.width, map_area.height, col, row)
        {
            self.select(point);
        }
    }

    /// Select whatever is under the crosshair.
    pub fn select_center(&mut self) {
        let center = self.ctx.map.center();
        self.select(center);
    }

    pub fn select(&mut self, point: GeoPoint) {
        info!(lat = point.latitude, lng = point.longitude, "Map clicked");
        self.ctx.select(point);
    }

    pub fn pan(&mut self, direction: PanDirection) {
        self.ctx.map.pan(direction);
    }

    pub fn zoom_in(&mut self) {
        self.ctx.map.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.ctx.map.zoom_out();
    }

    // =========================================================================
    // Workflow actions
    // =========================================================================

    pub fn request_conditions(&mut self) {
        self.ctx.request_conditions();
    }

    pub fn close_results(&mut self) {
        self.ctx.close_results();
        self.results_scroll = 0;
    }

    pub fn dismiss_error(&mut self) {
        self.ctx.dismiss_error();
    }

    pub fn dismiss_instructions(&mut self) {
        self.ctx.dismiss_instructions();
    }

    pub fn locate_device(&mut self) {
        self.ctx.locate_device();
    }

    /// Persist the current view so the next start opens where this one ended.
    pub fn save_view(&self) {
        let map = &self.ctx.map;
        if let Err(e) = Config::save_view(map.center(), map.zoom()) {
            warn!(error = %e, "Failed to save map view");
        }
    }

    pub fn scroll_results(&mut self, down: bool, amount: u16) {
        self.results_scroll = if down {
            self.results_scroll.saturating_add(amount)
        } else {
            self.results_scroll.saturating_sub(amount)
        };
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let was_showing = self.ctx.workflow.results_visible();
        if self.ctx.poll() == 0 {
            return;
        }
        if self.ctx.workflow.results_visible() && !was_showing {
            self.fetched_at = Some(Local::now());
            self.results_scroll = 0;
        }
    }

    /// Status bar text: device lookup first, then the time of the last fetch.
    pub fn status_text(&self) -> String {
        if let Some(ref msg) = self.ctx.device_status {
            return msg.clone();
        }
        if self.ctx.workflow.loading() {
            return "Fetching rowing conditions...".to_string();
        }
        match self.fetched_at {
            Some(at) => format!("Conditions fetched {}", at.format("%H:%M")),
            None => "No conditions fetched yet".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::future::pending;

    use async_trait::async_trait;
    use oaracle_core::api::{ApiError, ConditionsSource, DeviceLocator, LocationResolver};
    use oaracle_core::models::{ConditionsRequest, ConditionsResult, LocationDescription};

    /// Collaborator that never answers, for exercising the synchronous paths.
    struct Silent;

    #[async_trait]
    impl LocationResolver for Silent {
        async fn resolve(&self, _point: GeoPoint) -> LocationDescription {
            pending().await
        }
    }

    #[async_trait]
    impl ConditionsSource for Silent {
        async fn fetch_conditions(
            &self,
            _request: &ConditionsRequest,
        ) -> Result<ConditionsResult, ApiError> {
            pending().await
        }
    }

    #[async_trait]
    impl DeviceLocator for Silent {
        async fn locate(&self) -> Result<GeoPoint, ApiError> {
            pending().await
        }
    }

    pub(crate) fn app() -> App {
        App::with_collaborators(
            Config::default(),
            Collaborators {
                resolver: Arc::new(Silent),
                conditions: Arc::new(Silent),
                locator: Arc::new(Silent),
            },
        )
    }

    #[tokio::test]
    async fn test_click_inside_map_selects() {
        let mut app = app();
        let area = Rect::new(1, 4, 81, 41);
        app.click(area, 41, 24);

        let selected = app.ctx.workflow.selection().unwrap().point;
        assert!((selected.latitude - 54.0).abs() < 1e-9);
        assert!((selected.longitude + 2.0).abs() < 1e-9);
        assert_eq!(app.ctx.map.marker().unwrap().point, selected);
    }

    #[tokio::test]
    async fn test_click_outside_map_ignored() {
        let mut app = app();
        let area = Rect::new(1, 4, 81, 41);
        app.click(area, 0, 10);
        app.click(area, 90, 10);
        assert!(app.ctx.workflow.selection().is_none());
        assert!(app.ctx.map.marker().is_none());
    }

    #[tokio::test]
    async fn test_request_without_selection_shows_nothing() {
        let mut app = app();
        let before = app.status_text();
        app.request_conditions();
        assert!(!app.ctx.workflow.loading());
        assert!(app.ctx.workflow.error().is_none());
        assert_eq!(app.status_text(), before);
    }

    #[tokio::test]
    async fn test_status_text_while_loading() {
        let mut app = app();
        app.select_center();
        app.request_conditions();
        assert_eq!(app.status_text(), "Fetching rowing conditions...");
    }

    #[test]
    fn test_scroll_saturates() {
        let mut app = app();
        app.scroll_results(false, PAGE_SCROLL_SIZE);
        assert_eq!(app.results_scroll, 0);
        app.scroll_results(true, 3);
        assert_eq!(app.results_scroll, 3);
    }
}
