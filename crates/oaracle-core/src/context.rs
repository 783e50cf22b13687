//! Application context: the workflow wired to its collaborators.
//!
//! The context is built once at startup. It owns the `Workflow` and the map
//! surface, runs the workflow's commands (marker placement synchronously,
//! network calls as spawned tokio tasks) and folds the task results back in.
//! Results travel over an mpsc channel tagged with their ticket, so the
//! workflow can discard anything that belongs to an older selection.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ConditionsSource, DeviceLocator, LocationResolver};
use crate::geo::GeoPoint;
use crate::map::MapSurface;
use crate::models::{ConditionsResult, LocationDescription};
use crate::workflow::{Command, Ticket, Workflow};

/// Buffer size for the task result channel.
/// Each click queues at most two results, so 32 covers rapid clicking.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Zoom used when jumping to the device position.
pub const DEVICE_LOCATION_ZOOM: u8 = 12;

/// External services the workflow depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn LocationResolver>,
    pub conditions: Arc<dyn ConditionsSource>,
    pub locator: Arc<dyn DeviceLocator>,
}

/// Results sent back from spawned tasks.
#[derive(Debug)]
pub enum Outcome {
    /// Reverse geocode finished for the selection holding `ticket`
    Location {
        ticket: Ticket,
        description: LocationDescription,
    },
    /// Conditions fetch finished (the error is already rendered to text)
    Conditions {
        ticket: Ticket,
        result: Result<ConditionsResult, String>,
    },
    /// Device geolocation finished. `since` is the selection that was
    /// current when the lookup started.
    DeviceLocation {
        since: Option<Ticket>,
        result: Result<GeoPoint, String>,
    },
}

pub struct AppContext<M: MapSurface> {
    pub workflow: Workflow,
    pub map: M,
    collaborators: Collaborators,
    outcome_tx: mpsc::Sender<Outcome>,
    outcome_rx: mpsc::Receiver<Outcome>,
    /// Note for the status bar about the last device lookup
    pub device_status: Option<String>,
}

impl<M: MapSurface> AppContext<M> {
    pub fn new(map: M, collaborators: Collaborators) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            workflow: Workflow::new(),
            map,
            collaborators,
            outcome_tx,
            outcome_rx,
            device_status: None,
        }
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Handle a click on the map (or anything that acts like one).
    pub fn select(&mut self, point: GeoPoint) {
        let commands = self.workflow.select(point);
        self.run(commands);
    }

    pub fn request_conditions(&mut self) {
        let commands = self.workflow.request_conditions();
        self.run(commands);
    }

    pub fn close_results(&mut self) {
        self.workflow.close_results();
    }

    pub fn dismiss_error(&mut self) {
        self.workflow.dismiss_error();
    }

    pub fn dismiss_instructions(&mut self) {
        self.workflow.dismiss_instructions();
    }

    /// Start a one-shot device location lookup. The result arrives through
    /// `poll` and is handled like a click, unless the user has picked a point
    /// in the meantime.
    pub fn locate_device(&mut self) {
        let locator = Arc::clone(&self.collaborators.locator);
        let tx = self.outcome_tx.clone();
        let since = self.current_ticket();
        self.device_status = Some("Locating...".to_string());

        tokio::spawn(async move {
            let result = locator.locate().await.map_err(|e| e.to_string());
            send_outcome(&tx, Outcome::DeviceLocation { since, result }).await;
        });
    }

    fn current_ticket(&self) -> Option<Ticket> {
        self.workflow.selection().map(|s| s.ticket)
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply every outcome that has already arrived. Returns how many were
    /// processed. Never blocks, so it can run once per UI tick.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            processed += 1;
        }
        processed
    }

    /// Wait for the next outcome and apply it. Returns false if the channel
    /// is closed, which cannot happen while the context holds a sender.
    pub async fn process_next(&mut self) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Location {
                ticket,
                description,
            } => {
                self.workflow.apply_location(ticket, description);
            }
            Outcome::Conditions { ticket, result } => {
                if let Err(ref message) = result {
                    error!(ticket = ticket.value(), error = %message, "Error fetching conditions");
                }
                self.workflow.apply_conditions(ticket, result);
            }
            Outcome::DeviceLocation { since, result } if since != self.current_ticket() => {
                debug!(ok = result.is_ok(), "Dropping device location, selection changed");
                self.device_status = None;
            }
            Outcome::DeviceLocation { result: Ok(point), .. } => {
                info!(lat = point.latitude, lng = point.longitude, "Device location found");
                self.device_status = None;
                self.map.recenter(point, DEVICE_LOCATION_ZOOM);
                self.select(point);
            }
            Outcome::DeviceLocation { result: Err(message), .. } => {
                error!(error = %message, "Error getting current location");
                self.device_status = Some("Could not determine your location".to_string());
            }
        }
    }

    fn run(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::PlaceMarker(point) => {
                    self.map.place_marker(point);
                }
                Command::ResolveLocation { point, ticket } => {
                    let resolver = Arc::clone(&self.collaborators.resolver);
                    let tx = self.outcome_tx.clone();
                    tokio::spawn(async move {
                        let description = resolver.resolve(point).await;
                        send_outcome(&tx, Outcome::Location { ticket, description }).await;
                    });
                }
                Command::FetchConditions { request, ticket } => {
                    debug!(ticket = ticket.value(), "Dispatching conditions request");
                    let source = Arc::clone(&self.collaborators.conditions);
                    let tx = self.outcome_tx.clone();
                    tokio::spawn(async move {
                        let result = source
                            .fetch_conditions(&request)
                            .await
                            .map_err(|e| e.to_string());
                        send_outcome(&tx, Outcome::Conditions { ticket, result }).await;
                    });
                }
            }
        }
    }
}

async fn send_outcome(tx: &mpsc::Sender<Outcome>, outcome: Outcome) {
    if tx.send(outcome).await.is_err() {
        warn!("Outcome channel closed; app is shutting down");
    }
}
