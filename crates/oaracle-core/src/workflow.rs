//! Interaction state machine for picking a spot and fetching its conditions.
//!
//! `Workflow` is pure state plus transition functions. It holds no widgets
//! and performs no I/O. Transitions that need side effects return
//! [`Command`]s for the caller to carry out, and async results come back
//! through the `apply_*` methods tagged with the [`Ticket`] they were issued
//! under. Results for a superseded selection are dropped.

use tracing::{debug, error};

use crate::geo::GeoPoint;
use crate::models::{ConditionsRequest, ConditionsResult, LocationDescription};

/// Sequence token tying an async result to the selection that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub point: GeoPoint,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet
    Idle,
    LocationSelected,
    ConditionsLoading,
    ConditionsShown,
    /// Fetch failed; the selection is kept so the user can retry
    ConditionsError,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlaceMarker(GeoPoint),
    ResolveLocation { point: GeoPoint, ticket: Ticket },
    FetchConditions { request: ConditionsRequest, ticket: Ticket },
}

#[derive(Debug, Clone)]
pub struct Workflow {
    phase: Phase,
    selection: Option<Selection>,
    last_ticket: u64,
    instructions_visible: bool,
    location_text: Option<LocationDescription>,
    result: Option<ConditionsResult>,
    error: Option<String>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            selection: None,
            last_ticket: 0,
            instructions_visible: true,
            location_text: None,
            result: None,
            error: None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn instructions_visible(&self) -> bool {
        self.instructions_visible
    }

    pub fn location_panel_visible(&self) -> bool {
        matches!(
            self.phase,
            Phase::LocationSelected | Phase::ConditionsLoading | Phase::ConditionsError
        )
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::ConditionsLoading
    }

    pub fn results_visible(&self) -> bool {
        self.phase == Phase::ConditionsShown
    }

    /// Resolved label for the current selection, `None` while resolving.
    pub fn location_text(&self) -> Option<&LocationDescription> {
        self.location_text.as_ref()
    }

    /// Latest conditions, only while the results panel is up.
    pub fn result(&self) -> Option<&ConditionsResult> {
        if self.results_visible() {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Make `point` the selection. Valid from every phase; replaces any
    /// earlier selection and orphans its in-flight requests.
    pub fn select(&mut self, point: GeoPoint) -> Vec<Command> {
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);

        debug!(lat = point.latitude, lng = point.longitude, ticket = ticket.0, "Location selected");

        self.selection = Some(Selection { point, ticket });
        self.phase = Phase::LocationSelected;
        self.instructions_visible = false;
        self.location_text = None;
        self.error = None;

        vec![
            Command::PlaceMarker(point),
            Command::ResolveLocation { point, ticket },
        ]
    }

    /// Ask for conditions at the current selection.
    pub fn request_conditions(&mut self) -> Vec<Command> {
        let Some(selection) = self.selection else {
            error!("No location selected");
            return Vec::new();
        };

        if self.phase == Phase::ConditionsLoading {
            debug!(ticket = selection.ticket.0, "Conditions already loading");
            return Vec::new();
        }

        self.phase = Phase::ConditionsLoading;
        self.error = None;

        vec![Command::FetchConditions {
            request: ConditionsRequest::for_point(selection.point),
            ticket: selection.ticket,
        }]
    }

    /// Record a resolved label. Returns false if the ticket is stale.
    pub fn apply_location(&mut self, ticket: Ticket, description: LocationDescription) -> bool {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "Dropping stale location description");
            return false;
        }
        self.location_text = Some(description);
        true
    }

    /// Record the outcome of a conditions fetch. Returns false if the result
    /// no longer matches what the user is waiting for.
    pub fn apply_conditions(
        &mut self,
        ticket: Ticket,
        outcome: Result<ConditionsResult, String>,
    ) -> bool {
        if !self.is_current(ticket) || self.phase != Phase::ConditionsLoading {
            debug!(ticket = ticket.0, "Dropping stale conditions result");
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = Phase::ConditionsShown;
            }
            Err(message) => {
                self.error = Some(format!("Failed to fetch rowing conditions: {}", message));
                self.phase = Phase::ConditionsError;
            }
        }
        true
    }

    pub fn close_results(&mut self) {
        if self.phase == Phase::ConditionsShown {
            self.phase = Phase::LocationSelected;
        }
    }

    pub fn dismiss_error(&mut self) {
        if self.phase == Phase::ConditionsError {
            self.phase = Phase::LocationSelected;
            self.error = None;
        }
    }

    pub fn dismiss_instructions(&mut self) {
        self.instructions_visible = false;
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.selection.map(|s| s.ticket) == Some(ticket)
    }
}
