//! Core library for oaracle.
//!
//! Pick a point on a map, find out what it is called, and ask the backend
//! whether it is a good day to row there. This crate holds everything that
//! does not touch the terminal:
//!
//! - `geo`, `map`: coordinates, the viewport and the single selection marker
//! - `api`: reverse geocoding, the conditions backend and IP geolocation
//! - `models`: request and response types
//! - `workflow`: the interaction state machine
//! - `context`: the workflow wired to its collaborators
//! - `config`: endpoints and initial view

pub mod api;
pub mod config;
pub mod context;
pub mod geo;
pub mod map;
pub mod models;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use context::{AppContext, Collaborators, Outcome};
pub use geo::GeoPoint;
pub use map::{MapSurface, MapView};
pub use workflow::{Phase, Workflow};
