//! Data models for the conditions workflow.
//!
//! - `location`: reverse-geocode responses and the derived `LocationDescription`
//! - `conditions`: the backend request shape and the lenient result payload

pub mod conditions;
pub mod location;

pub use conditions::{
    ConditionsOptions, ConditionsRequest, ConditionsResult, CurrentConditions, ForecastEntry,
    HealthStatus, LocationInfo, RowabilityScore, Scalar, ScoreFactor, WaterConditions,
};
pub use location::{Address, LocationDescription, ReverseGeocodeResponse};
