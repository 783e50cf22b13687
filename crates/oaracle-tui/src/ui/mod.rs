//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, the map canvas, panels and overlays
//! - `input`: keyboard and mouse handling
//! - `results`: turning a conditions response into display rows
//! - `styles`: color palette and text styling

pub mod input;
pub mod render;
pub mod results;
pub mod styles;
