//! Web layer for the arrival board.
//!
//! Provides HTTP endpoints for nearby stations, station boards and the
//! later stops of a trip.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Feed};
