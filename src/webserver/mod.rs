//! HTTP API
//!
//! - `GET /api/protocols?search=&count=` ranked or searched `{name, apy}` list
//! - `GET /api/apy` named protocol yields keyed by display label
//! - `GET /api/pools` full cached pool list
//! - `GET /api/status`, `GET /api/health`

pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{bind, build_app, serve};
pub use state::AppState;
