//! Traineo notifications service. Deficiency generators compute what
//! should be alerted and the reconciliation engine converges stored
//! notifications onto that output. The portal reads the result through
//! the HTTP facade.

pub mod auth;
pub mod config;
pub mod db;
pub mod deficiencies;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod scheduler;
pub mod server;
pub mod telemetry;
pub use migration;
