//! Client library for the MuSES museum-visit platform.
//!
//! Resolves scanned task QR codes to the mission and quest that own them,
//! submits task completions, and redeems rewards at the point of sale.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod polyline;
pub mod scan;
pub mod services;

pub use auth::Session;
pub use error::{ClientError, ClientResult};
pub use scan::{RewardScanner, ScanOutcome, ScanPipeline};
pub use services::MusesClient;
