//! QR scan flows.
//!
//! Visitors scan task codes ([`ScanPipeline`]); staff scan reward codes
//! ([`RewardScanner`]).

pub mod pipeline;
pub mod qr;
pub mod resolver;
pub mod reward;
pub mod submitter;

pub use pipeline::{ScanFailure, ScanOutcome, ScanPipeline, ScanStage};
pub use qr::decode_task_id;
pub use resolver::{Resolution, Resolver, SearchPhase};
pub use reward::{RewardLookup, RewardScanError, RewardScanner};
pub use submitter::{SubmitOutcome, Submitter};
