//! Async Rust client for the Scrutiny disk-health web API.
//!
//! Two endpoints matter: the cheap `summary` roster and the per-device
//! `device/{wwn}/details` record. [`ScrutinyClient`] issues both with a
//! bounded timeout and classifies every failure through [`Error::kind`].

pub mod client;
pub mod error;
mod lenient;
pub mod models;
pub mod transport;

pub use client::ScrutinyClient;
pub use error::{Error, FailureKind};
pub use models::{
    AttributeId, AttributeMetadata, DetailData, DetailPayload, DeviceInfo, SmartAttribute,
    SmartResult, SummaryEntry, SummarySmart,
};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
