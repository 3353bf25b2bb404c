//! Aggregation layer between `scrutiny-api` and its consumers.
//!
//! - **[`Coordinator`]** runs refresh cycles: one summary call, a concurrent
//!   detail call per device, then reduction into a fresh device map. Cycles
//!   are single-flight: overlapping triggers share one outcome. A background
//!   task repeats the cycle on a fixed interval.
//!
//! - **[`Snapshot`]** is the immutable view readers get. It is swapped
//!   atomically at the end of a cycle, so readers see either the previous
//!   complete map or the new one. A cycle whose summary call fails keeps
//!   the previous map and records the error.
//!
//! - **[`reduce`]** merges one device's summary record with its detail
//!   outcome. A failed detail call yields an empty placeholder for that
//!   device only.
//!
//! - **[`DeviceSource`]** abstracts the two fetches so the coordinator can
//!   run against the HTTP client or a scripted source.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod reduce;
pub mod source;
pub mod store;

pub use config::{CoordinatorConfig, TlsVerification};
pub use coordinator::{Coordinator, CoordinatorState, CycleReport, CycleResult};
pub use error::{CoreError, RefreshError};
pub use model::{
    AggregatedRecord, DetailSection, DeviceMap, DeviceWwn, HealthStatus, Snapshot, SummaryRecord,
};
pub use reduce::{DetailResult, detail_section, reduce};
pub use source::{DeviceSource, Roster};
pub use store::{RosterDelta, SnapshotStore};

pub use scrutiny_api::FailureKind;
