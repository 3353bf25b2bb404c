// ── Domain model ──

pub mod record;
pub mod snapshot;
pub mod wwn;

pub use record::{AggregatedRecord, DetailSection, HealthStatus, SummaryRecord};
pub use snapshot::{DeviceMap, Snapshot};
pub use wwn::DeviceWwn;
