// ── Device source ──
//
// The seam between the coordinator and the network. `ScrutinyClient` is
// the production source; tests plug in scripted ones.

use std::future::Future;

use indexmap::IndexMap;
use scrutiny_api::{DetailPayload, ScrutinyClient};

use crate::model::{DeviceWwn, SummaryRecord};

/// Summary roster, in remote order.
pub type Roster = IndexMap<DeviceWwn, SummaryRecord>;

/// Where the coordinator gets its data from.
///
/// Implementations must be shareable across tasks: every detail call of a
/// cycle runs on its own task against the same source.
pub trait DeviceSource: Send + Sync + 'static {
    /// Fetch the roster of devices with their summary fields.
    fn fetch_summary(&self) -> impl Future<Output = Result<Roster, scrutiny_api::Error>> + Send;

    /// Fetch the detail payload for one device.
    fn fetch_detail(
        &self,
        wwn: &DeviceWwn,
    ) -> impl Future<Output = Result<DetailPayload, scrutiny_api::Error>> + Send;

    /// Short description for log lines.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_owned()
    }
}

impl DeviceSource for ScrutinyClient {
    async fn fetch_summary(&self) -> Result<Roster, scrutiny_api::Error> {
        let entries = self.get_summary().await?;
        Ok(entries
            .into_iter()
            .map(|(wwn, entry)| (DeviceWwn::from(wwn), SummaryRecord::from(entry)))
            .collect())
    }

    async fn fetch_detail(&self, wwn: &DeviceWwn) -> Result<DetailPayload, scrutiny_api::Error> {
        self.get_device_details(wwn.as_str()).await
    }

    fn describe(&self) -> String {
        self.base_url().to_string()
    }
}
