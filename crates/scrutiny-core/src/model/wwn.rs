// ── Device identity ──
//
// Scrutiny keys every device by its World Wide Name. The key is used
// verbatim: it comes from the remote roster and goes back into the
// detail URL, so no normalisation is applied.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// World Wide Name of a disk, exactly as the summary roster lists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceWwn(String);

impl DeviceWwn {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceWwn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceWwn {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for DeviceWwn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceWwn {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for DeviceWwn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets snapshot maps be indexed with a plain `&str`.
impl Borrow<str> for DeviceWwn {
    fn borrow(&self) -> &str {
        &self.0
    }
}
