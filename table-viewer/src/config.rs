//! Client configuration
//!
//! Both structs deserialize with defaults for every missing field, so they can
//! be loaded from any serde source or built in code.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::view::pipeline::NullOrdering;

/// Gateway base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Rows shown per page when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// How to reach the table gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// URL every endpoint path is appended to, including the mount path
    pub base_url: String,

    /// Per-request timeout; `None` waits indefinitely
    #[serde(with = "optional_seconds")]
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl GatewayConfig {
    /// Configuration for a gateway at `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Presentation settings of the table view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Rows per page
    pub page_size: usize,

    /// Where null cells land when sorting
    pub null_ordering: NullOrdering,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            null_ordering: NullOrdering::default(),
        }
    }
}

mod optional_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let seconds = Option::<f64>::deserialize(deserializer)?;
        match seconds {
            Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                Ok(Some(Duration::from_secs_f64(seconds)))
            }
            Some(seconds) => Err(serde::de::Error::custom(format!(
                "invalid timeout: {}",
                seconds
            ))),
            None => Ok(None),
        }
    }
}
