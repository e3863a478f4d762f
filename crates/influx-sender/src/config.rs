// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Maximum points per write request.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Points not delivered within this window are dropped.
pub const DEFAULT_POINT_EXPIRY: Duration = Duration::from_secs(10 * 60);
/// How often the pending batch is flushed.
pub const DEFAULT_WRITE_INTERVAL: Duration = Duration::from_secs(10);
/// Per-request HTTP timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);
/// Capacity of the delivery-error channel.
pub const DEFAULT_ERROR_CAPACITY: usize = 10;

/// Configuration for one [`crate::sender::MetricsSender`].
///
/// Everything is an explicit value here rather than process-wide state, so
/// tests can run multiple independent senders with their own intervals.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Base URL of the InfluxDB HTTP endpoint, e.g. `http://influx:8086`.
    pub endpoint: String,
    /// Username for basic auth, if the server requires it.
    pub username: Option<String>,
    /// Password for basic auth.
    pub password: Option<String>,
    /// Target database name. Must not be empty.
    pub database: String,
    /// Interval between flush cycles.
    pub write_interval: Duration,
    /// Maximum points per chunk.
    pub max_chunk_size: usize,
    /// Maximum age a point may reach before it is dropped instead of
    /// retried.
    pub max_point_age: Duration,
    /// HTTP timeout for a single write request.
    pub timeout: Duration,
    /// Capacity of the delivery-error channel.
    pub error_capacity: usize,
}

impl SenderConfig {
    /// Config with production defaults for the given endpoint and database.
    pub fn new(endpoint: impl Into<String>, database: impl Into<String>) -> Self {
        SenderConfig {
            endpoint: endpoint.into(),
            username: None,
            password: None,
            database: database.into(),
            write_interval: DEFAULT_WRITE_INTERVAL,
            max_chunk_size: DEFAULT_CHUNK_SIZE,
            max_point_age: DEFAULT_POINT_EXPIRY,
            timeout: DEFAULT_WRITE_TIMEOUT,
            error_capacity: DEFAULT_ERROR_CAPACITY,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}
