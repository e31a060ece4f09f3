//! HTTP client configuration module
//!
//! Timeouts and retry policy for talking to the booking server. Reads and
//! mutations get separate presets because only reads are ever retried.

use crate::utils::retry::RetryConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const USER_AGENT: &str = concat!("roombook/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole-request deadline, body included.
    pub timeout: Duration,
    /// Backoff for idempotent requests. Ignored by the mutation paths.
    pub retry: RetryConfig,
    pub max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            max_idle_per_host: 4,
        }
    }
}

impl HttpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Booking mutations: a single attempt with a shorter deadline.
    pub fn api() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            retry: RetryConfig::none(),
            max_idle_per_host: 2,
            ..Self::default()
        }
    }

    /// Schedule and room reads.
    pub fn reads() -> Self {
        Self {
            retry: RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(750),
                max_delay: Duration::from_secs(8),
                backoff_multiplier: 2.0,
            },
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_client(&self) -> reqwest::Result<Client> {
        ClientBuilder::new()
            .user_agent(USER_AGENT)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build()
    }

    pub fn to_retry_config(&self) -> RetryConfig {
        self.retry.clone()
    }
}
