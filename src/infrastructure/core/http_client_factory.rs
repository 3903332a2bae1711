use reqwest::Client;
use std::time::Duration;

/// Identifies the device to public APIs that require a contact string (NWS).
pub const USER_AGENT: &str = concat!("hivecast/", env!("CARGO_PKG_VERSION"));

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the shared HTTP client. No retry layer: a failed call fails the
    /// run and the scheduler tries again on the next tick.
    pub fn create_client(timeout: Duration) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
    }
}
