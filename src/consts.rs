pub mod client {
    // Defaults for the HTTP client, in milliseconds.
    pub const CONNECT_TIMEOUT_MS: u64 = 10_000;
    pub const READ_TIMEOUT_MS: u64 = 40_000;

    pub const API_KEY_HEADER: &str = "x-api-key";
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}

pub mod polling {
    use std::time::Duration;

    /// Used when a status response carries neither `retryInterval` nor `retry-after`.
    pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 2;

    /// Lower bound between two polls of the same job, even if the server says 0.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
}

pub mod batch {
    /// Jobs in flight at once when the caller does not say otherwise.
    pub const DEFAULT_MAX_CONCURRENT: usize = 4;
}
