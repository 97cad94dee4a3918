use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("Connection to {address} timed out"))]
    ConnectTimeout {
        address: String,
        source: tokio::time::error::Elapsed,
    },

    #[snafu(display("Failed to connect to {address}: {source}"))]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("{method} timed out after {}s", timeout.as_secs()))]
    RequestTimeout {
        method: &'static str,
        timeout: Duration,
    },

    #[snafu(display("Serialization error: {source}"))]
    Serialization { source: serde_json::Error },

    #[snafu(display("{message}"))]
    Protocol { message: String },

    #[snafu(display("Not connected"))]
    NotConnected,
}
