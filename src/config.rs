use std::net::SocketAddr;

use clap::Args;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Args, Debug, Clone)]
pub struct DashboardConfig {
    /// Address the dashboard listens on
    #[arg(long, env = "CSAT_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,
    /// Largest accepted CSV upload, in bytes
    #[arg(long, env = "CSAT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
