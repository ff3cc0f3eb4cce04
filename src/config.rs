use crate::core::Capacity;
use clap::Parser;
use std::path::PathBuf;

/// Server configuration, from flags or environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "travelsdb")]
#[command(about = "Serves users, locations and visits from an in-memory store")]
pub struct AppConfig {
    /// Directory holding options.txt and the users/locations/visits batches
    #[arg(long, env = "TRAVELS_DATA_DIR", default_value = "/tmp/data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "TRAVELS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "TRAVELS_PORT", default_value_t = 80)]
    pub port: u16,

    /// Highest user id the store can hold. Slots for every id up to each
    /// limit are allocated at startup, so memory grows with the limits, not
    /// with the data.
    #[arg(long, env = "TRAVELS_MAX_USER_ID", default_value_t = Capacity::default().max_user_id)]
    pub max_user_id: u32,

    /// Highest location id the store can hold
    #[arg(long, env = "TRAVELS_MAX_LOCATION_ID", default_value_t = Capacity::default().max_location_id)]
    pub max_location_id: u32,

    /// Highest visit id the store can hold
    #[arg(long, env = "TRAVELS_MAX_VISIT_ID", default_value_t = Capacity::default().max_visit_id)]
    pub max_visit_id: u32,

    /// Log filter directives, e.g. `travelsdb=debug,tower_http=info`
    #[arg(long, env = "RUST_LOG", default_value = "travelsdb=info,tower_http=warn")]
    pub log_filter: String,
}

impl AppConfig {
    pub fn capacity(&self) -> Capacity {
        Capacity::new(self.max_user_id, self.max_location_id, self.max_visit_id)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
