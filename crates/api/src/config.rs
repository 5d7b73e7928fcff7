use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of generation pool workers (default: `4`). Bounds the
    /// number of concurrently in-flight provider operations.
    pub worker_pool_size: usize,
    /// Base URL of the generation provider's operations API.
    pub provider_base_url: String,
    /// Object-storage bucket generated artifacts are written under.
    pub output_bucket: String,
    /// Delay between operation polls (default: `15`).
    pub poll_interval_secs: u64,
    /// Ceiling on total polling time per operation (default: `600`).
    pub poll_ceiling_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `WORKER_POOL_SIZE`     | `4`                        |
    /// | `PROVIDER_BASE_URL`    | `http://localhost:8600`    |
    /// | `OUTPUT_BUCKET`        | `mediagen-outputs`         |
    /// | `POLL_INTERVAL_SECS`   | `15`                       |
    /// | `POLL_CEILING_SECS`    | `600`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let worker_pool_size: usize = std::env::var("WORKER_POOL_SIZE")
            .unwrap_or_else(|_| mediagen_engine::manager::DEFAULT_WORKER_COUNT.to_string())
            .parse()
            .expect("WORKER_POOL_SIZE must be a valid usize");

        let provider_base_url = std::env::var("PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8600".into());

        let output_bucket =
            std::env::var("OUTPUT_BUCKET").unwrap_or_else(|_| "mediagen-outputs".into());

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let poll_ceiling_secs: u64 = std::env::var("POLL_CEILING_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("POLL_CEILING_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            worker_pool_size,
            provider_base_url,
            output_bucket,
            poll_interval_secs,
            poll_ceiling_secs,
        }
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Poll ceiling as a [`Duration`].
    pub fn poll_ceiling(&self) -> Duration {
        Duration::from_secs(self.poll_ceiling_secs)
    }
}
