pub mod domain;
pub mod report;
pub mod stream;
pub mod transport;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub api_url: Option<String>,
        pub stream_path: Option<String>,
        pub connect_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let connect_timeout_secs = match std::env::var("ANALYST_CONNECT_TIMEOUT_SECS") {
                Ok(raw) => Some(
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("invalid ANALYST_CONNECT_TIMEOUT_SECS: {raw}"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                api_url: std::env::var("ANALYST_API_URL").ok(),
                stream_path: std::env::var("ANALYST_STREAM_PATH").ok(),
                connect_timeout_secs,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Overrides the pipeline URL, e.g. from a command-line flag.
        pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
            if api_url.is_some() {
                self.api_url = api_url;
            }
            self
        }
    }
}
