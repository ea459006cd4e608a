use std::env;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub app_env: String,

    // Plugin settings store
    pub plugin_config_path: String,

    // Remote services
    pub guide_api_url: String,
    pub trailer_catalog_url: String,

    // HTTP client
    pub http_timeout_ms: u64,
    pub user_agent: String,

    // Background refresh
    pub refresh_interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),

            // Plugin settings store
            plugin_config_path: env::var("PLUGIN_CONFIG_PATH")
                .unwrap_or_else(|_| "plugin-config.json".to_string()),

            // Remote services
            guide_api_url: env::var("GUIDE_API_URL")
                .unwrap_or_else(|_| crate::services::guide::DEFAULT_API_URL.to_string()),
            trailer_catalog_url: env::var("TRAILER_CATALOG_URL").unwrap_or_else(|_| {
                crate::services::trailers::DEFAULT_CATALOG_URL.to_string()
            }),

            // HTTP client
            http_timeout_ms: env::var("HTTP_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| format!("tvtrailers-server/{}", env!("CARGO_PKG_VERSION"))),

            // Background refresh
            refresh_interval_ms: env::var("REFRESH_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
        }
    }

    /// Settings shared by every outbound HTTP client
    pub fn http_settings(&self) -> crate::services::HttpSettings {
        crate::services::HttpSettings {
            user_agent: self.user_agent.clone(),
            timeout: std::time::Duration::from_millis(self.http_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_env_from_environment() {
        env::set_var("APP_ENV", "production");
        assert_eq!(Config::from_env().app_env, "production");

        env::remove_var("APP_ENV");
        assert_eq!(Config::from_env().app_env, "development");
    }
}
