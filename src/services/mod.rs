pub mod guide;
pub mod live_tv;
pub mod metrics;
pub mod refresh;
pub mod settings;
pub mod trailers;
pub mod tuner;

use reqwest::Client;
use std::time::Duration;

/// Settings shared by every outbound HTTP client
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpSettings {
    /// Build the shared reqwest client. Every request inherits the timeout.
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .build()
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("tvtrailers-server/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

/// At most `max_chars` characters of `text`, cut on a char boundary
pub fn preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(end, _)| &text[..end])
}

/// Throwaway HTTP servers for tests that need a remote endpoint
#[cfg(test)]
pub mod test_support {
    use axum::Router;
    use std::net::SocketAddr;

    /// Serve `app` on an ephemeral localhost port and return its base URL
    pub async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });
        format!("http://{}", addr)
    }

    pub fn client() -> reqwest::Client {
        super::HttpSettings::default()
            .build_client()
            .expect("test http client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let body = format!("{}é{}", "a".repeat(499), "b".repeat(10));

        assert_eq!(preview(&body, 500), format!("{}é", "a".repeat(499)));
        assert_eq!(preview(&body, 499), "a".repeat(499));
        assert_eq!(preview("short", 500), "short");
    }
}
