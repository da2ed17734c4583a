use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::ApiError;

/// Status and body of a completed GET, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single HTTP capability the client needs.
///
/// The client applies its own timeout, status check and decoding on top,
/// so implementations only have to move bytes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// `timeout` is a hard ceiling for the whole exchange; the client races
    /// each attempt against its own (usually shorter) timeout as well.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_http_transport_returns_status_and_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/categories.php")
            .match_header("user-agent", "mealdb-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"categories": []}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new("mealdb-test", None).unwrap();
        let response = transport
            .get(&format!("{}/categories.php", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"categories": []}"#);
    }

    #[tokio::test]
    async fn test_http_transport_does_not_judge_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/random.php")
            .with_status(503)
            .with_body("down for maintenance")
            .create_async()
            .await;

        let transport = HttpTransport::new("mealdb-test", None).unwrap();
        let response = transport
            .get(&format!("{}/random.php", server.url()))
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        let transport = HttpTransport::new("mealdb-test", Some(Duration::from_secs(2))).unwrap();
        // Port 9 (discard) on localhost is closed on test machines
        let result = transport.get("http://127.0.0.1:9/random.php").await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
