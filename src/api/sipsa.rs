use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::RawDocument;

/// Source of the raw price document.
#[async_trait]
pub trait DataLoader: Send + Sync {
    async fn fetch_document(&self) -> Result<RawDocument>;
}

/// Loads the static data file over HTTP with a per-attempt timeout and
/// bounded, fixed-delay retries.
pub struct HttpDataLoader {
    client: Client,
    url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpDataLoader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            url: config.data_url(),
            max_attempts: config.max_retry_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<RawDocument> {
        debug!("Sending request to {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DataLoader for HttpDataLoader {
    async fn fetch_document(&self) -> Result<RawDocument> {
        let mut attempt = 1;
        loop {
            match self.fetch_once().await {
                Ok(document) => return Ok(document),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}, retrying in {:?}",
                        attempt, self.max_attempts, self.url, e, self.retry_delay
                    );
                    sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/data/dane_sipsa_data.json";

    fn config_for(server: &mockito::ServerGuard) -> Config {
        Config {
            base_url: server.url(),
            max_retry_attempts: 3,
            retry_delay: Duration::from_millis(1),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn fetches_and_decodes_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"productos":[{"id":"1","name":"Papa"}],
                    "ciudades":[{"ciudad":"BOGOTÁ","lat":4.6,"lng":-74.1,
                                 "productos":[{"codigo":1,"nombre":"Papa","precio":"1200","unidad":"kg"}]}]}"#,
            )
            .create_async()
            .await;

        let loader = HttpDataLoader::new(&config_for(&server)).unwrap();
        let doc = loader.fetch_document().await.unwrap();

        mock.assert_async().await;
        assert_eq!(doc.productos.len(), 1);
        assert_eq!(doc.ciudades[0].ciudad, "BOGOTÁ");
        assert_eq!(doc.ciudades[0].productos[0].price(), 1200.0);
    }

    #[tokio::test]
    async fn retries_server_errors_up_to_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let loader = HttpDataLoader::new(&config_for(&server)).unwrap();
        let err = loader.fetch_document().await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, Error::Fetch { status: 503, .. }));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let loader = HttpDataLoader::new(&config_for(&server)).unwrap();
        let err = loader.fetch_document().await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, Error::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("<html>not json</html>")
            .expect(1)
            .create_async()
            .await;

        let loader = HttpDataLoader::new(&config_for(&server)).unwrap();
        let err = loader.fetch_document().await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn url_includes_base_path() {
        let config = Config {
            base_url: "https://example.org".into(),
            base_path: "/sub".into(),
            ..Config::default()
        };
        let loader = HttpDataLoader::new(&config).unwrap();
        assert_eq!(loader.url(), "https://example.org/sub/data/dane_sipsa_data.json");
    }
}
