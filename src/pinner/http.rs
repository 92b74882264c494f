//! HTTP content pinner (Pinata-style pinning API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ContentPinner, PinError};

/// Request timeout for pin uploads.
const PIN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinner posting multipart file bodies to a pinning endpoint with a
/// bearer credential.
pub struct HttpPinner {
    client: Client,
    api_url: String,
    jwt: String,
}

impl HttpPinner {
    pub fn new(api_url: &str, jwt: &str) -> Result<Self, PinError> {
        let client = Client::builder()
            .timeout(PIN_TIMEOUT)
            .build()
            .map_err(|e| PinError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            jwt: jwt.to_string(),
        })
    }
}

#[async_trait]
impl ContentPinner for HttpPinner {
    async fn pin(&self, bytes: Vec<u8>, filename: &str) -> Result<String, PinError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PinError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| PinError::Request(e.to_string()))?;

        Ok(parsed.ipfs_hash)
    }
}
