use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{Error, Result};

/// HTTP 抓取介面
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 取得網頁 HTML
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// 下載圖片內容
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest 實作；兩種請求都帶瀏覽器 User-Agent 並套用同一個超時
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::InvalidConfiguration(format!("無法建立 HTTP 客戶端: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        tracing::debug!("GET page {}", url);

        let to_fetch_error = |source: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(to_fetch_error)?;

        response.text().await.map_err(to_fetch_error)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET image {}", url);

        let to_transfer_error = |source: reqwest::Error| Error::Transfer {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(to_transfer_error)?;

        let bytes = response.bytes().await.map_err(to_transfer_error)?;
        Ok(bytes.to_vec())
    }
}
