/// HTTP 下载客户端
///
/// 封装 reqwest，另外支持 `file://` 本地文件，方便离线分析
use crate::clients::Fetcher;
use crate::config::Config;
use crate::error::{AppResult, FetchError, OcaError};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// 基于 reqwest 的下载客户端
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 创建新的下载客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| OcaError::request_failed("(client)", e))?;

        Ok(Self { client })
    }
}

impl HttpFetcher {
    async fn get(&self, url: &str) -> AppResult<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            debug!("读取本地文件: {}", path);
            return match tokio::fs::read(path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
                    url: url.to_string(),
                }
                .into()),
                Err(e) => Err(OcaError::file_read_failed(path, e)),
            };
        }

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| OcaError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OcaError::request_failed(url, e))?;

        Ok(body.to_vec())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = AppResult<Vec<u8>>> + Send {
        self.get(url)
    }
}
