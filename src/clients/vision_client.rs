//! 图片标注客户端
//!
//! 调用 Cloud Vision 兼容的 `images:annotate` 接口（LABEL_DETECTION），
//! 图片以 base64 放在请求体中

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

/// 图片标注 oracle：输入编码后的图片，输出有序标签
pub trait VisionOracle: Send + Sync {
    fn detect_labels(&self, image: &[u8]) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Cloud Vision 客户端
pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.oracle_timeout_secs))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/images:annotate",
                config.vision_api_base_url.trim_end_matches('/')
            ),
            api_key: config.vision_api_key.clone(),
        })
    }
}

impl VisionOracle for VisionClient {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<String>> {
        debug!("调用图片标注 API，图片大小: {} 字节", image.len());

        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "LABEL_DETECTION" }]
            }]
        });

        let response: AnnotateResponse = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("图片标注请求失败")?
            .error_for_status()
            .context("图片标注 API 返回错误状态")?
            .json()
            .await
            .context("无法解析图片标注响应")?;

        response.into_labels()
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl AnnotateResponse {
    fn into_labels(self) -> Result<Vec<String>> {
        let Some(first) = self.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(status) = first.error {
            anyhow::bail!("图片标注失败: {}", status.message);
        }
        Ok(first
            .label_annotations
            .into_iter()
            .map(|label| label.description)
            .filter(|d| !d.is_empty())
            .collect())
    }
}
