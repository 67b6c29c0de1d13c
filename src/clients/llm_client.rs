//! 语言模型客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务均可（自定义 base url 与模型）

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;

/// 自然语言评估 oracle
///
/// 请求为 `{system_role, user_prompt}`，响应为自由文本
pub trait TextOracle: Send + Sync {
    fn chat(&self, system_role: &str, user_prompt: &str)
        -> impl Future<Output = Result<String>> + Send;
}

/// 基于 OpenAI 兼容接口的 oracle
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.oracle_timeout_secs),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl TextOracle for LlmClient {
    async fn chat(&self, system_role: &str, user_prompt: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_prompt.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_role)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .with_context(|| format!("LLM API 调用超时 ({} 秒)", self.timeout.as_secs()))?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                anyhow::anyhow!("LLM API 调用失败: {}", e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
