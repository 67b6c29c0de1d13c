use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 进程入口处构造一次，之后以引用方式传给需要的组件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 语言模型（评估 oracle）配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 图片标注 oracle 配置 ---
    pub vision_api_key: String,
    pub vision_api_base_url: String,
    /// 单次 oracle 调用的超时时间（秒）
    pub oracle_timeout_secs: u64,
    /// 同时进行的图片标注请求数量
    pub max_concurrent_labels: usize,
    /// 评分标准有效性检查时发送的最大字符数
    pub rubric_excerpt_chars: usize,
    /// 标题字号阈值（磅），达到该字号的文本不计入正文
    pub heading_size_pt: f64,
    /// pdftotext 可执行文件
    pub pdftotext_bin: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
            vision_api_key: String::new(),
            vision_api_base_url: "https://vision.googleapis.com/v1".to_string(),
            oracle_timeout_secs: 60,
            max_concurrent_labels: 8,
            rubric_excerpt_chars: 3000,
            heading_size_pt: 24.0,
            pdftotext_bin: "pdftotext".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 只从环境变量读取，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 先读 TOML 配置文件（可选），再用环境变量覆盖
    pub fn load(toml_path: Option<&Path>) -> Result<Self> {
        let base = match toml_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件加载配置，文件中缺失的项使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: env_or("LLM_API_KEY", self.llm_api_key),
            llm_api_base_url: env_or("LLM_API_BASE_URL", self.llm_api_base_url),
            llm_model_name: env_or("LLM_MODEL_NAME", self.llm_model_name),
            llm_temperature: env_parse_or("LLM_TEMPERATURE", self.llm_temperature),
            llm_max_tokens: env_parse_or("LLM_MAX_TOKENS", self.llm_max_tokens),
            vision_api_key: env_or("VISION_API_KEY", self.vision_api_key),
            vision_api_base_url: env_or("VISION_API_BASE_URL", self.vision_api_base_url),
            oracle_timeout_secs: env_parse_or("ORACLE_TIMEOUT_SECS", self.oracle_timeout_secs),
            max_concurrent_labels: env_parse_or("MAX_CONCURRENT_LABELS", self.max_concurrent_labels),
            rubric_excerpt_chars: env_parse_or("RUBRIC_EXCERPT_CHARS", self.rubric_excerpt_chars),
            heading_size_pt: env_parse_or("HEADING_SIZE_PT", self.heading_size_pt),
            pdftotext_bin: env_or("PDFTOTEXT_BIN", self.pdftotext_bin),
            verbose_logging: env_parse_or("VERBOSE_LOGGING", self.verbose_logging),
        }
    }
}

fn env_or(name: &str, fallback: String) -> String {
    std::env::var(name).unwrap_or(fallback)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(fallback)
}
