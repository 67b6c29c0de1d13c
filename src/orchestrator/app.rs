//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：根据配置创建语言模型与图片标注客户端
//! 2. **资源管理**：持有两个 oracle 客户端，交给评估流程使用
//! 3. **结果输出**：记录评估报告摘要
//!
//! 不处理任何阶段的细节，全部委托给 `workflow::EvaluationFlow`

use anyhow::Result;
use tracing::info;

use crate::clients::{LlmClient, VisionClient};
use crate::config::Config;
use crate::error::Result as EvalResult;
use crate::models::EvaluationReport;
use crate::utils::logging::{log_report_summary, log_startup};
use crate::workflow::{EvaluationFlow, EvaluationRequest};

/// 应用主结构
pub struct App {
    flow: EvaluationFlow<LlmClient, VisionClient>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: &Config) -> Result<Self> {
        let llm = LlmClient::new(config);
        log_startup(llm.model_name(), config.max_concurrent_labels);

        let vision = VisionClient::new(config)?;
        info!("✓ oracle 客户端已就绪");

        Ok(Self {
            flow: EvaluationFlow::new(config, llm, vision),
        })
    }

    /// 评估一份演示文稿
    ///
    /// 被拒绝的请求（输入无效、评分标准无效）以 `EvalError` 返回，调用方据此决定退出码
    pub async fn run(&self, request: &EvaluationRequest) -> EvalResult<EvaluationReport> {
        let report = self.flow.run(request).await?;
        log_report_summary(&report);
        Ok(report)
    }
}
