/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::{Assessment, EvaluationReport};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时按 `verbose` 选择 debug 或 info。
/// 重复初始化会被忽略
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str, max_concurrent_labels: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 演示文稿评估 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", model_name);
    info!("📊 图片标注最大并发数: {}", max_concurrent_labels);
    info!("{}", "=".repeat(60));
}

/// 打印评估报告摘要
pub fn log_report_summary(report: &EvaluationReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评估结果");
    info!(
        "完成时间: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("受众: {}  幻灯片: {} 张", report.persona, report.slide_count);

    match &report.assessment {
        Assessment::Rubric(result) => {
            match result.percentage() {
                Some(ratio) => info!(
                    "✅ 得分: {}/{} ({:.1}%)",
                    result.total_score,
                    result.max_score,
                    ratio * 100.0
                ),
                None => info!("✅ 得分: {}/{}（最高分为 0）", result.total_score, result.max_score),
            }
            info!("🏅 等级: {}", result.grade);
        }
        Assessment::Open { .. } => info!("得分: 不适用（开放式点评）"),
    }
    info!("💬 反馈 {} 条", report.assessment.feedback().len());

    for warning in &report.warnings {
        warn!("⚠️ {}", warning);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
