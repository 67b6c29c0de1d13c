use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::StageWarning;
use crate::models::persona::Persona;
use crate::models::rubric::RubricSpec;

/// 单张图片的标注结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageLabelSet {
    pub slide_index: usize,
    pub labels: Vec<String>,
}

impl ImageLabelSet {
    pub fn new(slide_index: usize, labels: Vec<String>) -> Self {
        Self {
            slide_index,
            labels,
        }
    }

    /// 逗号连接的标签串
    pub fn joined(&self) -> String {
        self.labels.join(", ")
    }
}

/// 单个评分维度的得分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureScore {
    pub measure: String,
    pub score: u32,
}

impl MeasureScore {
    pub fn new(measure: impl Into<String>, score: u32) -> Self {
        Self {
            measure: measure.into(),
            score,
        }
    }
}

/// 按评分标准评估的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub total_score: u64,
    pub max_score: u64,
    /// 1..=7；最高分为 0 时为 0
    pub grade: u8,
    pub feedback: Vec<String>,
    pub measure_scores: Vec<MeasureScore>,
}

impl EvaluationResult {
    /// 得分比例，最高分为 0 时无意义
    pub fn percentage(&self) -> Option<f64> {
        (self.max_score > 0).then(|| self.total_score as f64 / self.max_score as f64)
    }
}

/// 评估方式
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assessment {
    /// 学校类受众：按评分标准打分
    Rubric(EvaluationResult),
    /// 职场 / 通用受众：只有文字建议，分数不适用
    Open { feedback: Vec<String> },
}

impl Assessment {
    pub fn feedback(&self) -> &[String] {
        match self {
            Assessment::Rubric(result) => &result.feedback,
            Assessment::Open { feedback } => feedback,
        }
    }

    pub fn as_rubric(&self) -> Option<&EvaluationResult> {
        match self {
            Assessment::Rubric(result) => Some(result),
            Assessment::Open { .. } => None,
        }
    }
}

/// 一次评估请求的完整报告
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub persona: Persona,
    pub slide_count: usize,
    pub assessment: Assessment,
    pub rubric: Option<RubricSpec>,
    pub image_labels: Vec<ImageLabelSet>,
    /// 降级阶段的记录；为空表示所有 oracle 调用都成功
    pub warnings: Vec<StageWarning>,
    pub generated_at: DateTime<Local>,
}

impl EvaluationReport {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
