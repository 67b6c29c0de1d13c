//! 错误类型
//!
//! 每个阶段返回 `Result<T, EvalError>`；是否降级继续由流程层决定

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 幻灯片结构提取
    ContentExtraction,
    /// 评分标准有效性检查
    RubricValidity,
    /// 评分维度提取
    RubricMeasures,
    /// 分值档位提取
    RubricPointScale,
    /// 评分表格提取
    RubricTable,
    /// 图片标注
    ImageLabeling,
    /// 评分调用
    Evaluation,
    /// 开放式反馈
    Feedback,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::ContentExtraction => "content_extraction",
            Stage::RubricValidity => "rubric_validity",
            Stage::RubricMeasures => "rubric_measures",
            Stage::RubricPointScale => "rubric_point_scale",
            Stage::RubricTable => "rubric_table",
            Stage::ImageLabeling => "image_labeling",
            Stage::Evaluation => "evaluation",
            Stage::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 评估错误
#[derive(Error, Debug)]
pub enum EvalError {
    /// 输入文件缺失、类型不符或无法解析
    #[error("输入无效 ({path}): {reason}")]
    InvalidInput { path: String, reason: String },

    /// 文档结构损坏（zip / xml）
    #[error("文档解析失败: {0}")]
    Document(String),

    /// oracle 调用失败或超时
    #[error("oracle 调用失败 [{stage}]: {message}")]
    OracleUnavailable { stage: Stage, message: String },

    /// oracle 返回内容无法按约定解析
    #[error("oracle 返回格式错误 [{stage}]: {reply}")]
    OracleMalformed { stage: Stage, reply: String },

    /// 上传的文件不是评分标准
    #[error("上传的文件不是有效的评分标准")]
    InvalidRubric,

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub fn invalid_input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// 把 oracle 客户端的 anyhow 错误转换为阶段错误
    pub fn oracle(stage: Stage, err: anyhow::Error) -> Self {
        EvalError::OracleUnavailable {
            stage,
            message: format!("{:#}", err),
        }
    }

    pub fn malformed(stage: Stage, reply: impl Into<String>) -> Self {
        EvalError::OracleMalformed {
            stage,
            reply: reply.into(),
        }
    }

    /// 调用方需要看到的错误（流程不会继续）
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EvalError::InvalidInput { .. } | EvalError::Document(_) | EvalError::InvalidRubric
        )
    }
}

impl From<zip::result::ZipError> for EvalError {
    fn from(err: zip::result::ZipError) -> Self {
        EvalError::Document(format!("zip: {}", err))
    }
}

impl From<quick_xml::Error> for EvalError {
    fn from(err: quick_xml::Error) -> Self {
        EvalError::Document(format!("xml: {}", err))
    }
}

/// 阶段降级记录
///
/// 与降级后的默认值一起返回，调用方据此区分"得 0 分"和"oracle 失败"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageWarning {
    pub stage: Stage,
    pub message: String,
}

impl StageWarning {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn from_error(stage: Stage, err: &EvalError) -> Self {
        Self::new(stage, err.to_string())
    }
}

impl fmt::Display for StageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// 评估结果类型
pub type Result<T> = std::result::Result<T, EvalError>;
