//! 评估请求
//!
//! 封装"评估哪份演示文稿、按什么标准、面向谁"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Result};
use crate::models::{Persona, PresentationBrief};

/// 一次评估请求
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// 演示文稿（.pptx）
    pub deck: PathBuf,

    /// 评分标准（.pdf），学校类受众必填
    pub rubric: Option<PathBuf>,

    pub persona: Persona,

    pub brief: PresentationBrief,
}

impl EvaluationRequest {
    pub fn new(deck: impl Into<PathBuf>, persona: Persona) -> Self {
        Self {
            deck: deck.into(),
            rubric: None,
            persona,
            brief: PresentationBrief::default(),
        }
    }

    pub fn with_rubric(mut self, rubric: impl Into<PathBuf>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    pub fn with_brief(mut self, brief: PresentationBrief) -> Self {
        self.brief = brief;
        self
    }

    /// 检查文件类型与存在性，以及受众与评分标准的搭配
    pub fn validate(&self) -> Result<()> {
        check_file(&self.deck, "pptx")?;

        match (&self.rubric, self.persona.is_school_level()) {
            (Some(rubric), true) => check_file(rubric, "pdf"),
            (None, true) => Err(EvalError::invalid_input(
                self.deck.display().to_string(),
                format!("受众 {} 需要提供评分标准", self.persona),
            )),
            (_, false) => Ok(()),
        }
    }
}

/// 扩展名不区分大小写
fn check_file(path: &Path, extension: &str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if !matches {
        return Err(EvalError::invalid_input(
            path.display().to_string(),
            format!("文件类型必须为 .{}", extension),
        ));
    }
    if !path.is_file() {
        return Err(EvalError::invalid_input(
            path.display().to_string(),
            "文件不存在",
        ));
    }
    Ok(())
}

impl Display for EvaluationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[演示文稿 {} 受众#{}", self.deck.display(), self.persona)?;
        if let Some(rubric) = &self.rubric {
            write!(f, " 评分标准 {}", rubric.display())?;
        }
        write!(f, "]")
    }
}
