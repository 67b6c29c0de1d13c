//! 评分标准 PDF 的文本提取
//!
//! 调用 poppler 的 `pdftotext`：纯文本用于 oracle 调用，`-layout` 分页文本用于表格识别

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::documents::table;
use crate::error::{EvalError, Result};
use crate::models::Grid;

/// 已加载的评分标准文档
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RubricDocument {
    /// 全文（不保留版式）
    pub text: String,
    /// 按页拆分的保留版式文本
    pub layout_pages: Vec<String>,
}

impl RubricDocument {
    /// 逐页识别表格并拼接
    pub fn table(&self) -> Option<Grid> {
        table::stitch_pages(self.layout_pages.iter().map(|page| table::detect_grid(page)))
    }

    /// 文本开头的前 `max_chars` 个字符
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }
}

/// 提取评分标准文档
pub async fn load_rubric_document(pdf_path: &Path, pdftotext_bin: &str) -> Result<RubricDocument> {
    let text = run_pdftotext(pdf_path, pdftotext_bin, false).await?;
    if text.trim().is_empty() {
        return Err(EvalError::invalid_input(
            pdf_path.display().to_string(),
            "评分标准中没有可提取的文本",
        ));
    }

    let layout = run_pdftotext(pdf_path, pdftotext_bin, true).await?;
    let layout_pages = split_pages(&layout);
    debug!(
        "评分标准文本 {} 字符，共 {} 页",
        text.chars().count(),
        layout_pages.len()
    );

    Ok(RubricDocument { text, layout_pages })
}

async fn run_pdftotext(pdf_path: &Path, pdftotext_bin: &str, layout: bool) -> Result<String> {
    let mut command = Command::new(pdftotext_bin);
    command.arg("-enc").arg("UTF-8");
    if layout {
        command.arg("-layout");
    }
    command.arg(pdf_path).arg("-");

    let output = command.output().await.map_err(|e| {
        EvalError::invalid_input(
            pdf_path.display().to_string(),
            format!("无法执行 {}: {}", pdftotext_bin, e),
        )
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EvalError::invalid_input(
            pdf_path.display().to_string(),
            format!("{} 返回非零状态: {}", pdftotext_bin, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
}

/// 按换页符拆分页面，去掉末尾的空白页
pub fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split('\u{000C}').map(str::to_string).collect();
    while pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }
    pages
}
