//! 文档解析（不调用任何 oracle）
//!
//! - `pptx` - 幻灯片包解析为顶层形状
//! - `pdf` - 评分标准文本提取
//! - `table` - 版式文本中的表格识别与跨页拼接

pub mod pdf;
pub mod pptx;
pub mod table;

pub use pdf::{load_rubric_document, RubricDocument};
pub use pptx::{ParsedSlide, PptxParser};
