//! 幻灯片数据模型
//!
//! 形状采用带标签的枚举（文本 / 图片 / 其他），"是否有文本"通过 `TextBearing` 能力表达

use serde::Serialize;

/// 具备文本能力的幻灯片元素
pub trait TextBearing {
    /// 元素的完整文本（段落之间以换行连接）
    fn text(&self) -> String;

    /// 是否包含非空白文本
    fn has_text(&self) -> bool {
        !self.text().trim().is_empty()
    }
}

/// 文本片段（对应 `a:r`）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub text: String,
    /// 字号（磅），未显式设置时为 None
    pub size_pt: Option<f64>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, size_pt: Option<f64>) -> Self {
        Self {
            text: text.into(),
            size_pt,
        }
    }
}

/// 段落（对应 `a:p`）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// 带文本框的形状
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextShape {
    pub name: String,
    pub paragraphs: Vec<Paragraph>,
}

impl TextShape {
    /// 文本框是否有多个段落
    pub fn is_multi_paragraph(&self) -> bool {
        self.paragraphs.len() > 1
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }
}

impl TextBearing for TextShape {
    fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 图片形状
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PictureShape {
    pub name: String,
    /// 图片在包内的路径，如 `ppt/media/image1.png`
    pub part_name: String,
    pub bytes: Vec<u8>,
}

impl TextBearing for PictureShape {
    fn text(&self) -> String {
        String::new()
    }
}

/// 其他形状（分组、图表、表格框等）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OtherShape {
    pub kind: String,
}

impl TextBearing for OtherShape {
    fn text(&self) -> String {
        String::new()
    }
}

/// 幻灯片顶层形状
#[derive(Debug, Clone, PartialEq)]
pub enum SlideShape {
    Text(TextShape),
    Picture(PictureShape),
    Other(OtherShape),
}

impl TextBearing for SlideShape {
    fn text(&self) -> String {
        match self {
            SlideShape::Text(shape) => shape.text(),
            SlideShape::Picture(shape) => shape.text(),
            SlideShape::Other(shape) => shape.text(),
        }
    }
}

/// 幻灯片中嵌入的图片原始数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlob {
    /// 所在幻灯片（从 1 开始）
    pub slide_index: usize,
    /// 在该幻灯片中的顺序（从 0 开始）
    pub ordinal: usize,
    pub name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// 单张幻灯片的结构化提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideRecord {
    /// 幻灯片序号（从 1 开始）
    pub index: usize,
    pub title: String,
    pub subtitle: String,
    pub body_text: String,
    pub images: Vec<ImageBlob>,
}
