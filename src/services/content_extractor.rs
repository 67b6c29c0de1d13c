//! 幻灯片结构提取 - 业务能力层
//!
//! 只负责把演示文稿拆成逐页的标题 / 副标题 / 正文 / 图片，不调用任何 oracle

use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::documents::{ParsedSlide, PptxParser};
use crate::error::{EvalError, Result};
use crate::models::{ImageBlob, SlideRecord, SlideShape, TextBearing};

/// 幻灯片内容提取器
pub struct ContentExtractor {
    parser: PptxParser,
    /// 标题字号阈值（磅）
    heading_size_pt: f64,
}

impl ContentExtractor {
    pub fn new(heading_size_pt: f64) -> Self {
        Self {
            parser: PptxParser::new(),
            heading_size_pt,
        }
    }

    /// 从文件提取
    pub async fn extract_path(&self, path: &Path) -> Result<Vec<SlideRecord>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EvalError::invalid_input(path.display().to_string(), format!("无法读取演示文稿: {}", e))
        })?;
        self.extract_bytes(&bytes).map_err(|e| match e {
            EvalError::Document(reason) => {
                EvalError::invalid_input(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// 从内存中的 .pptx 提取；输入不会被修改或保留
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Vec<SlideRecord>> {
        let slides = self.parser.parse(Cursor::new(bytes))?;
        let records: Vec<SlideRecord> = slides.iter().map(|s| self.build_record(s)).collect();

        info!(
            "✓ 提取完成: {} 张幻灯片, {} 张图片",
            records.len(),
            records.iter().map(|r| r.images.len()).sum::<usize>()
        );
        Ok(records)
    }

    /// 由一张幻灯片的顶层形状构建记录
    pub fn build_record(&self, slide: &ParsedSlide) -> SlideRecord {
        let title = slide
            .shapes
            .iter()
            .find(|shape| shape.has_text())
            .map(TextBearing::text)
            .unwrap_or_default();

        let subtitle = slide
            .shapes
            .iter()
            .find_map(|shape| match shape {
                SlideShape::Text(text) if text.is_multi_paragraph() => {
                    Some(text.paragraphs[1].text())
                }
                _ => None,
            })
            .unwrap_or_default();

        let body_text = slide
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                SlideShape::Text(text) => Some(text),
                _ => None,
            })
            .flat_map(|text| text.runs())
            .filter(|run| run.size_pt.map_or(true, |size| size < self.heading_size_pt))
            .map(|run| run.text.trim())
            .filter(|text| !text.is_empty() && *text != title && *text != subtitle)
            .collect::<Vec<_>>()
            .join("\n");

        let images = slide
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                SlideShape::Picture(picture) => Some(picture),
                _ => None,
            })
            .enumerate()
            .map(|(ordinal, picture)| ImageBlob {
                slide_index: slide.number,
                ordinal,
                name: picture.name.clone(),
                bytes: picture.bytes.clone(),
            })
            .collect();

        debug!("幻灯片 {} 标题: {}", slide.number, title);

        SlideRecord {
            index: slide.number,
            title,
            subtitle,
            body_text,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OtherShape, Paragraph, PictureShape, TextRun, TextShape};

    fn text_shape(paragraphs: &[&[(&str, Option<f64>)]]) -> SlideShape {
        SlideShape::Text(TextShape {
            name: String::new(),
            paragraphs: paragraphs
                .iter()
                .map(|runs| {
                    Paragraph::new(
                        runs.iter()
                            .map(|(text, size)| TextRun::new(*text, *size))
                            .collect(),
                    )
                })
                .collect(),
        })
    }

    fn slide(shapes: Vec<SlideShape>) -> ParsedSlide {
        ParsedSlide {
            number: 3,
            part_name: "ppt/slides/slide3.xml".to_string(),
            shapes,
        }
    }

    #[test]
    fn test_title_is_first_shape_with_text() {
        let extractor = ContentExtractor::new(24.0);
        let record = extractor.build_record(&slide(vec![
            SlideShape::Other(OtherShape::default()),
            text_shape(&[&[("   ", None)]]),
            text_shape(&[&[("Reciclaje", Some(40.0))]]),
            text_shape(&[&[("Otro", None)]]),
        ]));

        assert_eq!(record.index, 3);
        assert_eq!(record.title, "Reciclaje");
        assert_eq!(record.subtitle, "");
    }

    #[test]
    fn test_subtitle_from_first_multi_paragraph_shape() {
        let extractor = ContentExtractor::new(24.0);
        let record = extractor.build_record(&slide(vec![
            text_shape(&[&[("Título", Some(40.0))]]),
            text_shape(&[&[("Línea uno", None)], &[("Subtítulo", None)], &[("Tres", None)]]),
            text_shape(&[&[("A", None)], &[("B", None)]]),
        ]));

        assert_eq!(record.subtitle, "Subtítulo");
    }

    #[test]
    fn test_body_excludes_headings_title_and_subtitle() {
        let extractor = ContentExtractor::new(24.0);
        let record = extractor.build_record(&slide(vec![
            text_shape(&[&[("Agua", Some(18.0))]]),
            text_shape(&[
                &[("Intro", Some(20.0))],
                &[("Ciclo del agua", None)],
                &[("Grande", Some(32.0)), ("  Evaporación ", Some(18.0))],
                &[("Agua", None), ("Límite", Some(24.0))],
            ]),
        ]));

        assert_eq!(record.title, "Agua");
        assert_eq!(record.subtitle, "Ciclo del agua");
        assert_eq!(record.body_text, "Intro\nEvaporación");
    }

    #[test]
    fn test_images_keep_shape_order() {
        let extractor = ContentExtractor::new(24.0);
        let picture = |name: &str, bytes: &[u8]| {
            SlideShape::Picture(PictureShape {
                name: name.to_string(),
                part_name: String::new(),
                bytes: bytes.to_vec(),
            })
        };
        let record = extractor.build_record(&slide(vec![
            picture("first", &[1]),
            text_shape(&[&[("Fotos", None)]]),
            picture("second", &[2, 2]),
        ]));

        assert_eq!(record.images.len(), 2);
        assert_eq!(record.images[0].name, "first");
        assert_eq!(record.images[1].ordinal, 1);
        assert_eq!(record.images[1].slide_index, 3);
        assert_eq!(record.images[1].bytes, vec![2, 2]);
    }

    #[test]
    fn test_empty_slide() {
        let record = ContentExtractor::new(24.0).build_record(&slide(vec![]));
        assert_eq!(record.title, "");
        assert_eq!(record.body_text, "");
        assert!(record.images.is_empty());
    }

    #[test]
    fn test_missing_file_is_invalid_input() {
        let extractor = ContentExtractor::new(24.0);
        let err = tokio_test::block_on(extractor.extract_path(Path::new("/nonexistent/deck.pptx")))
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_document_errors() {
        let err = ContentExtractor::new(24.0)
            .extract_bytes(b"not a zip archive")
            .unwrap_err();
        assert!(matches!(err, EvalError::Document(_)));
    }
}
