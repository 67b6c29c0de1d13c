//! 图片标注服务 - 业务能力层
//!
//! 每张图片重新编码为 PNG 后并发送往标注 oracle，
//! 结果按 (幻灯片序号, 形状序号) 归位，与完成顺序无关

use futures::stream::{self, StreamExt};
use image::ImageFormat;
use std::io::Cursor;
use tracing::{debug, info, warn};

use crate::clients::VisionOracle;
use crate::error::{EvalError, Result, Stage, StageWarning};
use crate::models::{ImageBlob, ImageLabelSet, SlideRecord};

/// 图片标注服务
pub struct LabelingService<'a, V> {
    oracle: &'a V,
    max_concurrent: usize,
}

impl<'a, V: VisionOracle> LabelingService<'a, V> {
    pub fn new(oracle: &'a V, max_concurrent: usize) -> Self {
        Self {
            oracle,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 标注所有幻灯片中的图片
    ///
    /// 每张图片恰好对应一组标签：无法解码或标注失败的图片得到空标签，并记录为降级
    pub async fn label_slides(
        &self,
        slides: &[SlideRecord],
    ) -> (Vec<ImageLabelSet>, Vec<StageWarning>) {
        let images: Vec<&ImageBlob> = slides.iter().flat_map(|s| s.images.iter()).collect();
        if images.is_empty() {
            return (Vec::new(), Vec::new());
        }
        info!("开始标注 {} 张图片（并发 {}）", images.len(), self.max_concurrent);

        let mut outcomes: Vec<(usize, usize, Result<Vec<String>>)> = stream::iter(images)
            .map(|blob| async move {
                let labels = self.label_one(blob).await;
                (blob.slide_index, blob.ordinal, labels)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        outcomes.sort_by_key(|(slide_index, ordinal, _)| (*slide_index, *ordinal));

        let mut label_sets = Vec::with_capacity(outcomes.len());
        let mut warnings = Vec::new();
        for (slide_index, ordinal, outcome) in outcomes {
            match outcome {
                Ok(labels) => label_sets.push(ImageLabelSet::new(slide_index, labels)),
                Err(EvalError::Document(reason)) => {
                    warn!("幻灯片 {} 的第 {} 张图片无法解码: {}", slide_index, ordinal + 1, reason);
                    warnings.push(StageWarning::new(
                        Stage::ImageLabeling,
                        format!("幻灯片 {} 图片 {}: {}", slide_index, ordinal + 1, reason),
                    ));
                    label_sets.push(ImageLabelSet::new(slide_index, Vec::new()));
                }
                Err(err) => {
                    warn!("幻灯片 {} 的第 {} 张图片标注失败: {}", slide_index, ordinal + 1, err);
                    warnings.push(StageWarning::from_error(Stage::ImageLabeling, &err));
                    label_sets.push(ImageLabelSet::new(slide_index, Vec::new()));
                }
            }
        }

        info!(
            "✓ 图片标注完成: {} 组标签，{} 项降级",
            label_sets.len(),
            warnings.len()
        );
        (label_sets, warnings)
    }

    async fn label_one(&self, blob: &ImageBlob) -> Result<Vec<String>> {
        let png = encode_png(&blob.bytes)?;
        let labels = self
            .oracle
            .detect_labels(&png)
            .await
            .map_err(|e| EvalError::oracle(Stage::ImageLabeling, e))?;
        debug!(
            "幻灯片 {} 图片 {} 标签: {:?}",
            blob.slide_index, blob.ordinal, labels
        );
        Ok(labels)
    }
}

/// 解码任意支持的格式并重新编码为 PNG
pub fn encode_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| EvalError::Document(format!("无法解码图片: {}", e)))?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| EvalError::Document(format!("PNG 编码失败: {}", e)))?;
    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::ScriptedVision;
    use image::{Rgb, RgbImage};

    /// 用颜色区分图片，便于在 oracle 中识别
    fn png_bytes(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, Rgb([shade, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn shade_of(png: &[u8]) -> u8 {
        image::load_from_memory(png).unwrap().to_rgb8().get_pixel(0, 0)[0]
    }

    fn slide(index: usize, images: Vec<Vec<u8>>) -> SlideRecord {
        SlideRecord {
            index,
            title: String::new(),
            subtitle: String::new(),
            body_text: String::new(),
            images: images
                .into_iter()
                .enumerate()
                .map(|(ordinal, bytes)| ImageBlob {
                    slide_index: index,
                    ordinal,
                    name: format!("Picture {}", ordinal + 1),
                    bytes,
                })
                .collect(),
        }
    }

    #[test]
    fn test_encode_png_rejects_garbage() {
        assert!(encode_png(&png_bytes(9)).is_ok());
        assert!(matches!(encode_png(b"definitely not an image"), Err(EvalError::Document(_))));
    }

    #[tokio::test]
    async fn test_labels_follow_slide_order() {
        let vision = ScriptedVision::new(|png: &[u8]| Ok(vec![format!("shade {}", shade_of(png))]));
        let service = LabelingService::new(&vision, 3);
        let slides = vec![
            slide(1, vec![png_bytes(10), png_bytes(11)]),
            slide(2, vec![]),
            slide(3, vec![png_bytes(30)]),
        ];

        let (labels, warnings) = service.label_slides(&slides).await;

        assert!(warnings.is_empty());
        assert_eq!(
            labels,
            vec![
                ImageLabelSet::new(1, vec!["shade 10".to_string()]),
                ImageLabelSet::new(1, vec!["shade 11".to_string()]),
                ImageLabelSet::new(3, vec!["shade 30".to_string()]),
            ]
        );
    }

    #[tokio::test]
    async fn test_failures_degrade_per_image() {
        let vision = ScriptedVision::new(|png: &[u8]| {
            if shade_of(png) == 0 {
                Err(anyhow::anyhow!("quota exceeded"))
            } else {
                Ok(vec!["Chart".to_string()])
            }
        });
        let service = LabelingService::new(&vision, 2);
        let slides = vec![slide(1, vec![png_bytes(0), b"broken".to_vec(), png_bytes(5)])];

        let (labels, warnings) = service.label_slides(&slides).await;

        assert_eq!(
            labels,
            vec![
                ImageLabelSet::new(1, vec![]),
                ImageLabelSet::new(1, vec![]),
                ImageLabelSet::new(1, vec!["Chart".to_string()]),
            ]
        );
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.stage == Stage::ImageLabeling));
    }

    #[tokio::test]
    async fn test_undecodable_image_keeps_empty_set() {
        let vision = ScriptedVision::new(|_: &[u8]| panic!("无法解码的图片不应送去标注"));
        let service = LabelingService::new(&vision, 1);

        let (labels, warnings) = service
            .label_slides(&[slide(4, vec![b"EMF placeholder".to_vec()])])
            .await;

        assert_eq!(labels, vec![ImageLabelSet::new(4, vec![])]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].stage, Stage::ImageLabeling);
    }

    #[tokio::test]
    async fn test_no_images_no_calls() {
        let vision = ScriptedVision::new(|_: &[u8]| panic!("不应调用"));
        let service = LabelingService::new(&vision, 4);

        let (labels, warnings) = service.label_slides(&[slide(1, vec![])]).await;
        assert!(labels.is_empty());
        assert!(warnings.is_empty());
    }
}
