//! 演示文稿评估流程 - 流程层
//!
//! 核心职责：定义"一份演示文稿"的完整评估流程，并决定每个阶段失败后的处理方式
//!
//! 流程顺序：
//! 1. 校验输入 → 提取幻灯片
//! 2. 评分标准：有效性 → 维度 → 分值档位 → 表格（仅学校类受众）
//! 3. 图片标注（并发）
//! 4. 评分 + 汇总，或开放式点评
//!
//! 有效性检查失败直接拒绝；其他 oracle 阶段失败时使用默认值继续，并记录 `StageWarning`

use chrono::Local;
use tracing::{error, info, warn};

use crate::clients::{TextOracle, VisionOracle};
use crate::config::Config;
use crate::documents::{load_rubric_document, RubricDocument};
use crate::error::{EvalError, Result, Stage, StageWarning};
use crate::models::{Assessment, EvaluationReport, ImageLabelSet, RubricSpec, SlideRecord};
use crate::services::{
    scoring, ContentExtractor, ContentSummary, EvaluationService, FeedbackService,
    LabelingService, ParsedReply, RubricService,
};
use crate::workflow::evaluation_ctx::EvaluationRequest;

/// oracle 失败时写入反馈的前缀
pub const ORACLE_ERROR_FEEDBACK: &str = "An error occurred while generating feedback";

/// 演示文稿评估流程
///
/// - 编排完整的评估流程
/// - 决定哪些错误拒绝请求、哪些错误降级继续
/// - 只依赖业务能力（services）和 oracle 抽象
pub struct EvaluationFlow<L, V> {
    llm: L,
    vision: V,
    extractor: ContentExtractor,
    pdftotext_bin: String,
    rubric_excerpt_chars: usize,
    max_concurrent_labels: usize,
}

impl<L: TextOracle, V: VisionOracle> EvaluationFlow<L, V> {
    pub fn new(config: &Config, llm: L, vision: V) -> Self {
        Self {
            llm,
            vision,
            extractor: ContentExtractor::new(config.heading_size_pt),
            pdftotext_bin: config.pdftotext_bin.clone(),
            rubric_excerpt_chars: config.rubric_excerpt_chars,
            max_concurrent_labels: config.max_concurrent_labels,
        }
    }

    pub async fn run(&self, request: &EvaluationRequest) -> Result<EvaluationReport> {
        info!("{} 开始评估", request);
        request.validate().inspect_err(|e| error!("{} 请求被拒绝: {}", request, e))?;

        let slides = self
            .extractor
            .extract_path(&request.deck)
            .await
            .inspect_err(|e| error!("{} 幻灯片提取失败: {}", request, e))?;

        let rubric_path = request.rubric.as_deref().filter(|_| request.persona.is_school_level());
        if request.rubric.is_some() && rubric_path.is_none() {
            warn!("受众 {} 不使用评分标准，忽略上传的文件", request.persona);
        }

        let mut warnings = Vec::new();
        let rubric = match rubric_path {
            Some(path) => {
                let doc = load_rubric_document(path, &self.pdftotext_bin).await?;
                Some(self.parse_rubric(&doc, &mut warnings).await?)
            }
            None => None,
        };

        let (image_labels, label_warnings) =
            LabelingService::new(&self.vision, self.max_concurrent_labels)
                .label_slides(&slides)
                .await;
        warnings.extend(label_warnings);

        let assessment = self
            .assess(request, &slides, &image_labels, rubric.as_ref(), &mut warnings)
            .await;

        let report = EvaluationReport {
            persona: request.persona,
            slide_count: slides.len(),
            assessment,
            rubric,
            image_labels,
            warnings,
            generated_at: Local::now(),
        };

        if report.is_degraded() {
            warn!("{} 评估完成，但有 {} 个阶段降级", request, report.warnings.len());
        } else {
            info!("{} ✓ 评估完成", request);
        }
        Ok(report)
    }

    /// 解析评分标准
    ///
    /// 有效性检查失败（包括 oracle 不可用）时拒绝；维度和分值档位失败时降级为空
    pub async fn parse_rubric(
        &self,
        doc: &RubricDocument,
        warnings: &mut Vec<StageWarning>,
    ) -> Result<RubricSpec> {
        let service = RubricService::new(&self.llm, self.rubric_excerpt_chars);

        let is_rubric = service.check_validity(doc).await.unwrap_or_else(|e| {
            warn!("评分标准有效性检查失败，按无效处理: {}", e);
            false
        });
        if !is_rubric {
            error!("上传的文件不是评分标准");
            return Err(EvalError::InvalidRubric);
        }

        let measures = service
            .extract_measures(doc)
            .await
            .unwrap_or_else(|e| degrade(Stage::RubricMeasures, e, warnings));
        let point_scale = service
            .extract_point_scale(doc)
            .await
            .unwrap_or_else(|e| degrade(Stage::RubricPointScale, e, warnings));
        let table = service.extract_table(doc);

        Ok(RubricSpec {
            measures,
            point_scale,
            table,
        })
    }

    async fn assess(
        &self,
        request: &EvaluationRequest,
        slides: &[SlideRecord],
        image_labels: &[ImageLabelSet],
        rubric: Option<&RubricSpec>,
        warnings: &mut Vec<StageWarning>,
    ) -> Assessment {
        let content = ContentSummary::from_slides(slides, image_labels);

        match rubric {
            Some(rubric) => {
                let parsed = EvaluationService::new(&self.llm)
                    .evaluate(rubric, &content, request.persona, &request.brief)
                    .await
                    .unwrap_or_else(|e| {
                        let line = error_feedback_line(&e);
                        degrade::<()>(Stage::Evaluation, e, warnings);
                        ParsedReply {
                            scores: Vec::new(),
                            feedback: vec![line],
                        }
                    });
                let result = scoring::aggregate(parsed, rubric);
                info!(
                    "{} 得分 {}/{}，等级 {}",
                    request, result.total_score, result.max_score, result.grade
                );
                Assessment::Rubric(result)
            }
            None => {
                let feedback = FeedbackService::new(&self.llm)
                    .compose_open(&content, request.persona, &request.brief)
                    .await
                    .unwrap_or_else(|e| {
                        let line = error_feedback_line(&e);
                        degrade::<()>(Stage::Feedback, e, warnings);
                        vec![line]
                    });
                Assessment::Open { feedback }
            }
        }
    }
}

/// 记录降级并返回默认值
fn degrade<T: Default>(stage: Stage, err: EvalError, warnings: &mut Vec<StageWarning>) -> T {
    warn!("[{}] 降级继续: {}", stage, err);
    warnings.push(StageWarning::from_error(stage, &err));
    T::default()
}

fn error_feedback_line(err: &EvalError) -> String {
    format!("{}: {}", ORACLE_ERROR_FEEDBACK, err)
}
