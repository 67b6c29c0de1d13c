//! 评分服务 - 业务能力层
//!
//! 一次评估只调用一次 oracle；回复解析永远不会失败

use tracing::{debug, info};

use crate::clients::TextOracle;
use crate::error::{EvalError, Result, Stage};
use crate::models::{Persona, PresentationBrief, RubricSpec};
use crate::services::prompts::{self, ContentSummary};
use crate::services::reply_parser::{parse_evaluation_reply, ParsedReply};
use crate::utils::logging::truncate_text;

/// 按评分标准打分
pub struct EvaluationService<'a, L> {
    oracle: &'a L,
}

impl<'a, L: TextOracle> EvaluationService<'a, L> {
    pub fn new(oracle: &'a L) -> Self {
        Self { oracle }
    }

    /// 调用 oracle 并解析 `维度: 分数` 回复
    ///
    /// 分数行同时回显到反馈中
    pub async fn evaluate(
        &self,
        rubric: &RubricSpec,
        content: &ContentSummary,
        persona: Persona,
        brief: &PresentationBrief,
    ) -> Result<ParsedReply> {
        let prompt = prompts::evaluation_prompt(rubric, content, persona, brief);
        debug!("评分提示词 {} 字符", prompt.chars().count());

        let reply = self
            .oracle
            .chat(prompts::EVALUATION_ROLE, &prompt)
            .await
            .map_err(|e| EvalError::oracle(Stage::Evaluation, e))?;
        debug!("评分回复: {}", truncate_text(&reply, 300));

        let parsed = parse_evaluation_reply(&reply, true);
        info!(
            "✓ 评分完成: {} 个维度，合计 {} 分",
            parsed.scores.len(),
            parsed.total_score()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::ScriptedOracle;
    use crate::models::MeasureScore;

    fn rubric() -> RubricSpec {
        RubricSpec {
            measures: vec!["Content".to_string(), "Design".to_string()],
            point_scale: vec![10],
            table: None,
        }
    }

    #[tokio::test]
    async fn test_single_call_and_parse() {
        let oracle = ScriptedOracle::new(|_: &str, _: &str| {
            Ok("Content: 9/10\nDesign: 10/10\nGreat use of images".to_string())
        });
        let service = EvaluationService::new(&oracle);

        let parsed = service
            .evaluate(
                &rubric(),
                &ContentSummary::default(),
                Persona::University,
                &PresentationBrief::default(),
            )
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 1);
        assert_eq!(
            parsed.scores,
            vec![MeasureScore::new("Content", 9), MeasureScore::new("Design", 10)]
        );
        assert_eq!(parsed.feedback.len(), 3);

        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls[0].0, prompts::EVALUATION_ROLE);
        assert!(calls[0].1.contains("university students"));
    }

    #[tokio::test]
    async fn test_oracle_error() {
        let oracle = ScriptedOracle::new(|_: &str, _: &str| Err(anyhow::anyhow!("connection reset")));
        let service = EvaluationService::new(&oracle);

        let err = service
            .evaluate(
                &rubric(),
                &ContentSummary::default(),
                Persona::Primary,
                &PresentationBrief::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::OracleUnavailable {
                stage: Stage::Evaluation,
                ..
            }
        ));
    }
}
