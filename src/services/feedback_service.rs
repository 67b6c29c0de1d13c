//! 开放式点评服务 - 业务能力层
//!
//! 职场 / 通用受众没有评分标准，只生成改进建议

use tracing::{debug, info};

use crate::clients::TextOracle;
use crate::error::{EvalError, Result, Stage};
use crate::models::{Persona, PresentationBrief};
use crate::services::prompts::{self, ContentSummary};
use crate::services::reply_parser::split_feedback_lines;

pub struct FeedbackService<'a, L> {
    oracle: &'a L,
}

impl<'a, L: TextOracle> FeedbackService<'a, L> {
    pub fn new(oracle: &'a L) -> Self {
        Self { oracle }
    }

    /// 一次 oracle 调用，回复按行拆分为建议
    pub async fn compose_open(
        &self,
        content: &ContentSummary,
        persona: Persona,
        brief: &PresentationBrief,
    ) -> Result<Vec<String>> {
        let prompt = prompts::open_feedback_prompt(content, persona, brief);
        debug!("点评提示词 {} 字符", prompt.chars().count());

        let reply = self
            .oracle
            .chat(prompts::OPEN_FEEDBACK_ROLE, &prompt)
            .await
            .map_err(|e| EvalError::oracle(Stage::Feedback, e))?;

        let lines = split_feedback_lines(&reply);
        if lines.is_empty() {
            return Err(EvalError::malformed(Stage::Feedback, reply));
        }
        info!("✓ 生成 {} 条建议", lines.len());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::ScriptedOracle;

    #[tokio::test]
    async fn test_reply_split_into_lines() {
        let oracle = ScriptedOracle::new(|_: &str, _: &str| {
            Ok("  Use fewer bullet points.\n\nAdd a closing call to action.  \n".to_string())
        });
        let brief = PresentationBrief {
            theme: Some("Onboarding".to_string()),
            kind: None,
            goal: Some("Train new hires".to_string()),
        };

        let lines = FeedbackService::new(&oracle)
            .compose_open(&ContentSummary::default(), Persona::Professional, &brief)
            .await
            .unwrap();

        assert_eq!(
            lines,
            vec!["Use fewer bullet points.", "Add a closing call to action."]
        );
        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls[0].0, prompts::OPEN_FEEDBACK_ROLE);
        assert!(calls[0].1.contains("Goal: Train new hires"));
    }

    #[tokio::test]
    async fn test_blank_reply_is_malformed() {
        let oracle = ScriptedOracle::new(|_: &str, _: &str| Ok("   \n".to_string()));
        let err = FeedbackService::new(&oracle)
            .compose_open(&ContentSummary::default(), Persona::General, &PresentationBrief::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::OracleMalformed { stage: Stage::Feedback, .. }));
    }
}
