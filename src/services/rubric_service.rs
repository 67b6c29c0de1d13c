//! 评分标准解析服务 - 业务能力层
//!
//! 有效性、评分维度、分值档位分别是独立的一次 oracle 调用；
//! 表格直接从版式文本识别，不经过 oracle

use tracing::{debug, info};

use crate::clients::TextOracle;
use crate::documents::RubricDocument;
use crate::error::{EvalError, Result, Stage};
use crate::models::Grid;
use crate::services::prompts;
use crate::services::reply_parser::{is_affirmative, parse_measures, parse_point_scale};
use crate::utils::logging::truncate_text;

/// 评分标准解析服务
///
/// 职责：
/// - 判断文档是否为评分标准
/// - 提取评分维度和分值档位
/// - 不决定失败后是否继续，错误原样返回
pub struct RubricService<'a, L> {
    oracle: &'a L,
    excerpt_chars: usize,
}

impl<'a, L: TextOracle> RubricService<'a, L> {
    pub fn new(oracle: &'a L, excerpt_chars: usize) -> Self {
        Self {
            oracle,
            excerpt_chars,
        }
    }

    /// 文档是否为评分标准
    pub async fn check_validity(&self, doc: &RubricDocument) -> Result<bool> {
        let reply = self
            .ask(
                Stage::RubricValidity,
                prompts::RUBRIC_VALIDITY_ROLE,
                prompts::rubric_validity_prompt(doc.excerpt(self.excerpt_chars)),
            )
            .await?;
        let valid = is_affirmative(&reply);
        info!("评分标准有效性: {}", if valid { "是" } else { "否" });
        Ok(valid)
    }

    /// 评分维度
    ///
    /// 回复中没有任何非空行时返回 `OracleMalformed`
    pub async fn extract_measures(&self, doc: &RubricDocument) -> Result<Vec<String>> {
        let reply = self
            .ask(
                Stage::RubricMeasures,
                prompts::RUBRIC_MEASURES_ROLE,
                prompts::rubric_measures_prompt(doc.excerpt(self.excerpt_chars)),
            )
            .await?;
        let measures = parse_measures(&reply);
        if measures.is_empty() {
            return Err(EvalError::malformed(Stage::RubricMeasures, reply));
        }
        info!("✓ 评分维度 {} 项", measures.len());
        Ok(measures)
    }

    /// 分值档位（降序）
    ///
    /// 回复无法解析为整数列表时返回 `OracleMalformed`
    pub async fn extract_point_scale(&self, doc: &RubricDocument) -> Result<Vec<u32>> {
        let reply = self
            .ask(
                Stage::RubricPointScale,
                prompts::RUBRIC_POINT_SCALE_ROLE,
                prompts::rubric_point_scale_prompt(doc.excerpt(self.excerpt_chars)),
            )
            .await?;
        let scale = parse_point_scale(&reply);
        if scale.is_empty() {
            return Err(EvalError::malformed(Stage::RubricPointScale, reply));
        }
        info!("✓ 分值档位: {:?}", scale);
        Ok(scale)
    }

    /// 评分表格；没有识别到表格时为 None
    pub fn extract_table(&self, doc: &RubricDocument) -> Option<Grid> {
        let table = doc.table();
        match &table {
            Some(grid) => debug!("评分表格 {} 行 × {} 列", grid.rows().len(), grid.width()),
            None => debug!("评分标准中没有识别到表格"),
        }
        table
    }

    async fn ask(&self, stage: Stage, role: &str, prompt: String) -> Result<String> {
        debug!("[{}] 提示词 {} 字符", stage, prompt.chars().count());
        let reply = self
            .oracle
            .chat(role, &prompt)
            .await
            .map_err(|e| EvalError::oracle(stage, e))?;
        debug!("[{}] 回复: {}", stage, truncate_text(&reply, 200));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::ScriptedOracle;

    fn document() -> RubricDocument {
        RubricDocument {
            text: "Criterio  Excelente  Bueno\nContenido  10  8".to_string(),
            layout_pages: vec![
                "Criterio     Excelente   Bueno\nContenido    10          8\n".to_string(),
            ],
        }
    }

    fn rubric_oracle(
        validity: &'static str,
        measures: &'static str,
        scale: &'static str,
    ) -> ScriptedOracle<impl Fn(&str, &str) -> anyhow::Result<String> + Send + Sync> {
        ScriptedOracle::new(move |role: &str, _prompt: &str| {
            Ok(match role {
                prompts::RUBRIC_VALIDITY_ROLE => validity,
                prompts::RUBRIC_MEASURES_ROLE => measures,
                _ => scale,
            }
            .to_string())
        })
    }

    #[tokio::test]
    async fn test_validity_reply() {
        let oracle = rubric_oracle("Yes, it is.", "", "");
        let service = RubricService::new(&oracle, 3000);
        assert!(service.check_validity(&document()).await.unwrap());

        let oracle = rubric_oracle("No, this is a recipe.", "", "");
        let service = RubricService::new(&oracle, 3000);
        assert!(!service.check_validity(&document()).await.unwrap());
    }

    #[tokio::test]
    async fn test_excerpt_is_bounded() {
        let oracle = rubric_oracle("yes", "", "");
        let service = RubricService::new(&oracle, 8);
        service.check_validity(&document()).await.unwrap();

        let calls = oracle.calls.lock().unwrap();
        assert!(calls[0].1.ends_with("Criterio"));
    }

    #[tokio::test]
    async fn test_measures_and_scale() {
        let oracle = rubric_oracle("yes", "Content\n\n  Design \n", "5, 10, 7");
        let service = RubricService::new(&oracle, 3000);
        let doc = document();

        assert_eq!(
            service.extract_measures(&doc).await.unwrap(),
            vec!["Content", "Design"]
        );
        assert_eq!(service.extract_point_scale(&doc).await.unwrap(), vec![10, 7, 5]);
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_scale() {
        let oracle = rubric_oracle("yes", "Content", "10, five, 3");
        let service = RubricService::new(&oracle, 3000);

        let err = service.extract_point_scale(&document()).await.unwrap_err();
        assert!(matches!(
            err,
            EvalError::OracleMalformed {
                stage: Stage::RubricPointScale,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_tagged_with_stage() {
        let oracle = ScriptedOracle::new(|_: &str, _: &str| Err(anyhow::anyhow!("timeout")));
        let service = RubricService::new(&oracle, 3000);

        let err = service.extract_measures(&document()).await.unwrap_err();
        match err {
            EvalError::OracleUnavailable { stage, message } => {
                assert_eq!(stage, Stage::RubricMeasures);
                assert!(message.contains("timeout"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_table_does_not_call_oracle() {
        let oracle = rubric_oracle("yes", "", "");
        let service = RubricService::new(&oracle, 3000);

        let table = service.extract_table(&document()).unwrap();
        assert_eq!(table.header().unwrap(), ["Criterio", "Excelente", "Bueno"]);
        assert_eq!(oracle.call_count(), 0);
    }
}
