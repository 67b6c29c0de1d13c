//! oracle 回复解析
//!
//! oracle 不保证任何结构化格式，这里的解析全部是容错的：
//! 无法解析的分数记为 0，无法解析的分值档位得到空列表，永远不返回错误

use serde::Deserialize;
use serde_json::Value;

use crate::models::MeasureScore;

/// 评分回复的解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub scores: Vec<MeasureScore>,
    pub feedback: Vec<String>,
}

impl ParsedReply {
    pub fn total_score(&self) -> u64 {
        self.scores.iter().map(|s| u64::from(s.score)).sum()
    }
}

/// 解析评分回复
///
/// 先尝试 JSON（`{"scores":[{"measure","score"}],"feedback":[...]}`，可带代码块围栏），
/// 失败时按行解析：
/// - 含冒号的行视为 `维度: 分数`，冒号右侧按 `/` 拆分取第一段为分数，无法解析记 0
/// - 不含冒号的非空行视为反馈原文
///
/// `echo_scores` 为 true 时，分数行也按出现顺序写入反馈
pub fn parse_evaluation_reply(reply: &str, echo_scores: bool) -> ParsedReply {
    if let Some(parsed) = parse_structured_reply(reply, echo_scores) {
        return parsed;
    }

    let mut parsed = ParsedReply::default();
    for line in reply.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once(':') {
            Some((measure, rest)) => {
                let score_text = rest.split('/').next().unwrap_or_default();
                parsed
                    .scores
                    .push(MeasureScore::new(measure.trim(), parse_score_text(score_text)));
                if echo_scores {
                    parsed.feedback.push(line.to_string());
                }
            }
            None => parsed.feedback.push(line.to_string()),
        }
    }
    parsed
}

/// 分数文本转整数；负数截为 0，非整数记 0
pub fn parse_score_text(text: &str) -> u32 {
    text.trim()
        .parse::<i64>()
        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    scores: Vec<StructuredScore>,
    #[serde(default)]
    feedback: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StructuredScore {
    measure: String,
    #[serde(default)]
    score: Value,
}

fn parse_structured_reply(reply: &str, echo_scores: bool) -> Option<ParsedReply> {
    let body = strip_code_fence(reply);
    if !body.starts_with('{') {
        return None;
    }
    let structured: StructuredReply = serde_json::from_str(body).ok()?;

    let mut parsed = ParsedReply::default();
    for item in structured.scores {
        let score = match &item.score {
            Value::Number(n) => n
                .as_i64()
                .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
                .unwrap_or(0),
            Value::String(s) => parse_score_text(s.split('/').next().unwrap_or_default()),
            _ => 0,
        };
        let measure = item.measure.trim().to_string();
        if echo_scores {
            parsed.feedback.push(format!("{}: {}", measure, score));
        }
        parsed.scores.push(MeasureScore::new(measure, score));
    }
    parsed.feedback.extend(
        structured
            .feedback
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty()),
    );
    Some(parsed)
}

/// 去掉 ```json ... ``` 围栏
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((lang, rest)) if !lang.trim_start().starts_with('{') => rest.trim(),
        _ => inner.trim(),
    }
}

/// 评分维度：每行一个，去掉首尾空白后丢弃空行
pub fn parse_measures(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 分值档位：逗号分隔的整数
///
/// 任一项不是整数则整体返回空列表；负数截为 0，结果按降序排列
pub fn parse_point_scale(reply: &str) -> Vec<u32> {
    let parsed: Result<Vec<u32>, _> = reply
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
        })
        .collect();

    match parsed {
        Ok(mut scale) => {
            scale.sort_unstable_by(|a, b| b.cmp(a));
            scale
        }
        Err(_) => Vec::new(),
    }
}

/// 有效性检查的肯定回答（不区分大小写）
pub fn is_affirmative(reply: &str) -> bool {
    let lowered = reply.to_lowercase();
    ["yes", "sí"].iter().any(|marker| lowered.contains(marker))
}

/// 开放式反馈：按行拆分，去空白，丢弃空行
pub fn split_feedback_lines(reply: &str) -> Vec<String> {
    parse_measures(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_line_with_denominator() {
        let parsed = parse_evaluation_reply("Clarity: 8/10", false);
        assert_eq!(parsed.scores, vec![MeasureScore::new("Clarity", 8)]);
        assert!(parsed.feedback.is_empty());
    }

    #[test]
    fn test_unparseable_score_is_kept_as_zero() {
        let parsed = parse_evaluation_reply("Clarity: great", false);
        assert_eq!(parsed.scores, vec![MeasureScore::new("Clarity", 0)]);
    }

    #[test]
    fn test_line_without_colon_is_feedback() {
        let parsed = parse_evaluation_reply("Overall, good job", false);
        assert!(parsed.scores.is_empty());
        assert_eq!(parsed.feedback, vec!["Overall, good job"]);
        assert_eq!(parsed.total_score(), 0);
    }

    #[test]
    fn test_mixed_reply_echoes_scores_in_order() {
        let reply = "Content: 9/10\n\n  Strong opening slide.  \nDesign: 7 / 10\nDelivery: -3\n";
        let parsed = parse_evaluation_reply(reply, true);

        assert_eq!(
            parsed.scores,
            vec![
                MeasureScore::new("Content", 9),
                MeasureScore::new("Design", 7),
                MeasureScore::new("Delivery", 0),
            ]
        );
        assert_eq!(parsed.total_score(), 16);
        assert_eq!(
            parsed.feedback,
            vec![
                "Content: 9/10",
                "Strong opening slide.",
                "Design: 7 / 10",
                "Delivery: -3"
            ]
        );
    }

    #[test]
    fn test_split_once_on_first_colon() {
        let parsed = parse_evaluation_reply("Time: 10:30", false);
        assert_eq!(parsed.scores, vec![MeasureScore::new("Time", 0)]);
    }

    #[test]
    fn test_structured_reply_is_preferred() {
        let reply = "```json\n{\"scores\":[{\"measure\":\"Content\",\"score\":9},{\"measure\":\"Design\",\"score\":\"7/10\"}],\"feedback\":[\"Nice charts\"]}\n```";
        let parsed = parse_evaluation_reply(reply, false);

        assert_eq!(
            parsed.scores,
            vec![MeasureScore::new("Content", 9), MeasureScore::new("Design", 7)]
        );
        assert_eq!(parsed.feedback, vec!["Nice charts"]);
    }

    #[test]
    fn test_broken_json_falls_back_to_lines() {
        let parsed = parse_evaluation_reply("{\"scores\": [", false);
        assert_eq!(parsed.scores, vec![MeasureScore::new("{\"scores\"", 0)]);
    }

    #[test]
    fn test_parse_measures() {
        let measures = parse_measures("  Content \n\nDesign\n   \nContent\n");
        assert_eq!(measures, vec!["Content", "Design", "Content"]);
    }

    #[test]
    fn test_point_scale_sorted_descending() {
        assert_eq!(parse_point_scale("3, 10, 5"), vec![10, 5, 3]);
        assert_eq!(parse_point_scale("4,3,2,1,"), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_point_scale_fails_as_a_whole() {
        assert!(parse_point_scale("10, five, 3").is_empty());
        assert!(parse_point_scale("The scale is 10, 8, 6").is_empty());
        assert!(parse_point_scale("").is_empty());
        assert!(parse_point_scale("10, 7.5").is_empty());
    }

    #[test]
    fn test_point_scale_accepts_signed_integers() {
        assert_eq!(parse_point_scale("+5, 3"), vec![5, 3]);
        assert_eq!(parse_point_scale("4, -1"), vec![4, 0]);
    }

    #[test]
    fn test_affirmative_markers() {
        assert!(is_affirmative("Yes, this is a grading rubric."));
        assert!(is_affirmative("Sí, es una rúbrica"));
        assert!(!is_affirmative("No. The document is a menu."));
    }
}
