//! 分数汇总与等级换算（纯函数）

use crate::models::{EvaluationResult, RubricSpec};
use crate::services::reply_parser::ParsedReply;

/// 满分等级附加的反馈
pub const GRADE_SEVEN_BONUS: &str = "Congratulations! Your presentation reached the highest grade.";

/// (最低比例, 等级)，从高到低
const GRADE_STEPS: [(f64, u8); 6] = [(0.9, 7), (0.8, 6), (0.7, 5), (0.6, 4), (0.5, 3), (0.4, 2)];

/// 最高分 = 维度数 × 最高分值；分值档位为空时为 0
pub fn max_score(measures: &[String], point_scale: &[u32]) -> u64 {
    point_scale
        .iter()
        .copied()
        .max()
        .map(|top| measures.len() as u64 * u64::from(top))
        .unwrap_or(0)
}

/// 比例换算为 1..=7
pub fn grade_for_percentage(percentage: f64) -> u8 {
    GRADE_STEPS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(1)
}

/// 最高分为 0 时等级为 0
pub fn grade_for(total_score: u64, max_score: u64) -> u8 {
    if max_score == 0 {
        return 0;
    }
    grade_for_percentage(total_score as f64 / max_score as f64)
}

/// 汇总评分回复
pub fn aggregate(parsed: ParsedReply, rubric: &RubricSpec) -> EvaluationResult {
    let total_score = parsed.total_score();
    let max_score = max_score(&rubric.measures, &rubric.point_scale);
    let grade = grade_for(total_score, max_score);

    let mut feedback = parsed.feedback;
    if grade == 7 {
        feedback.push(GRADE_SEVEN_BONUS.to_string());
    }

    EvaluationResult {
        total_score,
        max_score,
        grade,
        feedback,
        measure_scores: parsed.scores,
    }
}
