//! 提示词
//!
//! 系统角色与用户消息的构建集中在这里，服务层只负责调用和解析

use crate::models::{ImageLabelSet, Persona, PresentationBrief, RubricSpec, SlideRecord};

pub const RUBRIC_VALIDITY_ROLE: &str = "You are a file analysis tool. Your job is to determine \
    whether the provided text is a rubric used for evaluation or not.";

pub const RUBRIC_MEASURES_ROLE: &str =
    "You are a file analysis tool. Extract what is being measured in the provided rubric text.";

pub const RUBRIC_POINT_SCALE_ROLE: &str =
    "You are a file analysis tool. Determine the point values used in the provided rubric text.";

pub const EVALUATION_ROLE: &str = "You are an experienced teacher who grades slide \
    presentations strictly according to the rubric you are given.";

pub const OPEN_FEEDBACK_ROLE: &str = "You are a presentation coach who gives practical, \
    specific recommendations to improve slide presentations.";

pub fn rubric_validity_prompt(excerpt: &str) -> String {
    format!(
        "Is the following text a grading rubric used to evaluate work? \
         Start your answer with \"yes\" or \"no\".\n\n{}",
        excerpt
    )
}

pub fn rubric_measures_prompt(excerpt: &str) -> String {
    format!(
        "List only the titles of the categories evaluated by this rubric, one per line. \
         Do not write an introduction or a conclusion, do not number the lines, do not use \
         bullets or other punctuation, and do not include point values.\n\n{}",
        excerpt
    )
}

pub fn rubric_point_scale_prompt(excerpt: &str) -> String {
    format!(
        "Return only the point values a category can receive in this rubric, as \
         comma-separated integers in descending order (for example: 10, 8, 6, 4). \
         Return nothing else.\n\n{}",
        excerpt
    )
}

/// 幻灯片内容摘要（标题、副标题、正文、图片标签）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSummary {
    pub titles: Vec<String>,
    pub subtitles: Vec<String>,
    pub bodies: Vec<String>,
    pub image_labels: Vec<String>,
}

impl ContentSummary {
    /// 标题与副标题每张幻灯片一行（缺失时写 `(none)`），正文只列出非空的幻灯片
    pub fn from_slides(slides: &[SlideRecord], labels: &[ImageLabelSet]) -> Self {
        let every_slide = |pick: fn(&SlideRecord) -> &str| -> Vec<String> {
            slides
                .iter()
                .map(|s| match pick(s).trim() {
                    "" => format!("Slide {}: (none)", s.index),
                    _ => format!("Slide {}: {}", s.index, pick(s)),
                })
                .collect()
        };

        Self {
            titles: every_slide(|s| s.title.as_str()),
            subtitles: every_slide(|s| s.subtitle.as_str()),
            bodies: slides
                .iter()
                .filter(|s| !s.body_text.trim().is_empty())
                .map(|s| format!("Slide {}: {}", s.index, s.body_text))
                .collect(),
            image_labels: labels
                .iter()
                .filter(|set| !set.labels.is_empty())
                .map(|set| format!("Slide {}: {}", set.slide_index, set.joined()))
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        let section = |heading: &str, lines: &[String]| {
            if lines.is_empty() {
                format!("{}:\n(none)", heading)
            } else {
                format!("{}:\n{}", heading, lines.join("\n"))
            }
        };

        [
            section("Slide titles", &self.titles),
            section("Slide subtitles", &self.subtitles),
            section("Slide body text", &self.bodies),
            section("Image labels", &self.image_labels),
        ]
        .join("\n\n")
    }
}

/// 追加主题 / 类型 / 目标，简介为空时不输出
fn push_brief(prompt: &mut String, brief: &PresentationBrief) {
    if brief.is_empty() {
        return;
    }

    let mut lines = Vec::new();
    if let Some(theme) = &brief.theme {
        lines.push(format!("Theme: {}", theme));
    }
    if let Some(kind) = &brief.kind {
        lines.push(format!("Presentation type: {}", kind));
    }
    if let Some(goal) = &brief.goal {
        lines.push(format!("Goal: {}", goal));
    }
    prompt.push('\n');
    prompt.push_str(&lines.join("\n"));
    prompt.push('\n');
}

/// 按评分标准打分的提示词
pub fn evaluation_prompt(
    rubric: &RubricSpec,
    content: &ContentSummary,
    persona: Persona,
    brief: &PresentationBrief,
) -> String {
    let scale = rubric
        .point_scale
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let top = rubric
        .top_points()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "max".to_string());

    let mut prompt = format!(
        "Evaluate the following presentation, made by {}, using the rubric below.\n\n\
         Rubric measures:\n{}\n\nPoint scale: {}\n",
        persona.audience_label(),
        rubric.measures.join("\n"),
        if scale.is_empty() { "(not specified)" } else { scale.as_str() },
    );

    push_brief(&mut prompt, brief);

    prompt.push('\n');
    prompt.push_str(&content.render());
    prompt.push_str(&format!(
        "\n\nReply with a single JSON object and nothing else, in the form \
         {{\"scores\": [{{\"measure\": \"<measure name>\", \"score\": <integer>}}], \
         \"feedback\": [\"<short sentence>\"]}}. Include one entry in \"scores\" for every \
         measure above, using its exact name and a score out of {top}. If you cannot produce \
         JSON, write one line per measure in the form \"Measure: score/{top}\" followed by \
         short feedback sentences, one per line, without using colons."
    ));
    prompt
}

/// 开放式点评的提示词
pub fn open_feedback_prompt(
    content: &ContentSummary,
    persona: Persona,
    brief: &PresentationBrief,
) -> String {
    let mut prompt = format!(
        "Review the following presentation, intended for {}.\n",
        persona.audience_label()
    );

    push_brief(&mut prompt, brief);

    prompt.push('\n');
    prompt.push_str(&content.render());
    prompt.push_str(
        "\n\nGive concrete recommendations to improve the content, structure and design \
         of the presentation, one recommendation per line.",
    );
    prompt
}
