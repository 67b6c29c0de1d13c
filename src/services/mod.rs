pub mod content_extractor;
pub mod evaluation_service;
pub mod feedback_service;
pub mod labeling_service;
pub mod prompts;
pub mod reply_parser;
pub mod rubric_service;
pub mod scoring;

pub use content_extractor::ContentExtractor;
pub use evaluation_service::EvaluationService;
pub use feedback_service::FeedbackService;
pub use labeling_service::LabelingService;
pub use prompts::ContentSummary;
pub use reply_parser::ParsedReply;
pub use rubric_service::RubricService;
