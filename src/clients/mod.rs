pub mod llm_client;
pub mod vision_client;

pub use llm_client::{LlmClient, TextOracle};
pub use vision_client::{VisionClient, VisionOracle};
