//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有 oracle 客户端并驱动一次评估，是二进制程序与流程层之间的唯一入口。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (持有 LlmClient / VisionClient)
//!     ↓
//! workflow::EvaluationFlow (处理单个 EvaluationRequest)
//!     ↓
//! services (能力层：提取 / 评分标准 / 标注 / 评分 / 点评)
//!     ↓
//! documents + clients (文档解析与 oracle 调用)
//! ```

pub mod app;

pub use app::App;
