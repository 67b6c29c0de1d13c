//! # Deck Grader
//!
//! 按评分标准评估 .pptx 演示文稿，或为职场受众生成开放式点评
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 文档与客户端（Documents / Clients）
//! - `documents/` - .pptx 形状解析、评分标准 PDF 文本提取、表格识别
//! - `clients/` - `TextOracle`（语言模型）与 `VisionOracle`（图片标注）及其实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只负责一个阶段
//! - `ContentExtractor` - 标题 / 副标题 / 正文 / 图片
//! - `RubricService` - 有效性、评分维度、分值档位、表格
//! - `LabelingService` - 并发图片标注
//! - `EvaluationService` / `scoring` - 打分与等级换算
//! - `FeedbackService` - 开放式点评
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份演示文稿"的完整评估流程
//! - `EvaluationRequest` - 请求封装（文件 + 受众 + 简介）
//! - `EvaluationFlow` - 流程编排与降级策略
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 创建 oracle 客户端并驱动评估
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod documents;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LlmClient, TextOracle, VisionClient, VisionOracle};
pub use config::Config;
pub use error::{EvalError, Result, Stage, StageWarning};
pub use models::{Assessment, EvaluationReport, EvaluationResult, Persona, PresentationBrief};
pub use orchestrator::App;
pub use workflow::{EvaluationFlow, EvaluationRequest};
