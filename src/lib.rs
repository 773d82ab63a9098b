//! # Academic Assistant
//!
//! 学术文档助手：试卷解析、摘要、思维导图、富文本导出
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 解析核心（Parser）
//! - `parser/` - 纯函数，把试卷文本切分为题目块并分类为选择题 / 简答题
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件
//! - `ExtractService` - PDF / DOCX / 图片 OCR 文本提取能力
//! - `LlmService` - 摘要与思维导图能力
//! - `DocxRenderer` - HTML → DOCX 渲染能力
//! - `PdfConverter` - DOCX → PDF 转换能力
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `DocumentCtx` - 上下文封装（文件名 + 类型）
//! - `DocumentFlow` - 流程编排（校验 → 提取 → 解析 / 摘要 / 导图）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 子命令分派
//! - `orchestrator/batch_processor` - 批量试卷处理器，管理并发
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{MindMap, Question, SummaryStyle, TestPaper, UploadResponse};
pub use orchestrator::{process_folder, App, BatchStats};
pub use parser::parse_test_paper;
pub use workflow::{DocumentCtx, DocumentFlow};
