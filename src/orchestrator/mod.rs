//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 持有配置与共享的 DocumentFlow
//! - 把子命令分派到对应流程，输出 JSON
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 扫描目录中的 PDF / DOCX
//! - 控制并发数量（Semaphore）
//! - 写出 JSON、记录失败文件、输出统计
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一个子命令)
//!     ↓
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! workflow::DocumentFlow (处理单个文件)
//!     ↓
//! services (能力层：extract / llm / render / convert / warn)
//!     ↓
//! parser (纯函数：试卷切分与分类)
//! ```

pub mod app;
pub mod batch_processor;

pub use app::App;
pub use batch_processor::{process_folder, BatchStats};
