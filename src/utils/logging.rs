/// 日志工具模块
///
/// 运行日志文件头、启动横幅、批量统计，以及日志预览用的文本截断
use crate::error::{AppError, AppResult};
use std::path::Path;
use tracing::info;

/// 初始化运行日志文件（覆盖旧内容）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n文档处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    std::fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `command`: 当前执行的子命令
/// - `max_concurrent`: 最大并发数
pub fn log_startup(command: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录批量任务加载信息
pub fn log_papers_loaded(total: usize, input_dir: &Path, max_concurrent: usize) {
    info!("✓ 在 {} 找到 {} 个待解析的试卷", input_dir.display(), total);
    info!("📋 最多同时解析 {} 个\n", max_concurrent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `warn_file_path`: 失败记录文件
pub fn print_final_stats(success: usize, failed: usize, warn_file_path: &str) {
    let total = success + failed;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    if failed > 0 {
        info!("失败文件已记录至: {}", warn_file_path);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 超出部分以 `...` 代替
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
