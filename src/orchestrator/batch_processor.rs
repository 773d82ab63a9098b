//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **批量加载**：扫描目录下所有 PDF / DOCX 试卷
//! 2. **并发控制**：使用 Semaphore 限制同时解析的数量
//! 3. **结果输出**：每份试卷写为 `<文件名>.json`
//! 4. **兜底记录**：失败的文件写入 warn 文件
//! 5. **全局统计**：汇总成功 / 失败数量

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::models::FileKind;
use crate::services::WarnWriter;
use crate::utils::logging::{init_log_file, log_papers_loaded, log_startup, print_final_stats};
use crate::workflow::{DocumentCtx, DocumentFlow};

/// 批量处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 解析目录中的所有试卷
///
/// # 参数
/// - `flow`: 共享的文档处理流程
/// - `config`: 并发数、日志文件、warn 文件
/// - `input_dir`: 试卷所在目录（不递归）
/// - `output_dir`: JSON 输出目录（不存在时自动创建）
pub async fn process_folder(
    flow: Arc<DocumentFlow>,
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
) -> AppResult<BatchStats> {
    init_log_file(&config.output_log_file)?;
    log_startup("批量解析试卷", config.max_concurrent_papers);

    let papers = load_papers(input_dir).await?;
    if papers.is_empty() {
        warn!("⚠️ 没有找到待处理的 PDF / DOCX 文件，程序结束");
        return Ok(BatchStats::default());
    }
    log_papers_loaded(papers.len(), input_dir, config.max_concurrent_papers);

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| AppError::file_write_failed(output_dir.display().to_string(), e))?;

    // Semaphore 容量为 0 时任务永远拿不到许可
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_papers.max(1)));
    let warn_writer = Arc::new(WarnWriter::with_path(config.warn_file.clone()));

    let mut handles = Vec::with_capacity(papers.len());
    for (idx, (path, kind)) in papers.into_iter().enumerate() {
        let ctx = DocumentCtx::new(display_name(&path), kind).with_index(idx + 1);
        let semaphore = semaphore.clone();
        let flow = flow.clone();
        let warn_writer = warn_writer.clone();
        let output_dir = output_dir.to_path_buf();

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(format!("无法获取并发许可: {}", e)),
            };

            match process_paper(&flow, &path, &output_dir).await {
                Ok(json_path) => {
                    info!("{} ✅ 已写入 {}", ctx, json_path.display());
                    Ok(())
                }
                Err(e) => {
                    error!("{} ❌ 处理失败: {}", ctx, e);
                    if let Err(write_err) = warn_writer.write(&ctx.file_name, &e.to_string()).await {
                        error!("写入警告文件失败: {}", write_err);
                    }
                    Err(e.to_string())
                }
            }
        }));
    }

    let mut stats = BatchStats::default();
    for result in join_all(handles).await {
        match result {
            Ok(Ok(())) => stats.success += 1,
            Ok(Err(_)) => stats.failed += 1,
            Err(e) => {
                error!("任务执行失败: {}", e);
                stats.failed += 1;
            }
        }
    }

    print_final_stats(stats.success, stats.failed, warn_writer.path());
    Ok(stats)
}

/// 扫描目录，按文件名排序返回所有试卷路径及其类型
async fn load_papers(input_dir: &Path) -> AppResult<Vec<(PathBuf, FileKind)>> {
    info!("\n📁 正在扫描待处理的试卷...");

    if !tokio::fs::try_exists(input_dir).await.unwrap_or(false) {
        return Err(FileError::DirectoryNotFound {
            path: input_dir.display().to_string(),
        }
        .into());
    }

    let mut entries = tokio::fs::read_dir(input_dir)
        .await
        .map_err(|e| AppError::file_read_failed(input_dir.display().to_string(), e))?;

    let mut papers = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(input_dir.display().to_string(), e))?
    {
        let path = entry.path();
        let kind = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(FileKind::from_file_name)
            .filter(|kind| kind.is_test_paper_source());
        if let Some(kind) = kind.filter(|_| path.is_file()) {
            papers.push((path, kind));
        }
    }

    papers.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(papers)
}

/// 解析单个试卷并写出 JSON，标题取文件名（不含后缀）
async fn process_paper(flow: &DocumentFlow, path: &Path, output_dir: &Path) -> AppResult<PathBuf> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let paper = flow.parse_paper(&display_name(path), bytes, &stem).await?;

    let json_path = output_dir.join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(&paper)?;
    tokio::fs::write(&json_path, json)
        .await
        .map_err(|e| AppError::file_write_failed(json_path.display().to_string(), e))?;

    Ok(json_path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
