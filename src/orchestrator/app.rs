//! 应用入口 - 编排层
//!
//! 持有配置和共享的 [`DocumentFlow`]，把命令行子命令分派到对应流程

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::{Command, TextInput};
use crate::config::Config;
use crate::models::UploadResponse;
use crate::orchestrator::batch_processor;
use crate::workflow::DocumentFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<DocumentFlow>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let flow = Arc::new(DocumentFlow::new(&config));
        Self { config, flow }
    }

    /// 执行一个子命令
    pub async fn run(&self, command: Command) -> Result<()> {
        info!("🚀 执行命令: {}", command.name());

        match command {
            Command::Parse { file, title } => {
                let title = title.unwrap_or_else(|| file_stem(&file));
                let bytes = read_file(&file).await?;
                let response = self
                    .flow
                    .upload_test_paper(&file_name(&file), bytes, &title)
                    .await?;
                print_json(&response)?;
                if let UploadResponse::Failed { error } = response {
                    anyhow::bail!(error);
                }
            }
            Command::Summarize { input, style } => {
                let response = match (input.text, input.file) {
                    (Some(text), _) => self.flow.summarize_text(&text, style).await?,
                    (None, Some(file)) => {
                        let bytes = read_file(&file).await?;
                        self.flow
                            .summarize_file(&file_name(&file), bytes, style)
                            .await?
                    }
                    (None, None) => anyhow::bail!("需要 --text 或 --file"),
                };
                print_json(&response)?;
            }
            Command::Mindmap { input } => {
                let text = self.read_text(input).await?;
                let map = self.flow.generate_mindmap(&text).await?;
                print_json(&map)?;
            }
            Command::Render { html, output, pdf } => {
                let content = tokio::fs::read_to_string(&html)
                    .await
                    .with_context(|| format!("无法读取 {}", html.display()))?;
                let bytes = if pdf {
                    self.flow.render_pdf(&content).await?
                } else {
                    self.flow.render_docx(&content)?
                };
                tokio::fs::write(&output, &bytes)
                    .await
                    .with_context(|| format!("无法写入 {}", output.display()))?;
                info!("✓ 已导出 {} ({} 字节)", output.display(), bytes.len());
            }
            Command::Convert { docx, outdir } => {
                let pdf_path = self.flow.converter().convert(&docx, &outdir).await?;
                println!("{}", pdf_path.display());
            }
            Command::Batch { dir, outdir } => {
                let stats =
                    batch_processor::process_folder(self.flow.clone(), &self.config, &dir, &outdir)
                        .await?;
                if stats.failed > 0 {
                    anyhow::bail!("{} 个文件处理失败，详见 {}", stats.failed, self.config.warn_file);
                }
            }
        }

        Ok(())
    }

    /// 取得待处理文本：可识别的文档先提取，其余按 UTF-8 文本读取
    async fn read_text(&self, input: TextInput) -> Result<String> {
        match (input.text, input.file) {
            (Some(text), _) => Ok(text),
            (None, Some(file)) => {
                let name = file_name(&file);
                if crate::models::FileKind::from_file_name(&name).is_some() {
                    let bytes = read_file(&file).await?;
                    Ok(self.flow.extract_text(&name, bytes).await?)
                } else {
                    tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("无法读取 {}", file.display()))
                }
            }
            (None, None) => anyhow::bail!("需要 --text 或 --file"),
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("无法读取 {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
