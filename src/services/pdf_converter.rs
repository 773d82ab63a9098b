//! 文档格式转换服务 - 业务能力层
//!
//! 调用 LibreOffice 无界面模式把 DOCX 转为 PDF

use crate::config::Config;
use crate::error::{AppError, AppResult, ConvertError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// DOCX → PDF 转换服务
#[derive(Debug, Clone)]
pub struct PdfConverter {
    office_cmd: String,
}

impl PdfConverter {
    pub fn new(config: &Config) -> Self {
        Self::with_command(config.office_cmd.clone())
    }

    /// 使用自定义的 LibreOffice 可执行文件
    pub fn with_command(office_cmd: impl Into<String>) -> Self {
        Self {
            office_cmd: office_cmd.into(),
        }
    }

    /// 转换 DOCX 文件
    ///
    /// # 参数
    /// - `docx_path`: DOCX 文件路径
    /// - `output_dir`: PDF 输出目录（不存在时自动创建）
    ///
    /// # 返回
    /// 返回生成的 PDF 路径
    pub async fn convert(&self, docx_path: &Path, output_dir: &Path) -> AppResult<PathBuf> {
        if !tokio::fs::try_exists(docx_path).await.unwrap_or(false) {
            return Err(ConvertError::NotFound {
                path: docx_path.display().to_string(),
            }
            .into());
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(output_dir.display().to_string(), e))?;

        debug!(
            "调用 {} 转换 {} → {}",
            self.office_cmd,
            docx_path.display(),
            output_dir.display()
        );

        let output = Command::new(&self.office_cmd)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg(docx_path)
            .arg("--outdir")
            .arg(output_dir)
            .output()
            .await
            .map_err(|e| ConvertError::ConversionFailed {
                message: format!("无法启动 {}: {}", self.office_cmd, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("LibreOffice 退出码 {:?}: {}", output.status.code(), stderr);
            return Err(ConvertError::ConversionFailed {
                message: format!("exit status {:?}: {}", output.status.code(), stderr),
            }
            .into());
        }

        let pdf_path = pdf_path_for(docx_path, output_dir);
        if !tokio::fs::try_exists(&pdf_path).await.unwrap_or(false) {
            return Err(ConvertError::NotCreated {
                path: pdf_path.display().to_string(),
            }
            .into());
        }

        info!("✓ PDF 已生成: {}", pdf_path.display());
        Ok(pdf_path)
    }

    /// 在临时目录中转换内存中的 DOCX
    pub async fn convert_bytes(&self, docx: &[u8]) -> AppResult<Vec<u8>> {
        let workdir = tempfile::tempdir()?;
        let docx_path = workdir.path().join("document.docx");

        tokio::fs::write(&docx_path, docx)
            .await
            .map_err(|e| AppError::file_write_failed(docx_path.display().to_string(), e))?;

        let pdf_path = self.convert(&docx_path, workdir.path()).await?;
        let pdf = tokio::fs::read(&pdf_path)
            .await
            .map_err(|e| AppError::file_read_failed(pdf_path.display().to_string(), e))?;

        Ok(pdf)
    }
}

/// LibreOffice 输出文件名：原文件名 + .pdf
fn pdf_path_for(docx_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = docx_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}.pdf", stem))
}
