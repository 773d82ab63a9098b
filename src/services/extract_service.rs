//! 文本提取服务 - 业务能力层
//!
//! 只负责"把上传文件变成纯文本"能力：
//! - PDF：逐页提取，页之间用换行连接
//! - DOCX：每个段落一行
//! - 图片：调用 tesseract 命令行 OCR

use crate::config::Config;
use crate::error::{AppResult, ExtractError};
use crate::models::FileKind;
use std::io::Write;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// 文本提取服务
#[derive(Debug, Clone)]
pub struct ExtractService {
    tesseract_cmd: String,
}

impl ExtractService {
    pub fn new(config: &Config) -> Self {
        Self {
            tesseract_cmd: config.tesseract_cmd.clone(),
        }
    }

    /// 提取文件文本
    ///
    /// # 参数
    /// - `file_name`: 上传文件名（图片 OCR 时沿用其后缀）
    /// - `bytes`: 文件内容
    /// - `kind`: 文件类型
    pub async fn extract(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        kind: FileKind,
    ) -> AppResult<String> {
        debug!("开始提取 {} 文本，{} 字节", kind, bytes.len());

        let text = match kind {
            FileKind::Pdf => run_blocking(move || extract_pdf(&bytes)).await?,
            FileKind::Docx => run_blocking(move || extract_docx(&bytes)).await?,
            FileKind::Image => self.extract_image(&bytes, &image_suffix(file_name)).await?,
        };

        debug!("{} 文本提取完成，共 {} 字符", kind, text.chars().count());
        Ok(text)
    }

    /// OCR 识别图片
    async fn extract_image(&self, bytes: &[u8], suffix: &str) -> AppResult<String> {
        let ocr_failed = |message: String| ExtractError::Ocr {
            command: self.tesseract_cmd.clone(),
            message,
        };

        // tesseract 只接受文件路径，先写入临时文件
        let mut image = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| ocr_failed(format!("无法创建临时文件: {}", e)))?;
        image
            .write_all(bytes)
            .and_then(|_| image.flush())
            .map_err(|e| ocr_failed(format!("无法写入临时文件: {}", e)))?;

        let output = Command::new(&self.tesseract_cmd)
            .arg(image.path())
            .arg("stdout")
            .output()
            .await
            .map_err(|e| ocr_failed(format!("无法启动: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("tesseract 退出码 {:?}: {}", output.status.code(), stderr);
            return Err(ocr_failed(stderr).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// 临时图片文件的后缀，取上传文件名的后缀（小写），没有时按 png 处理
fn image_suffix(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "png".to_string());
    format!(".{}", ext)
}

async fn run_blocking<F>(task: F) -> AppResult<String>
where
    F: FnOnce() -> Result<String, ExtractError> + Send + 'static,
{
    let text = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ExtractError::TaskFailed {
            message: e.to_string(),
        })??;
    Ok(text)
}

/// 逐页提取 PDF 文本
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages =
        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf {
            message: e.to_string(),
        })?;
    Ok(pages.join("\n"))
}

/// 提取 DOCX 正文，每个段落一行
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx {
        message: e.to_string(),
    })?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(paragraph) => {
                lines.push(paragraph_text(paragraph));
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(row) = row;
                    for cell in &row.cells {
                        let docx_rs::TableRowChild::TableCell(cell) = cell;
                        for content in &cell.children {
                            if let docx_rs::TableCellContent::Paragraph(paragraph) = content {
                                lines.push(paragraph_text(paragraph));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut text),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for child in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        push_run_text(run, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(t) => out.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            docx_rs::RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_extract_docx_one_line_per_paragraph() {
        let bytes = build_docx(&["1. What is H2O?", "A. Water", "Answer: A"]);
        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "1. What is H2O?\nA. Water\nAnswer: A");
    }

    #[test]
    fn test_extract_docx_joins_runs() {
        let docx = Docx::new().add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("2. Name the capital"))
                .add_run(Run::new().add_text(".")),
        );
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();

        assert_eq!(extract_docx(&buf.into_inner()).unwrap(), "2. Name the capital.");
    }

    #[test]
    fn test_extract_docx_rejects_garbage() {
        let err = extract_docx(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Docx { .. }));
    }

    #[test]
    fn test_extract_pdf_rejects_garbage() {
        let err = extract_pdf(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf { .. }));
    }

    #[test]
    fn test_image_suffix_follows_upload() {
        assert_eq!(image_suffix("scan.JPG"), ".jpg");
        assert_eq!(image_suffix("photo.jpeg"), ".jpeg");
        assert_eq!(image_suffix("board.png"), ".png");
        assert_eq!(image_suffix("no_extension"), ".png");
    }

    #[tokio::test]
    async fn test_missing_tesseract_is_ocr_error() {
        let service = ExtractService {
            tesseract_cmd: "definitely-not-a-real-ocr-binary".to_string(),
        };
        let err = service
            .extract("scan.png", vec![0x89, b'P', b'N', b'G'], FileKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::AppError::Extract(ExtractError::Ocr { .. })
        ));
    }
}
