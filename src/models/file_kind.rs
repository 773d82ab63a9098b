use crate::error::{AppError, AppResult};
use std::fmt;
use std::path::Path;

/// 支持的上传文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Docx,
    /// jpg / jpeg / png，走 OCR
    Image,
}

impl FileKind {
    /// 根据文件名后缀判断类型（不区分大小写）
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();

        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "jpg" | "jpeg" | "png" => Some(FileKind::Image),
            _ => None,
        }
    }

    /// 同 [`FileKind::from_file_name`]，无法识别时返回输入错误
    pub fn detect(file_name: &str) -> AppResult<Self> {
        Self::from_file_name(file_name).ok_or_else(|| AppError::unsupported_format(file_name))
    }

    /// 试卷上传只接受 PDF 和 DOCX
    pub fn is_test_paper_source(self) -> bool {
        matches!(self, FileKind::Pdf | FileKind::Docx)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Pdf => "PDF",
            FileKind::Docx => "DOCX",
            FileKind::Image => "图片",
        };
        f.write_str(name)
    }
}
