//! 文档处理上下文
//!
//! 封装"我正在处理哪个文件"这一信息，只用于日志前缀

use crate::models::FileKind;
use std::fmt::Display;

/// 文档处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 上传的文件名
    pub file_name: String,

    /// 识别出的文件类型
    pub kind: FileKind,

    /// 批量任务中的序号（从1开始），单次调用为 None
    pub index: Option<usize>,
}

impl DocumentCtx {
    pub fn new(file_name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            index: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "[文件#{} {} ({})]", index, self.file_name, self.kind),
            None => write!(f, "[文件 {} ({})]", self.file_name, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        let ctx = DocumentCtx::new("exam.pdf", FileKind::Pdf);
        assert_eq!(ctx.to_string(), "[文件 exam.pdf (PDF)]");
        assert_eq!(ctx.with_index(3).to_string(), "[文件#3 exam.pdf (PDF)]");
    }
}
