use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入相关错误（文件类型、参数）
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 文本提取错误
    #[error("提取错误: {0}")]
    Extract(#[from] ExtractError),
    /// 试卷解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文档渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 文档格式转换错误
    #[error("转换错误: {0}")]
    Convert(#[from] ConvertError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 上传文件没有文件名
    #[error("文件名为空")]
    MissingFileName,
    /// 不支持的文件类型
    #[error("Unsupported file type. Please upload a PDF, DOCX or Image File. ({file_name})")]
    UnsupportedInputFormat { file_name: String },
    /// 不支持的摘要风格
    #[error("不支持的摘要风格: {style}")]
    UnsupportedSummaryStyle { style: String },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// PDF 解析失败
    #[error("PDF解析失败: {message}")]
    Pdf { message: String },
    /// DOCX 解析失败
    #[error("DOCX解析失败: {message}")]
    Docx { message: String },
    /// OCR 识别失败
    #[error("OCR识别失败 ({command}): {message}")]
    Ocr { command: String, message: String },
    /// 后台任务失败
    #[error("提取任务异常终止: {message}")]
    TaskFailed { message: String },
}

/// 试卷解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 解析过程中出现意外错误
    #[error("Failed to parse test paper: {message}")]
    ParseFailure { message: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求构建失败
    #[error("LLM请求构建失败: {message}")]
    RequestBuildFailed { message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 思维导图 JSON 解析失败
    #[error("无法解析LLM返回的思维导图 (响应: {response}): {source}")]
    MindMapParseFailed {
        response: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 文档渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// DOCX 打包失败
    #[error("DOCX打包失败: {message}")]
    PackFailed { message: String },
}

/// 文档格式转换错误
#[derive(Debug, Error)]
pub enum ConvertError {
    /// 输入文件不存在
    #[error("DOCX file not found: {path}")]
    NotFound { path: String },
    /// 转换进程失败
    #[error("LibreOffice conversion failed: {message}")]
    ConversionFailed { message: String },
    /// 转换结束但未生成 PDF
    #[error("PDF file not created: {path}")]
    NotCreated { path: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::Json(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建不支持的文件类型错误
    pub fn unsupported_format(file_name: impl Into<String>) -> Self {
        AppError::Input(InputError::UnsupportedInputFormat {
            file_name: file_name.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 是否为输入类错误（应当作为提示返回给调用方，而不是服务端故障）
    pub fn is_input_error(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_message() {
        let err = AppError::from(ParseError::ParseFailure {
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "解析错误: Failed to parse test paper: boom");
    }

    #[test]
    fn test_input_error_classification() {
        assert!(AppError::unsupported_format("a.txt").is_input_error());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!AppError::from(io).is_input_error());
    }
}
