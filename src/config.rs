use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 摘要使用的模型
    pub summary_model: String,
    /// 思维导图使用的模型
    pub mindmap_model: String,
    /// 摘要最大 token 数
    pub summary_max_tokens: u32,
    pub temperature: f32,
    // --- 外部工具 ---
    /// tesseract 可执行文件
    pub tesseract_cmd: String,
    /// LibreOffice 可执行文件
    pub office_cmd: String,
    // --- 批处理 ---
    /// 同时处理的试卷数量
    pub max_concurrent_papers: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 处理失败的文件记录
    pub warn_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            summary_model: "gpt-3.5-turbo".to_string(),
            mindmap_model: "gpt-4".to_string(),
            summary_max_tokens: 500,
            temperature: 0.5,
            tesseract_cmd: "tesseract".to_string(),
            office_cmd: "libreoffice".to_string(),
            max_concurrent_papers: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        Self::with_lookup(self, |name| std::env::var(name).ok())
    }

    fn with_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            llm_api_key: lookup("LLM_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            summary_model: lookup("SUMMARY_MODEL").unwrap_or(self.summary_model),
            mindmap_model: lookup("MINDMAP_MODEL").unwrap_or(self.mindmap_model),
            summary_max_tokens: parse_var(&lookup, "SUMMARY_MAX_TOKENS").unwrap_or(self.summary_max_tokens),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE").unwrap_or(self.temperature),
            tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(self.tesseract_cmd),
            office_cmd: lookup("OFFICE_CMD").unwrap_or(self.office_cmd),
            max_concurrent_papers: parse_var(&lookup, "MAX_CONCURRENT_PAPERS")
                .unwrap_or(self.max_concurrent_papers),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            warn_file: lookup("WARN_FILE").unwrap_or(self.warn_file),
        }
    }
}

/// 读取并解析环境变量，无法解析时忽略
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let value = lookup(name)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("环境变量 {} 的值 '{}' 无法解析，使用原配置", name, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
summary_model = "gpt-4o-mini"
max_concurrent_papers = 2
"#,
        )
        .unwrap();

        assert_eq!(config.summary_model, "gpt-4o-mini");
        assert_eq!(config.max_concurrent_papers, 2);
        assert_eq!(config.mindmap_model, "gpt-4");
        assert_eq!(config.summary_max_tokens, 500);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("max_concurrent_papers = \"many\"").unwrap_err();
        assert!(matches!(err, crate::AppError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_CONCURRENT_PAPERS", "3"),
            ("VERBOSE_LOGGING", "not-a-bool"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.max_concurrent_papers, 3);
        // 无法解析的值保留原配置
        assert!(!config.verbose_logging);
    }
}
