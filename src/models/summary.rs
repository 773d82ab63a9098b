use crate::error::{AppError, InputError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 摘要风格 → 提示词
static STYLE_PROMPTS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "short" => "Summarize the following in a short paragraph:",
    "long" => "Summarize the following in a long, detailed paragraph:",
    "bullet" => "Summarize the following using bullet points:",
};

/// 摘要风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    /// 短段落
    Short,
    /// 长段落
    Long,
    /// 要点列表
    Bullet,
}

impl SummaryStyle {
    pub fn key(self) -> &'static str {
        match self {
            SummaryStyle::Short => "short",
            SummaryStyle::Long => "long",
            SummaryStyle::Bullet => "bullet",
        }
    }

    /// 该风格对应的指令
    pub fn instruction(self) -> &'static str {
        STYLE_PROMPTS[self.key()]
    }
}

impl FromStr for SummaryStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(SummaryStyle::Short),
            "long" => Ok(SummaryStyle::Long),
            "bullet" => Ok(SummaryStyle::Bullet),
            _ => Err(InputError::UnsupportedSummaryStyle {
                style: s.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 摘要接口的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
