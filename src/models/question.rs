use serde::{Deserialize, Serialize};

/// 试卷中的一道题目
///
/// 选择题和主观题互斥：只有选择题才有选项和答案，
/// 主观题序列化时不会出现 `options` / `correctAnswer` 字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    /// 选择题
    #[serde(rename = "mcq", rename_all = "camelCase")]
    Mcq {
        question_text: String,
        /// 完整的选项行，例如 `"A. Paris"`
        options: Vec<String>,
        /// 答案字母（A-D），未找到答案行时为 null
        correct_answer: Option<char>,
    },
    /// 主观题
    #[serde(rename = "open-ended", rename_all = "camelCase")]
    OpenEnded { question_text: String },
}

impl Question {
    /// 题干（块的第一行）
    pub fn question_text(&self) -> &str {
        match self {
            Question::Mcq { question_text, .. } | Question::OpenEnded { question_text } => {
                question_text
            }
        }
    }

    pub fn is_mcq(&self) -> bool {
        matches!(self, Question::Mcq { .. })
    }

    pub fn options(&self) -> &[String] {
        match self {
            Question::Mcq { options, .. } => options,
            Question::OpenEnded { .. } => &[],
        }
    }

    pub fn correct_answer(&self) -> Option<char> {
        match self {
            Question::Mcq { correct_answer, .. } => *correct_answer,
            Question::OpenEnded { .. } => None,
        }
    }
}

/// 上传试卷的解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPaper {
    pub questions: Vec<Question>,
    /// 调用方提供的标题，原样返回
    pub title: String,
}

impl TestPaper {
    pub fn mcq_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_mcq()).count()
    }
}

/// 上传试卷接口的响应
///
/// 失败时返回 `{"error": "..."}`，与成功响应同级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Parsed(TestPaper),
    Failed { error: String },
}

impl UploadResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        UploadResponse::Failed {
            error: error.into(),
        }
    }
}
