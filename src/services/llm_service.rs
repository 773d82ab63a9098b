//! LLM 服务 - 业务能力层
//!
//! 只负责"调用大模型"能力：生成摘要、抽取概念图
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::mindmap::{MindMap, RawMindMap};
use crate::models::summary::SummaryStyle;

const SUMMARY_SYSTEM_MESSAGE: &str = "You are a helpful academic summarizer.";

/// 单次调用的模型参数
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成摘要 / 思维导图
/// - 提供通用的 LLM 调用接口
/// - 不关心文件从哪里来
pub struct LlmService {
    client: Client<OpenAIConfig>,
    summary: CompletionParams,
    mindmap: CompletionParams,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            summary: CompletionParams {
                model: config.summary_model.clone(),
                temperature: config.temperature,
                max_tokens: Some(config.summary_max_tokens),
            },
            mindmap: CompletionParams {
                model: config.mindmap_model.clone(),
                temperature: config.temperature,
                max_tokens: None,
            },
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `params`: 模型、温度、最大 token
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        params: &CompletionParams,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", params.model);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(request_build_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(request_build_failed)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&params.model)
            .messages(messages)
            .temperature(params.temperature);
        if let Some(max_tokens) = params.max_tokens {
            request.max_tokens(max_tokens);
        }
        let request = request.build().map_err(request_build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&params.model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: params.model.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 按指定风格生成摘要
    pub async fn summarize(&self, text: &str, style: SummaryStyle) -> AppResult<String> {
        debug!("生成摘要，风格: {}，原文 {} 字符", style, text.chars().count());
        let user_message = build_summary_prompt(text, style);
        self.send_to_llm(&user_message, Some(SUMMARY_SYSTEM_MESSAGE), &self.summary)
            .await
    }

    /// 从文本中抽取概念及其关系
    pub async fn extract_graph(&self, text: &str) -> AppResult<MindMap> {
        let prompt = build_mindmap_prompt(text);
        let response = self.send_to_llm(&prompt, None, &self.mindmap).await?;
        let map = parse_mindmap_response(&response)?;
        debug!(
            "思维导图解析完成: {} 个节点, {} 条边",
            map.nodes.len(),
            map.edges.len()
        );
        Ok(map)
    }
}

fn request_build_failed(err: impl std::fmt::Display) -> AppError {
    LlmError::RequestBuildFailed {
        message: err.to_string(),
    }
    .into()
}

/// 构建摘要提示词
pub fn build_summary_prompt(text: &str, style: SummaryStyle) -> String {
    format!("{}\n\n{}", style.instruction(), text)
}

/// 构建思维导图提示词
pub fn build_mindmap_prompt(text: &str) -> String {
    format!(
        "From the following text, extract a set of concepts and how they relate to each other. \
         Return the result as a JSON with `nodes` and `edges` arrays.\n\n\
         Text:\n{}\n\n\
         Format:\n{{\n  \"nodes\": [ {{\"id\": \"1\", \"label\": \"...\"}} ],\n  \
         \"edges\": [ {{\"source\": \"1\", \"target\": \"2\", \"label\": \"...\"}} ]\n}}",
        text
    )
}

/// 解析 LLM 返回的思维导图 JSON
///
/// 允许外层包裹 Markdown 代码块；缺少 id 的边按 `e{source}-{target}-{序号}` 补齐
pub fn parse_mindmap_response(response: &str) -> AppResult<MindMap> {
    let json = strip_code_fence(response);
    let raw: RawMindMap =
        serde_json::from_str(json).map_err(|source| LlmError::MindMapParseFailed {
            response: crate::utils::logging::truncate_text(response, 200),
            source,
        })?;
    Ok(raw.into())
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 去掉语言标记所在的第一行
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt() {
        let prompt = build_summary_prompt("Photosynthesis converts light.", SummaryStyle::Short);
        assert_eq!(
            prompt,
            "Summarize the following in a short paragraph:\n\nPhotosynthesis converts light."
        );
    }

    #[test]
    fn test_mindmap_prompt_embeds_text_and_format() {
        let prompt = build_mindmap_prompt("Mitochondria produce ATP.");
        assert!(prompt.contains("Text:\nMitochondria produce ATP.\n\n"));
        assert!(prompt.contains(r#""nodes": [ {"id": "1", "label": "..."} ]"#));
        assert!(prompt.contains(r#""edges": [ {"source": "1", "target": "2", "label": "..."} ]"#));
    }

    #[test]
    fn test_parse_mindmap_plain_json() {
        let map = parse_mindmap_response(
            r#"{"nodes": [{"id": "1", "label": "Energy"}], "edges": [{"source": "1", "target": "1"}]}"#,
        )
        .unwrap();
        assert_eq!(map.nodes[0].label, "Energy");
        assert_eq!(map.edges[0].id, "e1-1-0");
    }

    #[test]
    fn test_parse_mindmap_fenced_json() {
        let response = "```json\n{\"nodes\": [], \"edges\": []}\n```";
        let map = parse_mindmap_response(response).unwrap();
        assert!(map.nodes.is_empty());
    }

    #[test]
    fn test_parse_mindmap_invalid_json() {
        let err = parse_mindmap_response("Sorry, I cannot do that.").unwrap_err();
        assert!(matches!(
            err,
            AppError::Llm(LlmError::MindMapParseFailed { .. })
        ));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}```"), "{\"a\":1}");
    }

    /// 测试摘要接口连通性
    #[tokio::test]
    #[ignore]
    async fn test_summarize_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let summary = service
            .summarize(
                "The water cycle describes how water evaporates, condenses and precipitates.",
                SummaryStyle::Bullet,
            )
            .await
            .expect("摘要调用失败");

        println!("{}", summary);
        assert!(!summary.is_empty());
    }
}
