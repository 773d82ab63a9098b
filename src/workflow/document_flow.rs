//! 文档处理流程 - 流程层
//!
//! 核心职责：定义"一个上传文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验文件名与类型
//! 2. 提取文本（PDF / DOCX / 图片 OCR）
//! 3. 解析试卷 / 生成摘要 / 抽取思维导图
//!
//! 渲染方向：HTML → DOCX → PDF

use std::any::Any;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, InputError, ParseError};
use crate::models::{
    FileKind, MindMap, Question, SummaryResponse, SummaryStyle, TestPaper, UploadResponse,
};
use crate::parser::parse_test_paper;
use crate::services::{DocxRenderer, ExtractService, LlmService, PdfConverter};
use crate::workflow::document_ctx::DocumentCtx;

const INVALID_FILE: &str = "Invalid file";
const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// 文档处理流程
///
/// - 编排提取、解析、LLM、渲染等能力
/// - 决定哪些失败返回给调用方，哪些作为错误向上传播
/// - 只依赖业务能力（services）
pub struct DocumentFlow {
    extract: ExtractService,
    llm: LlmService,
    renderer: DocxRenderer,
    converter: PdfConverter,
}

impl DocumentFlow {
    /// 根据配置创建所有能力
    pub fn new(config: &Config) -> Self {
        Self {
            extract: ExtractService::new(config),
            llm: LlmService::new(config),
            renderer: DocxRenderer::new(),
            converter: PdfConverter::new(config),
        }
    }

    /// 解析试卷文件
    ///
    /// # 参数
    /// - `file_name`: 上传文件名（用于判断类型）
    /// - `bytes`: 文件内容
    /// - `title`: 调用方给出的标题，原样返回
    pub async fn parse_paper(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        title: &str,
    ) -> AppResult<TestPaper> {
        if file_name.trim().is_empty() {
            return Err(InputError::MissingFileName.into());
        }
        let kind = match FileKind::from_file_name(file_name) {
            Some(kind) if kind.is_test_paper_source() => kind,
            _ => return Err(AppError::unsupported_format(file_name)),
        };
        let ctx = DocumentCtx::new(file_name, kind);
        info!("{} 📄 开始解析试卷", ctx);

        let text = self.extract.extract(file_name, bytes, kind).await?;
        debug!("{} 提取文本 {} 字符", ctx, text.chars().count());

        let questions = guard_parse(move || parse_test_paper(&text))
            .await
            .inspect_err(|e| error!("{} ❌ {}", ctx, e))?;

        let paper = TestPaper {
            questions,
            title: title.to_string(),
        };
        info!(
            "{} ✓ 解析完成: {} 道题（选择题 {} 道）",
            ctx,
            paper.questions.len(),
            paper.mcq_count()
        );
        Ok(paper)
    }

    /// 上传并解析试卷，返回接口响应
    ///
    /// 输入问题和解析失败以 `{"error": ...}` 响应返回；只有提取失败才是 `Err`
    pub async fn upload_test_paper(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        title: &str,
    ) -> AppResult<UploadResponse> {
        match self.parse_paper(file_name, bytes, title).await {
            Ok(paper) => Ok(UploadResponse::Parsed(paper)),
            Err(AppError::Input(InputError::MissingFileName)) => {
                warn!("⚠️ 上传文件名为空");
                Ok(UploadResponse::failed(INVALID_FILE))
            }
            Err(AppError::Input(InputError::UnsupportedInputFormat { file_name })) => {
                warn!("⚠️ 不支持的试卷类型: {}", file_name);
                Ok(UploadResponse::failed(UNSUPPORTED_FILE_TYPE))
            }
            Err(AppError::Parse(e)) => Ok(UploadResponse::failed(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// 识别文件类型并提取纯文本
    pub async fn extract_text(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        if file_name.trim().is_empty() {
            return Err(InputError::MissingFileName.into());
        }
        let kind = FileKind::detect(file_name)?;
        self.extract.extract(file_name, bytes, kind).await
    }

    /// 直接对文本生成摘要
    pub async fn summarize_text(
        &self,
        text: &str,
        style: SummaryStyle,
    ) -> AppResult<SummaryResponse> {
        let summary = self.llm.summarize(text, style).await?;
        info!("✓ 摘要生成完成（{}）: {} 字符", style, summary.chars().count());
        Ok(SummaryResponse { summary })
    }

    /// 提取文件文本后生成摘要，支持 PDF / DOCX / 图片
    pub async fn summarize_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        style: SummaryStyle,
    ) -> AppResult<SummaryResponse> {
        info!("📝 开始为 {} 生成摘要", file_name);
        let text = self.extract_text(file_name, bytes).await?;
        self.summarize_text(&text, style).await
    }

    /// 从文本抽取思维导图
    pub async fn generate_mindmap(&self, text: &str) -> AppResult<MindMap> {
        info!("🧠 开始抽取思维导图，原文 {} 字符", text.chars().count());
        let map = self.llm.extract_graph(text).await?;
        info!(
            "✓ 思维导图: {} 个节点, {} 条边",
            map.nodes.len(),
            map.edges.len()
        );
        Ok(map)
    }

    /// 渲染富文本为 DOCX
    pub fn render_docx(&self, html: &str) -> AppResult<Vec<u8>> {
        self.renderer.render(html)
    }

    /// 渲染富文本并转为 PDF
    pub async fn render_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        let docx = self.render_docx(html)?;
        let pdf = self.converter.convert_bytes(&docx).await?;
        info!("✓ PDF 渲染完成: {} 字节", pdf.len());
        Ok(pdf)
    }

    pub fn converter(&self) -> &PdfConverter {
        &self.converter
    }
}

/// 在独立的阻塞任务中运行解析，解析器 panic 时转为解析错误
async fn guard_parse<F>(parse: F) -> Result<Vec<Question>, ParseError>
where
    F: FnOnce() -> Vec<Question> + Send + 'static,
{
    tokio::task::spawn_blocking(parse)
        .await
        .map_err(|e| ParseError::ParseFailure {
            message: if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                e.to_string()
            },
        })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
