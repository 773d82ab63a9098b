//! 富文本渲染服务 - 业务能力层
//!
//! 把编辑器（Quill）输出的 HTML 渲染为 DOCX：
//! - 顶层 `<p>` / `<h1>`-`<h3>` / `<ul>` / `<ol>` 各自生成段落
//! - 行内样式沿树向下继承，子元素覆盖父元素
//! - 删除线不渲染

use crate::error::{AppResult, RenderError};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, RunFonts, Shading, ShdType, Start,
    Style, StyleType,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::io::Cursor;
use tracing::debug;

static RGB_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rgb\((\d+),\s*(\d+),\s*(\d+)\)").expect("rgb 正则无效")
});

const BULLET_NUMBERING: usize = 1;
const DECIMAL_NUMBERING: usize = 2;
const CODE_FONT: &str = "Courier New";

/// 一个文本片段的样式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// 记录但不渲染
    pub strike: bool,
    pub code: bool,
    /// 文字颜色，可能是十六进制或 CSS 颜色名
    pub color: Option<String>,
    /// 背景色
    pub highlight: Option<String>,
}

impl RunStyle {
    /// 根据标签名和 style 属性得到元素自身的样式
    pub fn from_element(tag: &str, inline_style: Option<&str>) -> Self {
        let mut style = Self {
            bold: matches!(tag, "b" | "strong"),
            italic: matches!(tag, "i" | "em"),
            underline: tag == "u",
            strike: matches!(tag, "s" | "strike" | "del"),
            code: tag == "code",
            ..Default::default()
        };

        if let Some(inline_style) = inline_style {
            let (color, highlight) = parse_inline_style(inline_style);
            style.color = color;
            style.highlight = highlight;
        }
        style
    }

    /// 合并样式，`child` 中设置的项覆盖当前样式
    pub fn merge(&self, child: &RunStyle) -> RunStyle {
        RunStyle {
            bold: self.bold || child.bold,
            italic: self.italic || child.italic,
            underline: self.underline || child.underline,
            strike: self.strike || child.strike,
            code: self.code || child.code,
            color: child.color.clone().or_else(|| self.color.clone()),
            highlight: child.highlight.clone().or_else(|| self.highlight.clone()),
        }
    }

    fn apply(&self, mut run: Run) -> Run {
        if self.bold {
            run = run.bold();
        }
        if self.italic {
            run = run.italic();
        }
        if self.underline {
            run = run.underline("single");
        }
        if self.code {
            run = run.fonts(RunFonts::new().ascii(CODE_FONT).hi_ansi(CODE_FONT));
        }
        if let Some(color) = self.color.as_deref().and_then(normalize_hex) {
            run = run.color(color);
        }
        if let Some(background) = self.highlight.as_deref() {
            match normalize_hex(background) {
                Some(fill) => {
                    let shading = Shading::new().shd_type(ShdType::Clear).color("auto").fill(fill);
                    run = run.shading(shading);
                }
                None => {
                    if let Some(name) = highlight_for(background) {
                        run = run.highlight(name);
                    }
                }
            }
        }
        run
    }
}

/// 解析 style 属性，返回 (color, background-color)
///
/// `rgb(r, g, b)` 转为十六进制，其他取值原样保留
pub fn parse_inline_style(style: &str) -> (Option<String>, Option<String>) {
    let mut color = None;
    let mut highlight = None;

    for part in style.split(';') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let value = if value.starts_with("rgb") {
            rgb_to_hex(value).unwrap_or_else(|| value.to_string())
        } else {
            value.to_string()
        };

        match key.trim() {
            "color" => color = Some(value),
            "background-color" => highlight = Some(value),
            _ => {}
        }
    }

    (color, highlight)
}

/// `rgb(255, 0, 0)` → `FF0000`
pub fn rgb_to_hex(value: &str) -> Option<String> {
    let caps = RGB_COLOR.captures(value)?;
    let mut hex = String::with_capacity(6);
    for i in 1..=3 {
        let channel: u8 = caps.get(i)?.as_str().parse().ok()?;
        hex.push_str(&format!("{:02X}", channel));
    }
    Some(hex)
}

/// 规范化为 6 位大写十六进制，非法值返回 None
fn normalize_hex(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    (hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())).then(|| hex.to_uppercase())
}

/// 无法作为底纹的背景色（CSS 颜色名）退回 Word 高亮色
pub fn highlight_for(color: &str) -> Option<&'static str> {
    let name = match color.trim().to_lowercase().as_str() {
        "yellow" => "yellow",
        "red" => "red",
        "green" | "lime" => "green",
        "cyan" | "aqua" | "turquoise" => "cyan",
        "blue" => "blue",
        "pink" | "magenta" | "fuchsia" => "magenta",
        "violet" | "purple" => "darkMagenta",
        _ => return None,
    };
    Some(name)
}

/// DOCX 渲染服务
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 渲染 HTML 为 DOCX 字节
    pub fn render(&self, html: &str) -> AppResult<Vec<u8>> {
        let docx = self.build(html);

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| RenderError::PackFailed {
                message: e.to_string(),
            })?;

        let bytes = buf.into_inner();
        debug!("DOCX 渲染完成: {} 字节", bytes.len());
        Ok(bytes)
    }

    fn build(&self, html: &str) -> Docx {
        let fragment = Html::parse_fragment(html);
        let mut docx = base_document();
        let mut paragraphs = 0usize;

        for child in fragment.root_element().children() {
            if let Node::Text(text) = child.value() {
                let content: &str = &text.text;
                if !content.trim().is_empty() {
                    docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(content)));
                    paragraphs += 1;
                }
                continue;
            }

            let Some(element) = ElementRef::wrap(child) else {
                continue;
            };
            let align = alignment_of(element);

            match element.value().name() {
                "p" => {
                    docx = docx.add_paragraph(with_align(paragraph_from(element), align));
                    paragraphs += 1;
                }
                name @ ("h1" | "h2" | "h3") => {
                    let style = match name {
                        "h1" => "Title",
                        "h2" => "Heading1",
                        _ => "Heading2",
                    };
                    let paragraph = paragraph_from(element).style(style);
                    docx = docx.add_paragraph(with_align(paragraph, align));
                    paragraphs += 1;
                }
                name @ ("ul" | "ol") => {
                    let (style, numbering) = if name == "ul" {
                        ("ListBullet", BULLET_NUMBERING)
                    } else {
                        ("ListNumber", DECIMAL_NUMBERING)
                    };
                    for item in element
                        .descendants()
                        .filter_map(ElementRef::wrap)
                        .filter(|e| e.value().name() == "li")
                    {
                        let paragraph = paragraph_from(item)
                            .style(style)
                            .numbering(NumberingId::new(numbering), IndentLevel::new(0));
                        docx = docx.add_paragraph(with_align(paragraph, align.clone()));
                        paragraphs += 1;
                    }
                }
                _ => {}
            }
        }

        debug!("HTML 转换为 {} 个段落", paragraphs);
        docx
    }
}

/// 带标题、列表样式和编号定义的空文档
fn base_document() -> Docx {
    Docx::new()
        .add_style(Style::new("Title", StyleType::Paragraph).name("Title").size(56))
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(26)
                .bold(),
        )
        .add_style(Style::new("ListBullet", StyleType::Paragraph).name("List Bullet"))
        .add_style(Style::new("ListNumber", StyleType::Paragraph).name("List Number"))
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_abstract_numbering(AbstractNumbering::new(DECIMAL_NUMBERING).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("decimal"),
            LevelText::new("%1."),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
        .add_numbering(Numbering::new(DECIMAL_NUMBERING, DECIMAL_NUMBERING))
}

fn alignment_of(element: ElementRef<'_>) -> Option<AlignmentType> {
    element.value().classes().find_map(|class| match class {
        "ql-align-center" => Some(AlignmentType::Center),
        "ql-align-right" => Some(AlignmentType::Right),
        "ql-align-left" => Some(AlignmentType::Left),
        _ => None,
    })
}

fn with_align(paragraph: Paragraph, align: Option<AlignmentType>) -> Paragraph {
    match align {
        Some(align) => paragraph.align(align),
        None => paragraph,
    }
}

fn paragraph_from(element: ElementRef<'_>) -> Paragraph {
    let mut runs = Vec::new();
    collect_runs(element, &RunStyle::default(), &mut runs);
    runs.into_iter()
        .fold(Paragraph::new(), |paragraph, run| paragraph.add_run(run))
}

fn collect_runs(element: ElementRef<'_>, parent: &RunStyle, runs: &mut Vec<Run>) {
    let el = element.value();
    let style = parent.merge(&RunStyle::from_element(el.name(), el.attr("style")));

    // 链接只保留直接文本
    if el.name() == "a" {
        let text: String = element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(text.text.to_string()),
                _ => None,
            })
            .collect();
        if !text.is_empty() {
            runs.push(style.apply(Run::new().add_text(text)));
        }
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_runs(child_element, &style, runs);
        } else if let Node::Text(text) = child.value() {
            let content: &str = &text.text;
            if !content.trim().is_empty() {
                runs.push(style.apply(Run::new().add_text(content)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extract_service::extract_docx;

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex("rgb(255, 0, 128)").as_deref(), Some("FF0080"));
        assert_eq!(rgb_to_hex("rgb(1,2,3)").as_deref(), Some("010203"));
        assert_eq!(rgb_to_hex("rgb(300, 0, 0)"), None);
        assert_eq!(rgb_to_hex("#ffffff"), None);
    }

    #[test]
    fn test_parse_inline_style() {
        let (color, highlight) =
            parse_inline_style("color: rgb(230, 0, 0); background-color: #ffff00; font-size: 12px");
        assert_eq!(color.as_deref(), Some("E60000"));
        assert_eq!(highlight.as_deref(), Some("#ffff00"));

        let (color, highlight) = parse_inline_style("font-weight: bold");
        assert_eq!(color, None);
        assert_eq!(highlight, None);
    }

    #[test]
    fn test_style_from_tags() {
        assert!(RunStyle::from_element("strong", None).bold);
        assert!(RunStyle::from_element("em", None).italic);
        assert!(RunStyle::from_element("u", None).underline);
        assert!(RunStyle::from_element("del", None).strike);
        assert!(RunStyle::from_element("code", None).code);
        assert_eq!(RunStyle::from_element("span", None), RunStyle::default());
    }

    #[test]
    fn test_merge_child_overrides() {
        let parent = RunStyle {
            bold: true,
            color: Some("FF0000".to_string()),
            highlight: Some("yellow".to_string()),
            ..Default::default()
        };
        let child = RunStyle {
            italic: true,
            color: Some("0000FF".to_string()),
            ..Default::default()
        };

        let merged = parent.merge(&child);
        assert!(merged.bold);
        assert!(merged.italic);
        assert_eq!(merged.color.as_deref(), Some("0000FF"));
        assert_eq!(merged.highlight.as_deref(), Some("yellow"));
    }

    #[test]
    fn test_normalize_hex_and_highlight_fallback() {
        assert_eq!(normalize_hex("#ffc0cb").as_deref(), Some("FFC0CB"));
        assert_eq!(normalize_hex("red"), None);
        assert_eq!(normalize_hex("#fff"), None);
        assert_eq!(highlight_for("Yellow"), Some("yellow"));
        assert_eq!(highlight_for("purple"), Some("darkMagenta"));
        assert_eq!(highlight_for("beige"), None);
    }

    #[test]
    fn test_render_round_trips_text() {
        let html = r#"<h1>Cell Biology</h1><p class="ql-align-center">The <strong>nucleus</strong> holds <span style="color: rgb(230, 0, 0);">DNA</span>.</p><ul><li>Mitochondria</li><li><em>Ribosomes</em></li></ul><p><br></p><p>See <a href="https://example.com">the notes</a></p>"#;

        let bytes = DocxRenderer::new().render(html).unwrap();
        let text = extract_docx(&bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Cell Biology");
        assert!(lines[1].contains("nucleus") && lines[1].ends_with("DNA."));
        assert_eq!(lines[2], "Mitochondria");
        assert_eq!(lines[3], "Ribosomes");
        // <p><br></p> 渲染为空段落
        assert_eq!(lines[4], "");
        assert!(lines[5].contains("the notes"));
    }

    #[test]
    fn test_render_top_level_text_and_unknown_tags() {
        let html = "loose text<div>ignored</div>";
        let bytes = DocxRenderer::new().render(html).unwrap();
        assert_eq!(extract_docx(&bytes).unwrap(), "loose text");
    }
}
