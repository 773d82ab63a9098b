//! 命令行参数定义

use crate::models::SummaryStyle;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 学术文档助手：试卷解析、摘要、思维导图、富文本导出
#[derive(Debug, Parser)]
#[command(name = "academic-assistant", version, about)]
pub struct Cli {
    /// TOML 配置文件路径
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 解析试卷（PDF / DOCX），输出 JSON
    Parse {
        file: PathBuf,
        /// 试卷标题，默认取文件名
        #[arg(long)]
        title: Option<String>,
    },
    /// 生成摘要
    Summarize {
        #[command(flatten)]
        input: TextInput,
        /// short / long / bullet
        #[arg(long, default_value = "short")]
        style: SummaryStyle,
    },
    /// 抽取思维导图
    Mindmap {
        #[command(flatten)]
        input: TextInput,
    },
    /// 富文本 HTML 导出为 DOCX（或 PDF）
    Render {
        html: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// 再经 LibreOffice 转为 PDF
        #[arg(long)]
        pdf: bool,
    },
    /// DOCX 转 PDF
    Convert {
        docx: PathBuf,
        #[arg(long, default_value = ".")]
        outdir: PathBuf,
    },
    /// 批量解析目录中的试卷
    Batch {
        dir: PathBuf,
        #[arg(long, default_value = "output")]
        outdir: PathBuf,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Parse { .. } => "parse",
            Command::Summarize { .. } => "summarize",
            Command::Mindmap { .. } => "mindmap",
            Command::Render { .. } => "render",
            Command::Convert { .. } => "convert",
            Command::Batch { .. } => "batch",
        }
    }
}

/// 文本来源：直接给出文本或者读取文件
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TextInput {
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::try_parse_from(["academic-assistant", "parse", "exam.pdf", "--title", "Midterm"])
            .unwrap();
        match cli.command {
            Command::Parse { file, title } => {
                assert_eq!(file, PathBuf::from("exam.pdf"));
                assert_eq!(title.as_deref(), Some("Midterm"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_summarize_style_and_input_group() {
        let cli = Cli::try_parse_from([
            "academic-assistant",
            "summarize",
            "--text",
            "Cells divide.",
            "--style",
            "bullet",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Summarize { style: SummaryStyle::Bullet, .. }
        ));

        assert!(Cli::try_parse_from(["academic-assistant", "summarize", "--style", "haiku", "--text", "x"]).is_err());
        assert!(Cli::try_parse_from(["academic-assistant", "mindmap"]).is_err());
        assert!(Cli::try_parse_from([
            "academic-assistant",
            "mindmap",
            "--text",
            "a",
            "--file",
            "b.pdf"
        ])
        .is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["academic-assistant", "batch", "papers", "--config", "app.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("app.toml")));
        assert!(matches!(cli.command, Command::Batch { .. }));
    }
}
