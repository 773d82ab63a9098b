//! 试卷解析
//!
//! 两个纯函数组成：
//! - [`segment`]：按题号（`1. `、`12. `）把全文切成题目块
//! - [`classify`]：判断一个题目块是选择题还是主观题
//!
//! 解析不会失败：无法识别的块会退化为主观题，没有答案行的选择题答案为空。

use crate::models::question::Question;
use once_cell::sync::Lazy;
use regex::Regex;

/// 行首题号：数字 + 点 + 空白（含不换行空格等 Unicode 空白，不跨行）
static QUESTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\d+\.[^\S\n]+").expect("题号正则无效"));

/// 选项行：A-D + 点 + 空白
static OPTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-D]\.\s+").expect("选项正则无效"));

/// 答案行：Answer: / Solution: + 字母，不区分大小写
static ANSWER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:answer|solution):\s*([a-d])").expect("答案正则无效")
});

/// 一道题对应的原始文本块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    text: &'a str,
}

impl<'a> RawBlock<'a> {
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// 按行切分
    ///
    /// 除 `\n`、`\r\n` 外，单独的 `\r`、换页符、`\u{2028}` 等也算换行；
    /// 末尾的换行不产生空行
    pub fn lines(&self) -> impl Iterator<Item = &'a str> {
        let mut rest = Some(self.text);
        std::iter::from_fn(move || {
            let s = rest?;
            let Some(pos) = s.find(is_line_break) else {
                rest = None;
                return (!s.is_empty()).then_some(s);
            };
            let mut next = pos + s[pos..].chars().next().map_or(1, char::len_utf8);
            if s[pos..].starts_with("\r\n") {
                next += 1;
            }
            rest = (next < s.len()).then(|| &s[next..]);
            Some(&s[..pos])
        })
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// 解析试卷全文，按原文顺序返回题目列表
pub fn parse_test_paper(text: &str) -> Vec<Question> {
    segment(text).iter().map(classify).collect()
}

/// 按题号切分文本
///
/// 第一个题号之前的内容（卷首说明等）会被丢弃；
/// 全文没有题号时整段作为一个块。
pub fn segment(text: &str) -> Vec<RawBlock<'_>> {
    let text = text.trim();
    let starts: Vec<usize> = QUESTION_LABEL.find_iter(text).map(|m| m.start()).collect();

    if starts.is_empty() {
        return non_empty_block(text).into_iter().collect();
    }

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            non_empty_block(&text[start..end])
        })
        .collect()
}

fn non_empty_block(text: &str) -> Option<RawBlock<'_>> {
    let text = text.trim();
    (!text.is_empty()).then_some(RawBlock { text })
}

/// 将一个题目块归类为选择题或主观题
pub fn classify(block: &RawBlock<'_>) -> Question {
    let mut lines = block.lines();
    let question_text = lines.next().unwrap_or_default().to_string();

    let options: Vec<String> = lines
        .filter(|line| OPTION_LINE.is_match(line))
        .map(str::to_string)
        .collect();

    if options.is_empty() {
        return Question::OpenEnded { question_text };
    }

    // 所有行都参与匹配，以最后一个答案行为准
    let correct_answer = block
        .lines()
        .filter_map(|line| ANSWER_LINE.captures(line))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase())
        .last();

    Question::Mcq {
        question_text,
        options,
        correct_answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MCQS: &str = "1. What is 2+2?\nA. 3\nB. 4\nC. 5\nD. 6\nAnswer: B\n2. Name the capital of France.\nA. Paris\nB. Lyon\nAnswer: A";

    fn block(text: &str) -> RawBlock<'_> {
        RawBlock { text }
    }

    #[test]
    fn test_segment_without_labels_is_single_block() {
        let blocks = segment("  Just some notes\nwith two lines  \n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "Just some notes\nwith two lines");
    }

    #[test]
    fn test_segment_empty_input() {
        assert!(segment("").is_empty());
        assert!(segment(" \n\t \n").is_empty());
    }

    #[test]
    fn test_segment_two_questions() {
        let blocks = segment(TWO_MCQS);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text().starts_with("1. What is 2+2?"));
        assert!(blocks[0].text().ends_with("Answer: B"));
        assert!(blocks[1].text().starts_with("2. Name the capital"));
    }

    #[test]
    fn test_segment_drops_preamble() {
        let blocks = segment("Midterm exam\nAnswer all questions.\n1. First?\n2. Second?");
        let texts: Vec<&str> = blocks.iter().map(|b| b.text()).collect();
        assert_eq!(texts, vec!["1. First?", "2. Second?"]);
    }

    #[test]
    fn test_segment_label_requires_line_start_and_space() {
        // 行中的 "3. " 和没有空格的 "4.5" 都不是题号
        let blocks = segment("1. Compute 2. plus 4.5\n3.No space here\n10. Tenth");
        let texts: Vec<&str> = blocks.iter().map(|b| b.text()).collect();
        assert_eq!(
            texts,
            vec!["1. Compute 2. plus 4.5\n3.No space here", "10. Tenth"]
        );
    }

    #[test]
    fn test_segment_accepts_unicode_space_after_label() {
        // PDF 提取常见的不换行空格
        let questions = parse_test_paper("1. First\n2.\u{a0}Second");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question_text(), "2.\u{a0}Second");

        let blocks = segment("1.\tTabbed\n2.\u{3000}Wide");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_segment_label_space_does_not_cross_lines() {
        let blocks = segment("1. First\n2.\nnot a label");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_lines_split_on_all_line_breaks() {
        let lines: Vec<&str> =
            block("a\rb\r\nc\x0cd\u{2028}e\n\nf\n").lines().collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e", "", "f"]);
        assert_eq!(block("").lines().count(), 0);
    }

    #[test]
    fn test_classify_mcq_with_carriage_return_lines() {
        let questions = parse_test_paper("1. Q\rA. x\rB. y\rAnswer: B");
        assert_eq!(
            questions,
            vec![Question::Mcq {
                question_text: "1. Q".to_string(),
                options: vec!["A. x".to_string(), "B. y".to_string()],
                correct_answer: Some('B'),
            }]
        );
    }

    #[test]
    fn test_segment_handles_crlf() {
        let blocks = segment("1. One\r\nA. a\r\n2. Two\r\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "1. One\r\nA. a");
        assert_eq!(blocks[1].text(), "2. Two");
    }

    #[test]
    fn test_classify_mcq_with_answer() {
        let question = classify(&block("1. What is 2+2?\nA. 3\nB. 4\nC. 5\nD. 6\nAnswer: B"));
        assert_eq!(
            question,
            Question::Mcq {
                question_text: "1. What is 2+2?".to_string(),
                options: vec![
                    "A. 3".to_string(),
                    "B. 4".to_string(),
                    "C. 5".to_string(),
                    "D. 6".to_string()
                ],
                correct_answer: Some('B'),
            }
        );
    }

    #[test]
    fn test_classify_open_ended() {
        let question = classify(&block("1. Describe the water cycle in your own words."));
        assert_eq!(
            question,
            Question::OpenEnded {
                question_text: "1. Describe the water cycle in your own words.".to_string()
            }
        );
    }

    #[test]
    fn test_classify_last_answer_wins() {
        let question = classify(&block("3. Pick\nA. x\nB. y\nC. z\nAnswer: A\nSolution: C"));
        assert_eq!(question.correct_answer(), Some('C'));
    }

    #[test]
    fn test_classify_answer_case_insensitive_and_uppercased() {
        let question = classify(&block("4. Pick\nA. x\nB. y\nANSWER:b"));
        assert_eq!(question.correct_answer(), Some('B'));

        let question = classify(&block("4. Pick\nA. x\nB. y\nsolution:   d"));
        assert_eq!(question.correct_answer(), Some('D'));
    }

    #[test]
    fn test_classify_answer_before_options_counts() {
        let question = classify(&block("5. Pick\nAnswer: D\nA. x\nD. w"));
        assert_eq!(question.correct_answer(), Some('D'));
    }

    #[test]
    fn test_classify_mcq_without_answer() {
        let question = classify(&block("6. Pick\nA. x\nB. y\nAnswer: E"));
        assert!(question.is_mcq());
        assert_eq!(question.correct_answer(), None);
    }

    #[test]
    fn test_classify_ignores_letters_outside_a_to_d() {
        let question = classify(&block("7. Pick\nA. x\nE. Other\nb. lower\n B. indented"));
        assert_eq!(question.options(), &["A. x".to_string()]);

        let question = classify(&block("8. Only bad options\nE. Other\nF. More"));
        assert!(!question.is_mcq());
    }

    #[test]
    fn test_classify_first_line_is_never_an_option() {
        // 第一行即使形如选项也只作为题干
        let question = classify(&block("A. Looks like an option\nNothing else"));
        assert_eq!(
            question,
            Question::OpenEnded {
                question_text: "A. Looks like an option".to_string()
            }
        );
    }

    #[test]
    fn test_classify_keeps_irregular_options() {
        let question = classify(&block("9. Odd\nD. last\nA. first\nA. again"));
        assert_eq!(
            question.options(),
            &["D. last".to_string(), "A. first".to_string(), "A. again".to_string()]
        );
    }

    #[test]
    fn test_parse_test_paper_sample() {
        let questions = parse_test_paper(TWO_MCQS);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options().len(), 4);
        assert_eq!(questions[0].correct_answer(), Some('B'));
        assert_eq!(questions[1].options().len(), 2);
        assert_eq!(questions[1].correct_answer(), Some('A'));
        assert_eq!(questions[1].question_text(), "2. Name the capital of France.");
    }

    #[test]
    fn test_parse_test_paper_preserves_order_and_is_idempotent() {
        let text = "1. B?\n2. A?\nA. a\n3. C?\n\n\n";
        let first = parse_test_paper(text);
        let second = parse_test_paper(text);
        assert_eq!(first, second);

        let texts: Vec<&str> = first.iter().map(|q| q.question_text()).collect();
        assert_eq!(texts, vec!["1. B?", "2. A?", "3. C?"]);
        assert!(!first[0].is_mcq());
        assert!(first[1].is_mcq());
    }
}
