//! 总分计算
//!
//! 由选题和每种题型的分值推导题目数量与总分

use crate::models::paper::{CustomMarks, QuestionCounts, SectionInstruction, Selection};
use crate::models::question::QuestionType;
use serde::Serialize;

/// 题目数量与总分
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperTotals {
    pub question_count: usize,
    pub total_marks: f64,
}

/// 计算题目数量与总分
///
/// 非数字分值按 0 处理，结果不会出现 NaN。
pub fn compute_totals(selection: &Selection, marks: &CustomMarks) -> PaperTotals {
    let counts = selection.counts();
    PaperTotals {
        question_count: counts.total(),
        total_marks: QuestionType::ALL
            .iter()
            .map(|kind| counts.get(*kind) as f64 * marks.get(*kind))
            .sum(),
    }
}

/// 单个题型的分值明细
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMarks {
    pub count: usize,
    pub marks_per_question: f64,
    pub total: f64,
    /// 需作答数量（选择题恒为全部）
    pub attempt_count: usize,
    pub attempted_marks: f64,
}

impl SectionMarks {
    fn new(count: usize, marks_per_question: f64, attempt: usize) -> Self {
        // 0 表示全部作答
        let attempt_count = if attempt == 0 { count } else { attempt.min(count) };
        Self {
            count,
            marks_per_question,
            total: count as f64 * marks_per_question,
            attempt_count,
            attempted_marks: attempt_count as f64 * marks_per_question,
        }
    }
}

/// 分值明细
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksBreakdown {
    pub mcq: SectionMarks,
    pub short: SectionMarks,
    pub long: SectionMarks,
    /// 全部题目的总分
    pub total: f64,
    /// 按作答要求计算的总分
    pub attempt_total: f64,
}

impl MarksBreakdown {
    /// # 参数
    /// - `counts`: 每种题型的题目数量
    /// - `attempts`: 每种题型的作答数量，0 表示全部；选择题忽略此值
    /// - `marks`: 每种题型的分值
    pub fn calculate(counts: QuestionCounts, attempts: QuestionCounts, marks: &CustomMarks) -> Self {
        let mcq = SectionMarks::new(counts.mcq, marks.get(QuestionType::Mcq), 0);
        let short = SectionMarks::new(counts.short, marks.get(QuestionType::Short), attempts.short);
        let long = SectionMarks::new(counts.long, marks.get(QuestionType::Long), attempts.long);
        Self {
            mcq,
            short,
            long,
            total: mcq.total + short.total + long.total,
            attempt_total: mcq.total + short.attempted_marks + long.attempted_marks,
        }
    }

    pub fn section(&self, kind: QuestionType) -> &SectionMarks {
        match kind {
            QuestionType::Mcq => &self.mcq,
            QuestionType::Short => &self.short,
            QuestionType::Long => &self.long,
        }
    }

    /// 一行分值说明，例如 `MCQ: 12 × 1 = 12 | Short: 8 × 2 = 16 | Total: 28 marks`
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = QuestionType::ALL
            .iter()
            .filter_map(|kind| {
                let section = self.section(*kind);
                (section.count > 0).then(|| {
                    format!(
                        "{}: {} × {} = {}",
                        section_label(*kind),
                        section.count,
                        format_number(section.marks_per_question),
                        format_number(section.total)
                    )
                })
            })
            .collect();
        parts.push(format!("Total: {} marks", format_number(self.total)));
        parts.join(" | ")
    }
}

/// 页眉总分校验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksValidation {
    pub valid: bool,
    pub header_total: f64,
    pub calculated_total: f64,
    pub mismatch: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 校验页眉上的总分与实际计算的总分是否一致
pub fn validate_marks(header_total: f64, counts: QuestionCounts, marks: &CustomMarks) -> MarksValidation {
    let calculated_total = MarksBreakdown::calculate(counts, QuestionCounts::default(), marks).total;
    let mismatch = (header_total - calculated_total).abs();

    if mismatch < 1e-9 {
        return MarksValidation {
            valid: true,
            header_total,
            calculated_total,
            mismatch: 0.0,
            error: None,
        };
    }

    MarksValidation {
        valid: false,
        header_total,
        calculated_total,
        mismatch,
        error: Some(format!(
            "Total marks mismatch: Header shows {}, but calculated total is {}",
            format_number(header_total),
            format_number(calculated_total)
        )),
    }
}

/// 作答说明文字
///
/// 例如 `Attempt all (5 × 2 = 10 Marks)`、`Attempt any 5 (5 × 2 = 10 Marks)`
pub fn attempt_instruction(attempt_count: usize, total_questions: usize, marks_per_question: f64) -> String {
    let total = format_number(attempt_count as f64 * marks_per_question);
    let marks = format_number(marks_per_question);
    if attempt_count >= total_questions {
        format!("Attempt all ({} × {} = {} Marks)", attempt_count, marks, total)
    } else {
        format!(
            "Attempt any {} ({} × {} = {} Marks)",
            attempt_count, attempt_count, marks, total
        )
    }
}

/// 每个非空题型分区的作答说明
pub fn section_instructions(breakdown: &MarksBreakdown) -> Vec<SectionInstruction> {
    QuestionType::ALL
        .iter()
        .filter_map(|kind| {
            let section = breakdown.section(*kind);
            (section.count > 0).then(|| SectionInstruction {
                kind: *kind,
                text: attempt_instruction(section.attempt_count, section.count, section.marks_per_question),
            })
        })
        .collect()
}

fn section_label(kind: QuestionType) -> &'static str {
    match kind {
        QuestionType::Mcq => "MCQ",
        QuestionType::Short => "Short",
        QuestionType::Long => "Long",
    }
}

/// 整数分值不带小数点
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
