//! 自定义题目合并
//!
//! 把用户修改叠加到题库题目上，或为自定义 ID 构造完整题目

use crate::models::paper::{EditedQuestions, QuestionOverride};
use crate::models::question::{is_custom_id, Difficulty, McqChoice, Question, QuestionType};
use tracing::debug;

/// 自定义题目缺少题干时使用的占位文本
pub const PLACEHOLDER_TEXT: &str = "Enter question text";

/// 解析最终导出的题目
///
/// # 参数
/// - `id`: 题目 ID
/// - `kind`: 该 ID 所在列表的题型（自定义题目以此为准）
/// - `base`: 题库中的原始记录
/// - `edited`: 用户修改
///
/// # 返回
/// - 有题库记录：逐字段覆盖
/// - 无记录的自定义 ID：以修改内容构造，缺失字段使用默认值
/// - 无记录的题库 ID 但有修改：同样构造
/// - 都没有：`None`
pub fn resolve_question(
    id: &str,
    kind: QuestionType,
    base: Option<&Question>,
    edited: &EditedQuestions,
) -> Option<Question> {
    let edit = edited.get(id);

    match base {
        Some(base) => {
            let mut question = base.clone();
            if let Some(edit) = edit {
                apply_override(&mut question, edit);
            }
            Some(question)
        }
        None if is_custom_id(id) || edit.is_some() => {
            debug!("构造自定义题目: {} ({})", id, kind);
            Some(synthesize(id, kind, edit))
        }
        None => None,
    }
}

/// 逐字段覆盖，修改中有值的字段优先
fn apply_override(question: &mut Question, edit: &QuestionOverride) {
    if let Some(text) = &edit.question_text {
        question.question_text = text.clone();
    }
    if let Some(difficulty) = edit.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(marks) = edit.marks {
        question.marks = Some(marks);
    }
    if let Some(number) = edit.chapter_number {
        question.chapter_number = Some(number);
    }
    if let Some(name) = &edit.chapter_name {
        question.chapter_name = Some(name.clone());
    }
    if let Some(topic) = &edit.topic {
        question.topic = Some(topic.clone());
    }

    if question.kind == QuestionType::Mcq {
        let choice = question.choice.get_or_insert_with(McqChoice::placeholder);
        if let Some(options) = &edit.options {
            if !options.is_empty() {
                choice.options = options.clone();
            }
        }
        if let Some(correct) = edit.correct_option {
            choice.correct_option = correct;
        }
        if choice.correct_option >= choice.options.len() {
            choice.correct_option = 0;
        }
    }
}

fn synthesize(id: &str, kind: QuestionType, edit: Option<&QuestionOverride>) -> Question {
    let mut question = Question {
        id: id.to_string(),
        kind,
        question_text: PLACEHOLDER_TEXT.to_string(),
        difficulty: Difficulty::default(),
        marks: None,
        chapter_id: None,
        chapter_number: None,
        chapter_name: None,
        topic: None,
        choice: (kind == QuestionType::Mcq).then(McqChoice::placeholder),
    };
    if let Some(edit) = edit {
        apply_override(&mut question, edit);
    }
    if question.question_text.trim().is_empty() {
        question.question_text = PLACEHOLDER_TEXT.to_string();
    }
    question
}
