//! 难度筛选

use crate::models::question::{Question, DifficultyFilter};

/// 按难度筛选题目
///
/// `All` 原样复制；其余严格按难度相等筛选，没有匹配时返回空列表，
/// 不回退到其他难度。输入不会被修改。
pub fn filter_by_difficulty(questions: &[Question], difficulty: DifficultyFilter) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| difficulty.matches(q.difficulty))
        .cloned()
        .collect()
}
