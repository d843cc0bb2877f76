use crate::models::question::{Difficulty, McqChoice, Question, QuestionType};
use serde::{Deserialize, Serialize};

/// 题库中的原始题目记录
///
/// 章节信息不在记录中保存，查询时由题库访问层补充。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
}

/// 题库中的一个章节（含三类题目列表）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterData {
    pub id: String,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub mcqs: Vec<RawQuestion>,
    #[serde(default)]
    pub short_questions: Vec<RawQuestion>,
    #[serde(default)]
    pub long_questions: Vec<RawQuestion>,
}

impl ChapterData {
    /// 获取指定题型的原始题目列表
    pub fn questions(&self, kind: QuestionType) -> &[RawQuestion] {
        match kind {
            QuestionType::Mcq => &self.mcqs,
            QuestionType::Short => &self.short_questions,
            QuestionType::Long => &self.long_questions,
        }
    }

    /// 将原始记录补全为带章节信息的题目
    pub fn annotate(&self, raw: &RawQuestion, kind: QuestionType) -> Question {
        let choice = match kind {
            QuestionType::Mcq => Some(match &raw.options {
                Some(options) if !options.is_empty() => McqChoice {
                    options: options.clone(),
                    // 越界的正确答案按第一个选项处理
                    correct_option: raw
                        .correct_option
                        .filter(|c| *c < options.len())
                        .unwrap_or(0),
                },
                _ => McqChoice::placeholder(),
            }),
            QuestionType::Short | QuestionType::Long => None,
        };

        Question {
            id: raw.id.clone(),
            kind,
            question_text: raw.question_text.clone(),
            difficulty: raw.difficulty,
            marks: raw.marks,
            chapter_id: Some(self.id.clone()),
            chapter_number: Some(self.number),
            chapter_name: Some(self.name.clone()),
            topic: raw.topic.clone(),
            choice,
        }
    }

    /// 生成章节快照
    pub fn snapshot(&self) -> Chapter {
        Chapter {
            id: self.id.clone(),
            number: self.number,
            name: self.name.clone(),
            mcq_count: self.mcqs.len(),
            short_count: self.short_questions.len(),
            long_count: self.long_questions.len(),
        }
    }
}

/// 某年级某科目的全部题库数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectData {
    #[serde(default)]
    pub chapters: Vec<ChapterData>,
}

/// 章节信息快照
///
/// 题目数量是加载时的统计，仅用于界面提示；抽题以实际题目池大小为准。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub mcq_count: usize,
    pub short_count: usize,
    pub long_count: usize,
}
