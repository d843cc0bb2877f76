use crate::models::paper::{deserialize_count, deserialize_marks, CustomMarks, QuestionCounts};
use crate::models::question::QuestionType;
use serde::{Deserialize, Serialize};

/// 模板类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    #[default]
    FullBook,
    HalfBook,
    ChapterWise,
    MultiChapter,
}

/// 模板分区的题型
///
/// 作文、书信等非题库题型只用于排版，不参与抽题。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Mcq,
    Short,
    Long,
    #[serde(other)]
    Other,
}

impl SectionKind {
    pub fn question_type(self) -> Option<QuestionType> {
        match self {
            SectionKind::Mcq => Some(QuestionType::Mcq),
            SectionKind::Short => Some(QuestionType::Short),
            SectionKind::Long => Some(QuestionType::Long),
            SectionKind::Other => None,
        }
    }
}

/// 模板分区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instruction: String,
    /// 从题库抽取的题目数量
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_questions: usize,
    /// 学生需作答的题目数量（只用于打印说明）
    #[serde(default, deserialize_with = "deserialize_count")]
    pub attempt_count: usize,
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub marks_per_question: f64,
}

impl TemplateSection {
    /// 作答数量，不超过题目总数；未填写时视为全部作答
    pub fn effective_attempt_count(&self) -> usize {
        if self.attempt_count == 0 {
            self.total_questions
        } else {
            self.attempt_count.min(self.total_questions)
        }
    }
}

/// 试卷模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default)]
    pub sections: Vec<TemplateSection>,
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub total_marks: f64,
    #[serde(default)]
    pub time_allowed: String,
}

impl Template {
    fn sections_of(&self, kind: QuestionType) -> impl Iterator<Item = &TemplateSection> {
        self.sections
            .iter()
            .filter(move |s| s.kind.question_type() == Some(kind))
    }

    /// 抽题目标数量：按题型汇总各分区的 `total_questions`
    pub fn targets(&self) -> QuestionCounts {
        let mut counts = QuestionCounts::default();
        for kind in QuestionType::ALL {
            counts.set(kind, self.sections_of(kind).map(|s| s.total_questions).sum());
        }
        counts
    }

    /// 作答数量：按题型汇总
    pub fn attempt_counts(&self) -> QuestionCounts {
        let mut counts = QuestionCounts::default();
        for kind in QuestionType::ALL {
            counts.set(
                kind,
                self.sections_of(kind).map(|s| s.effective_attempt_count()).sum(),
            );
        }
        counts
    }

    /// 单题分值：取该题型第一个分区的分值
    ///
    /// 没有分区或分区未填写分值（≤ 0）时使用 `fallback`
    pub fn marks(&self, fallback: &CustomMarks) -> CustomMarks {
        let mut marks = *fallback;
        for kind in QuestionType::ALL {
            let section = self
                .sections_of(kind)
                .next()
                .filter(|s| s.marks_per_question > 0.0);
            if let Some(section) = section {
                match kind {
                    QuestionType::Mcq => marks.mcq = section.marks_per_question,
                    QuestionType::Short => marks.short = section.marks_per_question,
                    QuestionType::Long => marks.long = section.marks_per_question,
                }
            }
        }
        marks
    }

    /// 模板中题目总数
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.total_questions).sum()
    }
}
