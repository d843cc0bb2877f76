use crate::models::paper::{EditedQuestions, PaperSettings, QuestionCounts, QuestionOrder, Selection};
use crate::models::question::DifficultyFilter;
use crate::models::template::{Template, TemplateCategory};
use serde::{Deserialize, Serialize};

/// 组卷请求
///
/// 组卷引擎的全部输入，不读取任何外部可变状态。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    pub class_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub chapter_ids: Vec<String>,
    #[serde(default)]
    pub targets: QuestionCounts,
    #[serde(default)]
    pub difficulty: DifficultyFilter,
    /// 不允许抽到的题目（例如上一份试卷已用过的题）
    #[serde(default)]
    pub exclude_ids: Vec<String>,
}

impl CompositionRequest {
    pub fn new(
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
        chapter_ids: Vec<String>,
        targets: QuestionCounts,
        difficulty: DifficultyFilter,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            chapter_ids,
            targets,
            difficulty,
            exclude_ids: Vec::new(),
        }
    }

    pub fn with_exclusions(mut self, exclude_ids: Vec<String>) -> Self {
        self.exclude_ids = exclude_ids;
        self
    }
}

/// 半本书模板选用的章节范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterHalf {
    First,
    Second,
}

/// 一份待处理的试卷请求（从 TOML 文件加载）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub class_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub chapter_ids: Vec<String>,
    #[serde(default)]
    pub difficulty: DifficultyFilter,
    /// 模板优先；没有模板时使用 `targets`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<QuestionCounts>,
    /// 半本书模板：前半或后半（按章节顺序对半分，前半多一章）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half: Option<ChapterHalf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub exclude_ids: Vec<String>,
    /// 已有的选题，组卷时在此基础上补足
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub edited_questions: EditedQuestions,
    #[serde(default)]
    pub question_order: QuestionOrder,
    #[serde(default)]
    pub settings: PaperSettings,
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl PaperRequest {
    /// 抽题目标：模板分区汇总，否则显式目标，否则全为 0
    pub fn targets(&self) -> QuestionCounts {
        match (&self.template, &self.targets) {
            (Some(template), _) => template.targets(),
            (None, Some(targets)) => *targets,
            (None, None) => QuestionCounts::default(),
        }
    }

    pub fn composition(&self) -> CompositionRequest {
        CompositionRequest::new(
            self.class_id.clone(),
            self.subject_id.clone(),
            self.chapter_ids.clone(),
            self.targets(),
            self.difficulty,
        )
        .with_exclusions(self.exclude_ids.clone())
    }

    /// 实际使用的章节
    ///
    /// 显式给出的 `chapter_ids` 优先；为空时整本书模板使用全部章节，
    /// 半本书模板按 `half` 取前半或后半（未指定时使用全部章节）；其他情况为空。
    ///
    /// # 参数
    /// - `all_chapter_ids`: 该科目全部章节 ID，按题库顺序
    pub fn resolve_chapter_ids(&self, all_chapter_ids: &[String]) -> Vec<String> {
        if !self.chapter_ids.is_empty() {
            return self.chapter_ids.clone();
        }
        let Some(template) = &self.template else {
            return Vec::new();
        };
        match (template.category, self.half) {
            (TemplateCategory::FullBook, _) | (TemplateCategory::HalfBook, None) => all_chapter_ids.to_vec(),
            (TemplateCategory::HalfBook, Some(half)) => {
                let split = all_chapter_ids.len().div_ceil(2);
                match half {
                    ChapterHalf::First => all_chapter_ids[..split].to_vec(),
                    ChapterHalf::Second => all_chapter_ids[split..].to_vec(),
                }
            }
            (TemplateCategory::ChapterWise | TemplateCategory::MultiChapter, _) => Vec::new(),
        }
    }

    /// 组卷输入，章节按 `resolve_chapter_ids` 确定
    pub fn composition_within(&self, all_chapter_ids: &[String]) -> CompositionRequest {
        let mut composition = self.composition();
        composition.chapter_ids = self.resolve_chapter_ids(all_chapter_ids);
        composition
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_targets_prefer_template() {
        let request: PaperRequest = toml::from_str(
            r#"
            classId = "9th"
            subjectId = "physics"
            chapterIds = ["9_phy_ch1"]
            difficulty = "mixed"

            [targets]
            mcq = 3

            [template]
            [[template.sections]]
            type = "mcq"
            totalQuestions = 10
            attemptCount = 10
            marksPerQuestion = 1
            "#,
        )
        .unwrap();

        assert_eq!(request.targets(), QuestionCounts::new(10, 0, 0));
        let composition = request.composition();
        assert_eq!(composition.difficulty, DifficultyFilter::All);
        assert_eq!(composition.chapter_ids, vec!["9_phy_ch1".to_string()]);
    }

    #[test]
    fn test_request_targets_fallback() {
        let request: PaperRequest = toml::from_str(
            r#"
            classId = "10th"
            subjectId = "chemistry"
            difficulty = "impossible"

            [targets]
            short = 4
            "#,
        )
        .unwrap();
        assert_eq!(request.targets(), QuestionCounts::new(0, 4, 0));
        assert_eq!(request.difficulty, DifficultyFilter::All);
        assert!(request.selection.is_empty());
    }

    fn book_request(category: &str, half: Option<&str>) -> PaperRequest {
        let half = half.map(|h| format!("half = \"{}\"\n", h)).unwrap_or_default();
        toml::from_str(&format!(
            r#"
            classId = "9th"
            subjectId = "physics"
            {}
            [template]
            category = "{}"
            [[template.sections]]
            type = "mcq"
            totalQuestions = 5
            "#,
            half, category
        ))
        .unwrap()
    }

    fn chapter_ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("9_phy_ch{}", i)).collect()
    }

    #[test]
    fn test_full_book_uses_all_chapters() {
        let request = book_request("full_book", None);
        assert_eq!(request.resolve_chapter_ids(&chapter_ids(4)), chapter_ids(4));
        assert_eq!(request.composition_within(&chapter_ids(2)).chapter_ids, chapter_ids(2));
    }

    #[test]
    fn test_half_book_splits_odd_chapter_count() {
        let all = chapter_ids(5);
        let first = book_request("half_book", Some("first"));
        assert_eq!(first.half, Some(ChapterHalf::First));
        assert_eq!(first.resolve_chapter_ids(&all), all[..3].to_vec());

        let second = book_request("half_book", Some("second"));
        assert_eq!(second.resolve_chapter_ids(&all), all[3..].to_vec());

        let even = chapter_ids(4);
        assert_eq!(first.resolve_chapter_ids(&even), even[..2].to_vec());
        assert_eq!(second.resolve_chapter_ids(&even), even[2..].to_vec());

        let whole = book_request("half_book", None);
        assert_eq!(whole.resolve_chapter_ids(&all), all);
    }

    #[test]
    fn test_explicit_chapters_win_over_category() {
        let mut request = book_request("full_book", None);
        request.chapter_ids = vec!["9_phy_ch2".to_string()];
        assert_eq!(request.resolve_chapter_ids(&chapter_ids(4)), vec!["9_phy_ch2".to_string()]);

        let chapter_wise = book_request("chapter_wise", None);
        assert!(chapter_wise.resolve_chapter_ids(&chapter_ids(4)).is_empty());
        let no_template = PaperRequest::default();
        assert!(no_template.resolve_chapter_ids(&chapter_ids(4)).is_empty());
    }
}
