//! 组卷引擎 - 业务能力层
//!
//! 取题 → 难度筛选 → 抽样，三种题型互相独立

use crate::infrastructure::RandomSource;
use crate::models::paper::{QuestionCounts, Selection};
use crate::models::question::{DifficultyFilter, QuestionType};
use crate::models::request::CompositionRequest;
use crate::services::difficulty_filter::filter_by_difficulty;
use crate::services::pool_accessor::PoolAccessor;
use crate::services::sampler::Sampler;
use std::collections::HashSet;
use tracing::debug;

/// 可用数量检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub requested: QuestionCounts,
    /// 经难度筛选和排除后的实际可用数量
    pub available: QuestionCounts,
}

impl Availability {
    /// 某题型缺少的数量
    pub fn shortfall(&self, kind: QuestionType) -> usize {
        self.requested.get(kind).saturating_sub(self.available.get(kind))
    }

    pub fn sufficient(&self) -> bool {
        QuestionType::ALL.iter().all(|kind| self.shortfall(*kind) == 0)
    }
}

/// 组卷引擎
///
/// 职责：
/// - 按题型独立组卷，题型之间不互相借用数量
/// - 在已有选题基础上补足（不丢弃已有选题）
/// - 数量不足时返回能拿到的全部，不报错
/// - 无状态：调用之间不保留任何数据
pub struct CompositionEngine<'a> {
    accessor: PoolAccessor<'a>,
}

impl<'a> CompositionEngine<'a> {
    pub fn new(accessor: PoolAccessor<'a>) -> Self {
        Self { accessor }
    }

    /// 从零组卷
    ///
    /// 按 mcq → short → long 的固定顺序使用同一个随机数来源，
    /// 相同种子得到相同结果。
    pub fn compose<R: RandomSource>(&self, request: &CompositionRequest, rng: &mut R) -> Selection {
        self.fill_to_target(request, &Selection::default(), rng)
    }

    /// 在已有选题基础上补足到目标数量
    ///
    /// 每种题型：已有 ID 保持原顺序在前，新抽的 ID 追加在后；
    /// 已有数量超过目标时原样保留，不截断。
    pub fn fill_to_target<R: RandomSource>(
        &self,
        request: &CompositionRequest,
        existing: &Selection,
        rng: &mut R,
    ) -> Selection {
        let mut sampler = Sampler::new(rng);
        let mut selection = Selection::default();

        for kind in QuestionType::ALL {
            let current = existing.ids(kind);
            let additional = request.targets.get(kind).saturating_sub(current.len());

            let mut excluded: HashSet<&str> = request.exclude_ids.iter().map(String::as_str).collect();
            excluded.extend(current.iter().map(String::as_str));

            let drawn = self.draw(
                &request.class_id,
                &request.subject_id,
                &request.chapter_ids,
                request.difficulty,
                kind,
                &excluded,
                additional,
                &mut sampler,
            );

            debug!(
                "{} 题型: 已有 {} 道, 目标 {} 道, 新抽 {} 道",
                kind,
                current.len(),
                request.targets.get(kind),
                drawn.len()
            );

            let mut ids = current.to_vec();
            ids.extend(drawn);
            selection.replace(kind, ids);
        }

        selection
    }

    /// 补题
    ///
    /// # 参数
    /// - `existing_ids`: 已选中的 ID（不重复），保持原顺序在前
    /// - `additional_count`: 需要新增的数量
    ///
    /// # 返回
    /// `existing_ids` + 最多 `additional_count` 道新题，新题不与已有重复
    #[allow(clippy::too_many_arguments)]
    pub fn top_up<R: RandomSource>(
        &self,
        existing_ids: &[String],
        class_id: &str,
        subject_id: &str,
        chapter_ids: &[String],
        additional_count: usize,
        difficulty: DifficultyFilter,
        kind: QuestionType,
        rng: &mut R,
    ) -> Vec<String> {
        let excluded: HashSet<&str> = existing_ids.iter().map(String::as_str).collect();
        let mut sampler = Sampler::new(rng);
        let drawn = self.draw(
            class_id,
            subject_id,
            chapter_ids,
            difficulty,
            kind,
            &excluded,
            additional_count,
            &mut sampler,
        );

        let mut ids = existing_ids.to_vec();
        ids.extend(drawn);
        ids
    }

    /// 只统计可用数量，不抽样
    pub fn check_availability(&self, request: &CompositionRequest) -> Availability {
        let excluded: HashSet<&str> = request.exclude_ids.iter().map(String::as_str).collect();
        let mut available = QuestionCounts::default();
        for kind in QuestionType::ALL {
            let pool = self.candidate_ids(
                &request.class_id,
                &request.subject_id,
                &request.chapter_ids,
                request.difficulty,
                kind,
                &excluded,
            );
            available.set(kind, pool.len());
        }
        Availability {
            requested: request.targets,
            available,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw<R: RandomSource>(
        &self,
        class_id: &str,
        subject_id: &str,
        chapter_ids: &[String],
        difficulty: DifficultyFilter,
        kind: QuestionType,
        excluded: &HashSet<&str>,
        count: usize,
        sampler: &mut Sampler<R>,
    ) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        let pool = self.candidate_ids(class_id, subject_id, chapter_ids, difficulty, kind, excluded);
        sampler.sample(&pool, count)
    }

    /// 题目池 → 难度筛选 → 去掉排除项，得到候选 ID
    fn candidate_ids(
        &self,
        class_id: &str,
        subject_id: &str,
        chapter_ids: &[String],
        difficulty: DifficultyFilter,
        kind: QuestionType,
        excluded: &HashSet<&str>,
    ) -> Vec<String> {
        let pool = self.accessor.list_questions(class_id, subject_id, chapter_ids, kind);
        let mut seen = HashSet::new();
        filter_by_difficulty(&pool, difficulty)
            .into_iter()
            .map(|q| q.id)
            .filter(|id| !excluded.contains(id.as_str()))
            // 题库中重复的 ID 只保留第一次出现
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{QuestionBank, StdRandom};
    use crate::models::chapter::SubjectData;

    fn bank() -> QuestionBank {
        let mcqs: Vec<String> = (1..=8)
            .map(|i| {
                let difficulty = if i <= 5 { "easy" } else { "hard" };
                format!(
                    r#"{{"id": "9_bio_ch1_m{}", "questionText": "MCQ {}", "difficulty": "{}"}}"#,
                    i, i, difficulty
                )
            })
            .collect();
        let shorts: Vec<String> = (1..=4)
            .map(|i| format!(r#"{{"id": "9_bio_ch2_s{}", "questionText": "Short {}"}}"#, i, i))
            .collect();
        let json = format!(
            r#"{{"chapters": [
                {{"id": "9_bio_ch1", "number": 1, "name": "Cells", "mcqs": [{}]}},
                {{"id": "9_bio_ch2", "number": 2, "name": "Tissues", "shortQuestions": [{}]}}
            ]}}"#,
            mcqs.join(","),
            shorts.join(",")
        );
        let data: SubjectData = serde_json::from_str(&json).unwrap();
        QuestionBank::in_memory().with_subject("9th", "biology", data)
    }

    fn chapters() -> Vec<String> {
        vec!["9_bio_ch1".to_string(), "9_bio_ch2".to_string()]
    }

    #[test]
    fn test_compose_caps_at_pool_and_filters() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(10, 2, 3),
            DifficultyFilter::Easy,
        );
        let selection = engine.compose(&request, &mut StdRandom::seeded(1));

        assert_eq!(selection.mcq_ids.len(), 5);
        assert!(selection.mcq_ids.iter().all(|id| {
            let n: u32 = id.trim_start_matches("9_bio_ch1_m").parse().unwrap();
            n <= 5
        }));
        // 简答题默认 medium，easy 筛选后为空
        assert!(selection.short_ids.is_empty());
        assert!(selection.long_ids.is_empty());
    }

    #[test]
    fn test_compose_no_cross_type_borrowing() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(1, 10, 5),
            DifficultyFilter::All,
        );
        let selection = engine.compose(&request, &mut StdRandom::seeded(5));
        assert_eq!(selection.counts(), QuestionCounts::new(1, 4, 0));
    }

    #[test]
    fn test_compose_empty_chapters() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            Vec::new(),
            QuestionCounts::new(5, 5, 5),
            DifficultyFilter::All,
        );
        assert_eq!(engine.compose(&request, &mut StdRandom::seeded(9)), Selection::default());
    }

    #[test]
    fn test_exclusions_are_never_drawn() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(8, 0, 0),
            DifficultyFilter::All,
        )
        .with_exclusions(vec!["9_bio_ch1_m1".into(), "9_bio_ch1_m8".into()]);
        let selection = engine.compose(&request, &mut StdRandom::seeded(3));
        assert_eq!(selection.mcq_ids.len(), 6);
        assert!(!selection.contains("9_bio_ch1_m1"));
        assert!(!selection.contains("9_bio_ch1_m8"));
    }

    #[test]
    fn test_top_up_keeps_prefix() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let existing = vec!["9_bio_ch1_m7".to_string(), "9_bio_ch1_m2".to_string()];
        let ids = engine.top_up(
            &existing,
            "9th",
            "biology",
            &chapters(),
            3,
            DifficultyFilter::All,
            QuestionType::Mcq,
            &mut StdRandom::seeded(17),
        );
        assert_eq!(ids.len(), 5);
        assert_eq!(&ids[..2], existing.as_slice());
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_fill_to_target_keeps_extras() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let mut existing = Selection::default();
        existing.replace(
            QuestionType::Short,
            vec!["9_bio_ch2_s4".into(), "9_bio_ch2_s1".into(), "9_bio_ch2_s2".into()],
        );
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(2, 2, 0),
            DifficultyFilter::All,
        );
        let selection = engine.fill_to_target(&request, &existing, &mut StdRandom::seeded(4));
        assert_eq!(selection.short_ids, existing.short_ids);
        assert_eq!(selection.mcq_ids.len(), 2);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(4, 2, 0),
            DifficultyFilter::All,
        );
        let a = engine.compose(&request, &mut StdRandom::seeded(99));
        let b = engine.compose(&request, &mut StdRandom::seeded(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_check_availability() {
        let bank = bank();
        let engine = CompositionEngine::new(PoolAccessor::new(&bank));
        let request = CompositionRequest::new(
            "9th",
            "biology",
            chapters(),
            QuestionCounts::new(4, 6, 0),
            DifficultyFilter::Hard,
        );
        let availability = engine.check_availability(&request);
        assert_eq!(availability.available, QuestionCounts::new(3, 0, 0));
        assert_eq!(availability.shortfall(QuestionType::Mcq), 1);
        assert_eq!(availability.shortfall(QuestionType::Short), 6);
        assert!(!availability.sufficient());
    }
}
