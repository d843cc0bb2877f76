//! 导出数据构建 - 业务能力层
//!
//! 把选题解析为完整题目，按用户顺序排列，生成渲染服务需要的数据和持久化记录

use crate::models::paper::{
    EditedQuestions, ExportPayload, PaperRecord, PaperSettings, QuestionOrder, Selection,
};
use crate::models::question::{is_custom_id, Question, QuestionType};
use crate::services::pool_accessor::{chapter_id_of, PoolAccessor};
use crate::services::question_merge::resolve_question;
use crate::services::totals::PaperTotals;
use std::collections::HashMap;
use tracing::warn;

/// 按用户顺序排列题目
///
/// 顺序中列出的 ID 按列出的顺序在前；未列出的题目保持原有相对顺序排在后面。
/// 顺序为空时原样返回。
pub fn apply_question_order(questions: Vec<Question>, order: &[String]) -> Vec<Question> {
    if order.is_empty() {
        return questions;
    }
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .rev()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut indexed: Vec<(usize, Question)> = questions
        .into_iter()
        .map(|q| (rank.get(q.id.as_str()).copied().unwrap_or(usize::MAX), q))
        .collect();
    // sort_by_key 是稳定排序，未列出的题目保持原顺序
    indexed.sort_by_key(|(r, _)| *r);
    indexed.into_iter().map(|(_, q)| q).collect()
}

/// 导出数据构建器
pub struct ExportBuilder<'a> {
    accessor: PoolAccessor<'a>,
}

impl<'a> ExportBuilder<'a> {
    pub fn new(accessor: PoolAccessor<'a>) -> Self {
        Self { accessor }
    }

    /// 解析某题型的全部选题
    ///
    /// 无法解析的 ID（题库中不存在且没有修改内容）记录警告后跳过。
    pub fn resolve(
        &self,
        class_id: &str,
        subject_id: &str,
        kind: QuestionType,
        ids: &[String],
        edited: &EditedQuestions,
    ) -> Vec<Question> {
        ids.iter()
            .filter_map(|id| {
                let base = self.accessor.find_question(class_id, subject_id, id);
                let Some(mut question) = resolve_question(id, kind, base.as_ref(), edited) else {
                    warn!("⚠️ 题目 {} 在题库中不存在，已跳过", id);
                    return None;
                };
                // 题库外的修改题目没有章节字段，按 ID 推断
                if question.chapter_id.is_none() && !is_custom_id(id) {
                    question.chapter_id = Some(chapter_id_of(&question));
                }
                Some(question)
            })
            .collect()
    }

    /// 去掉无法解析的选题 ID
    ///
    /// 保留题库中存在的 ID、自定义 ID 和有修改内容的 ID，其余的记录警告后去掉，
    /// 保证试卷记录中的题量、总分与导出的题目一致。
    pub fn retain_resolvable(
        &self,
        class_id: &str,
        subject_id: &str,
        selection: &Selection,
        edited: &EditedQuestions,
    ) -> Selection {
        let mut retained = Selection::default();
        for kind in QuestionType::ALL {
            let ids = selection
                .ids(kind)
                .iter()
                .filter(|id| {
                    let keep = is_custom_id(id)
                        || edited.contains_key(id.as_str())
                        || self.accessor.find_question(class_id, subject_id, id).is_some();
                    if !keep {
                        warn!("⚠️ 已选题目 {} 在题库中不存在，已移出选题", id);
                    }
                    keep
                })
                .cloned()
                .collect();
            retained.replace(kind, ids);
        }
        retained
    }

    /// 构建导出数据
    ///
    /// # 参数
    /// - `class_id` / `subject_id`: 题库查询用的年级和科目
    /// - `selection`: 选题
    /// - `edited`: 用户修改
    /// - `order`: 用户调整的顺序，为空时使用选题顺序
    /// - `settings`: 已填好分值和页眉信息的设置
    ///
    /// # 返回
    /// 三个题目数组的顺序与 `question_order` 完全一致
    pub fn build_payload(
        &self,
        class_id: &str,
        subject_id: &str,
        selection: &Selection,
        edited: &EditedQuestions,
        order: &QuestionOrder,
        settings: PaperSettings,
    ) -> ExportPayload {
        let mut arrays: HashMap<QuestionType, Vec<Question>> = HashMap::new();
        for kind in QuestionType::ALL {
            let questions = self.resolve(class_id, subject_id, kind, selection.ids(kind), edited);
            arrays.insert(kind, apply_question_order(questions, order.get(kind)));
        }
        let mut take = |kind: QuestionType| arrays.remove(&kind).unwrap_or_default();
        let (mcqs, shorts, longs) = (
            take(QuestionType::Mcq),
            take(QuestionType::Short),
            take(QuestionType::Long),
        );

        let question_order = (!order.is_empty()).then(|| QuestionOrder {
            mcqs: mcqs.iter().map(|q| q.id.clone()).collect(),
            shorts: shorts.iter().map(|q| q.id.clone()).collect(),
            longs: longs.iter().map(|q| q.id.clone()).collect(),
        });

        let edited_questions = edited
            .iter()
            .filter(|(id, _)| selection.contains(id))
            .map(|(id, edit)| (id.clone(), edit.clone()))
            .collect();

        ExportPayload {
            settings,
            mcqs,
            shorts,
            longs,
            edited_questions,
            question_order,
            section_instructions: Vec::new(),
        }
    }
}

/// 生成试卷记录 ID（`paper_<毫秒时间戳>_<随机数>`）
pub fn generate_paper_id() -> String {
    format!(
        "paper_{}_{:06}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>() % 1_000_000
    )
}

/// 构建持久化的试卷记录
pub fn build_paper_record(
    id: String,
    selection: &Selection,
    settings: &PaperSettings,
    edited: &EditedQuestions,
    order: &QuestionOrder,
    totals: PaperTotals,
) -> PaperRecord {
    let counts = selection.counts();
    let question_order = if order.is_empty() {
        QuestionOrder::from_selection(selection)
    } else {
        order.clone()
    };

    PaperRecord {
        id,
        class_id: settings.class_id.clone(),
        subject: settings.subject.clone(),
        title: settings.title.clone(),
        exam_type: settings.exam_type.clone(),
        date: settings.date.clone(),
        time_allowed: settings.time_allowed.clone(),
        institute_name: settings.institute_name.clone(),
        total_marks: totals.total_marks,
        question_count: totals.question_count,
        mcq_count: counts.mcq,
        short_count: counts.short,
        long_count: counts.long,
        mcq_ids: selection.mcq_ids.clone(),
        short_ids: selection.short_ids.clone(),
        long_ids: selection.long_ids.clone(),
        custom_marks: settings.custom_marks,
        edited_questions: edited.clone(),
        question_order,
        settings: settings.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::QuestionBank;
    use crate::models::chapter::SubjectData;
    use crate::models::paper::{CustomMarks, QuestionOverride};
    use crate::services::totals::compute_totals;

    fn ids(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.id.as_str()).collect()
    }

    fn bank() -> QuestionBank {
        let data: SubjectData = serde_json::from_str(
            r#"{"chapters": [{"id": "10_math_ch1", "number": 1, "name": "Quadratics",
                "mcqs": [
                    {"id": "10_math_ch1_m1", "questionText": "Roots of x^2 = 4?", "options": ["2", "-2", "±2", "4"], "correctOption": 2},
                    {"id": "10_math_ch1_m2", "questionText": "Discriminant of x^2 + 1?"}
                ],
                "shortQuestions": [
                    {"id": "10_math_ch1_s1", "questionText": "Solve x^2 - 5x + 6 = 0."}
                ]}]}"#,
        )
        .unwrap();
        QuestionBank::in_memory().with_subject("10th", "math", data)
    }

    fn settings() -> PaperSettings {
        PaperSettings {
            class_id: "10th".into(),
            subject: "math".into(),
            ..Default::default()
        }
    }

    fn q(id: &str) -> Question {
        Question {
            id: id.to_string(),
            kind: QuestionType::Long,
            question_text: id.to_string(),
            difficulty: Default::default(),
            marks: None,
            chapter_id: None,
            chapter_number: None,
            chapter_name: None,
            topic: None,
            choice: None,
        }
    }

    #[test]
    fn test_apply_question_order() {
        let questions = vec![q("a"), q("b"), q("c"), q("d")];
        let order = vec!["c".to_string(), "missing".to_string(), "a".to_string()];
        let ordered = apply_question_order(questions.clone(), &order);
        assert_eq!(ids(&ordered), vec!["c", "a", "b", "d"]);

        assert_eq!(apply_question_order(questions.clone(), &[]), questions);
    }

    #[test]
    fn test_payload_follows_order_and_merges() {
        let bank = bank();
        let builder = ExportBuilder::new(PoolAccessor::new(&bank));
        let selection = Selection {
            mcq_ids: vec!["10_math_ch1_m1".into(), "10_math_ch1_m2".into(), "custom_q_1".into()],
            short_ids: vec!["10_math_ch1_s1".into(), "10_math_ch1_gone".into()],
            long_ids: Vec::new(),
        };
        let mut edited = EditedQuestions::new();
        edited.insert(
            "custom_q_1".into(),
            QuestionOverride {
                question_text: Some("Sum of roots of x^2 - 3x + 2?".into()),
                ..Default::default()
            },
        );
        edited.insert("unrelated".into(), QuestionOverride::default());
        let order = QuestionOrder {
            mcqs: vec!["custom_q_1".into(), "10_math_ch1_m2".into()],
            ..Default::default()
        };

        let payload = builder.build_payload("10th", "math", &selection, &edited, &order, settings());

        assert_eq!(ids(&payload.mcqs), vec!["custom_q_1", "10_math_ch1_m2", "10_math_ch1_m1"]);
        // 不存在且没有修改内容的题目被跳过
        assert_eq!(ids(&payload.shorts), vec!["10_math_ch1_s1"]);
        let question_order = payload.question_order.unwrap();
        assert_eq!(question_order.mcqs, vec!["custom_q_1", "10_math_ch1_m2", "10_math_ch1_m1"]);
        assert_eq!(question_order.shorts, vec!["10_math_ch1_s1"]);
        assert!(payload.edited_questions.contains_key("custom_q_1"));
        assert!(!payload.edited_questions.contains_key("unrelated"));
        assert_eq!(payload.mcqs[2].choice.as_ref().unwrap().correct_option, 2);
    }

    #[test]
    fn test_retain_resolvable_drops_stale_ids() {
        let bank = bank();
        let builder = ExportBuilder::new(PoolAccessor::new(&bank));
        let selection = Selection {
            mcq_ids: vec!["10_math_ch1_m1".into(), "10_math_ch1_old".into(), "custom_q_9".into()],
            short_ids: vec!["10_math_ch2_edited".into()],
            long_ids: Vec::new(),
        };
        let mut edited = EditedQuestions::new();
        edited.insert(
            "10_math_ch2_edited".into(),
            QuestionOverride {
                question_text: Some("Prove the identity.".into()),
                ..Default::default()
            },
        );

        let retained = builder.retain_resolvable("10th", "math", &selection, &edited);
        assert_eq!(retained.mcq_ids, vec!["10_math_ch1_m1", "custom_q_9"]);
        assert_eq!(retained.short_ids, vec!["10_math_ch2_edited"]);

        let shorts = builder.resolve("10th", "math", QuestionType::Short, &retained.short_ids, &edited);
        assert_eq!(shorts[0].chapter_id.as_deref(), Some("10_math_ch2"));
        let mcqs = builder.resolve("10th", "math", QuestionType::Mcq, &retained.mcq_ids, &edited);
        assert_eq!(mcqs[1].chapter_id, None);
    }

    #[test]
    fn test_payload_without_order_keeps_selection_order() {
        let bank = bank();
        let builder = ExportBuilder::new(PoolAccessor::new(&bank));
        let selection = Selection {
            mcq_ids: vec!["10_math_ch1_m2".into(), "10_math_ch1_m1".into()],
            ..Default::default()
        };
        let payload = builder.build_payload(
            "10th",
            "math",
            &selection,
            &EditedQuestions::new(),
            &QuestionOrder::default(),
            settings(),
        );
        assert_eq!(ids(&payload.mcqs), vec!["10_math_ch1_m2", "10_math_ch1_m1"]);
        assert!(payload.question_order.is_none());

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("questionOrder").is_none());
        assert_eq!(value["settings"]["customMarks"]["long"], 5.0);
    }

    #[test]
    fn test_build_paper_record() {
        let selection = Selection {
            mcq_ids: vec!["m1".into(), "m2".into()],
            short_ids: vec!["s1".into()],
            long_ids: Vec::new(),
        };
        let mut settings = settings();
        settings.custom_marks = CustomMarks::new(1.0, 3.0, 5.0);
        let totals = compute_totals(&selection, &settings.custom_marks);
        let record = build_paper_record(
            generate_paper_id(),
            &selection,
            &settings,
            &EditedQuestions::new(),
            &QuestionOrder::default(),
            totals,
        );
        assert!(record.id.starts_with("paper_"));
        assert_eq!(record.total_marks, 5.0);
        assert_eq!(record.question_count, 3);
        assert_eq!(record.question_order.mcqs, selection.mcq_ids);
        assert_eq!(record.selection(), selection);
    }
}
