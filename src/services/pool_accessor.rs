//! 题库访问服务 - 业务能力层
//!
//! 只负责"按章节取题"能力，不关心抽题和流程

use crate::infrastructure::QuestionSource;
use crate::models::chapter::Chapter;
use crate::models::paper::QuestionCounts;
use crate::models::question::{Question, QuestionType};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// 题库访问服务
///
/// 职责：
/// - 按年级/科目/章节/题型查询题目池
/// - 为每道题补充所属章节信息
/// - 未知年级、科目、章节一律返回空结果，不报错
/// - 只读，无副作用
pub struct PoolAccessor<'a> {
    source: &'a dyn QuestionSource,
}

impl<'a> PoolAccessor<'a> {
    pub fn new(source: &'a dyn QuestionSource) -> Self {
        Self { source }
    }

    /// 查询题目池
    ///
    /// # 参数
    /// - `chapter_ids`: 章节 ID 列表，为空时返回空列表（不代表"全部章节"）
    /// - `kind`: 题型
    ///
    /// # 返回
    /// 按题库中的章节顺序、章节内的题目顺序返回
    pub fn list_questions(
        &self,
        class_id: &str,
        subject_id: &str,
        chapter_ids: &[String],
        kind: QuestionType,
    ) -> Vec<Question> {
        if chapter_ids.is_empty() {
            return Vec::new();
        }
        let Some(subject) = self.source.subject_data(class_id, subject_id) else {
            debug!("题库中没有 {}/{}", class_id, subject_id);
            return Vec::new();
        };

        let wanted: HashSet<&str> = chapter_ids.iter().map(String::as_str).collect();
        subject
            .chapters
            .iter()
            .filter(|chapter| wanted.contains(chapter.id.as_str()))
            .flat_map(|chapter| {
                chapter
                    .questions(kind)
                    .iter()
                    .map(move |raw| chapter.annotate(raw, kind))
            })
            .collect()
    }

    /// 章节列表（含各题型数量）
    pub fn chapters(&self, class_id: &str, subject_id: &str) -> Vec<Chapter> {
        self.source
            .subject_data(class_id, subject_id)
            .map(|subject| subject.chapters.iter().map(|ch| ch.snapshot()).collect())
            .unwrap_or_default()
    }

    /// 按 ID 在整个科目中查找题目
    pub fn find_question(&self, class_id: &str, subject_id: &str, question_id: &str) -> Option<Question> {
        let subject = self.source.subject_data(class_id, subject_id)?;
        for chapter in &subject.chapters {
            for kind in QuestionType::ALL {
                if let Some(raw) = chapter.questions(kind).iter().find(|q| q.id == question_id) {
                    return Some(chapter.annotate(raw, kind));
                }
            }
        }
        None
    }

    /// 所选章节中各题型的实际可用数量
    pub fn available_counts(&self, class_id: &str, subject_id: &str, chapter_ids: &[String]) -> QuestionCounts {
        let mut counts = QuestionCounts::default();
        for kind in QuestionType::ALL {
            counts.set(
                kind,
                self.list_questions(class_id, subject_id, chapter_ids, kind).len(),
            );
        }
        counts
    }

    /// 按题干关键字搜索（不区分大小写）
    pub fn search(
        &self,
        class_id: &str,
        subject_id: &str,
        chapter_ids: &[String],
        query: &str,
        kind: QuestionType,
    ) -> Vec<Question> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.list_questions(class_id, subject_id, chapter_ids, kind)
            .into_iter()
            .filter(|q| q.question_text.to_lowercase().contains(&term))
            .collect()
    }
}

/// 题目 ID 的前三段（`年级_科目_章节`）
static CHAPTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^_]+_[^_]+_[^_]+)(?:_|$)").expect("章节前缀正则无效"));

/// 获取题目所属章节 ID
///
/// 优先使用查询时填充的 `chapter_id`；外部数据没有该字段时退化为解析 ID 前三段，
/// 仍无法解析时使用 `ch_<章节号>`（章节号缺失按 1）。
pub fn chapter_id_of(question: &Question) -> String {
    if let Some(chapter_id) = &question.chapter_id {
        return chapter_id.clone();
    }
    if let Some(caps) = CHAPTER_PREFIX.captures(&question.id) {
        return caps[1].to_string();
    }
    format!("ch_{}", question.chapter_number.unwrap_or(1))
}
