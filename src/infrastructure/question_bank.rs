//! 题库 - 基础设施层
//!
//! 持有只读的题库数据，只暴露"按年级/科目取数据"的能力

use crate::models::chapter::SubjectData;
use crate::models::loaders::load_subject;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// 题库数据来源
///
/// 题库访问层只依赖这个接口，便于测试时替换为内存数据。
pub trait QuestionSource: Send + Sync {
    /// 获取某年级某科目的题库，不存在时返回 `None`
    fn subject_data(&self, class_id: &str, subject_id: &str) -> Option<Arc<SubjectData>>;
}

type BankKey = (String, String);

fn bank_key(class_id: &str, subject_id: &str) -> BankKey {
    (class_id.to_string(), subject_id.to_lowercase())
}

/// 题库
///
/// 职责：
/// - 缓存已加载的科目数据（加载一次，之后只读）
/// - 按需从磁盘懒加载
/// - 不认识 Selection / Template
/// - 不做抽题
pub struct QuestionBank {
    root: Option<PathBuf>,
    subjects: RwLock<HashMap<BankKey, Arc<SubjectData>>>,
}

impl QuestionBank {
    /// 创建纯内存题库
    pub fn in_memory() -> Self {
        Self {
            root: None,
            subjects: RwLock::new(HashMap::new()),
        }
    }

    /// 创建以目录为数据源的题库
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            subjects: RwLock::new(HashMap::new()),
        }
    }

    /// 直接放入一份科目数据（覆盖已有数据）
    pub fn insert(&self, class_id: &str, subject_id: &str, data: SubjectData) {
        let mut subjects = self.subjects.write().unwrap_or_else(|e| e.into_inner());
        subjects.insert(bank_key(class_id, subject_id), Arc::new(data));
    }

    pub fn with_subject(self, class_id: &str, subject_id: &str, data: SubjectData) -> Self {
        self.insert(class_id, subject_id, data);
        self
    }

    /// 是否已缓存
    pub fn is_loaded(&self, class_id: &str, subject_id: &str) -> bool {
        self.subjects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&bank_key(class_id, subject_id))
    }

    /// 确保科目数据已加载
    ///
    /// 加载失败只记录警告并返回 `false`，调用方按空题库处理。
    pub async fn ensure_loaded(&self, class_id: &str, subject_id: &str) -> bool {
        if self.is_loaded(class_id, subject_id) {
            return true;
        }

        let Some(root) = &self.root else {
            debug!("内存题库中没有 {}/{}", class_id, subject_id);
            return false;
        };

        match load_subject(root, class_id, subject_id).await {
            Ok(data) => {
                info!(
                    "📚 已加载题库 {}/{}: {} 个章节",
                    class_id,
                    subject_id,
                    data.chapters.len()
                );
                self.insert(class_id, subject_id, data);
                true
            }
            Err(e) => {
                warn!("⚠️ 无法加载题库 {}/{}: {}", class_id, subject_id, e);
                false
            }
        }
    }

    /// 已缓存的科目数量
    pub fn len(&self) -> usize {
        self.subjects.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuestionSource for QuestionBank {
    fn subject_data(&self, class_id: &str, subject_id: &str) -> Option<Arc<SubjectData>> {
        self.subjects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&bank_key(class_id, subject_id))
            .cloned()
    }
}
