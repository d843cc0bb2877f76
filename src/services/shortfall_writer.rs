//! 缺题记录服务 - 业务能力层
//!
//! 只负责"写 shortfall.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::question::QuestionType;

/// 缺题记录服务
///
/// 职责：
/// - 题库数量不足时追加一行记录，供人工补题
/// - 只记录，不改变组卷结果
pub struct ShortfallWriter {
    file_path: String,
}

impl ShortfallWriter {
    pub fn new() -> Self {
        Self {
            file_path: "shortfall.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    /// 写入一条缺题记录
    ///
    /// # 参数
    /// - `paper_name`: 试卷名称（请求文件名或标题）
    /// - `kind`: 题型
    /// - `requested`: 目标数量
    /// - `actual`: 实际抽到的数量
    pub fn write(&self, paper_name: &str, kind: QuestionType, requested: usize, actual: usize) -> Result<()> {
        debug!(
            "写入缺题记录: {} | {} | {}/{}",
            paper_name, kind, actual, requested
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let line = format!(
            "试卷 {} | 题型 {} | 需要 {} | 实际 {} | 缺 {}\n",
            paper_name,
            kind,
            requested,
            actual,
            requested.saturating_sub(actual)
        );
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for ShortfallWriter {
    fn default() -> Self {
        Self::new()
    }
}
