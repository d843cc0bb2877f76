//! 试卷存储服务 - 业务能力层
//!
//! 只负责"保存/读取试卷记录"能力，整个列表存为一个 JSON 文件

use crate::error::{AppError, AppResult, StorageError};
use crate::models::paper::PaperRecord;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// 默认最多保存的试卷数
pub const DEFAULT_MAX_PAPERS: usize = 50;

/// 试卷存储服务
///
/// 职责：
/// - 最新的试卷排在最前
/// - 超过上限时丢弃最旧的记录
/// - 每次写入都整体替换文件（先写临时文件再重命名）
/// - 同一实例内的读改写串行执行
pub struct PaperStore {
    path: PathBuf,
    max_papers: usize,
    lock: Mutex<()>,
}

impl PaperStore {
    pub fn new(path: impl Into<PathBuf>, max_papers: usize) -> Self {
        Self {
            path: path.into(),
            max_papers: max_papers.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全部试卷（最新在前），文件不存在时为空
    pub async fn list(&self) -> AppResult<Vec<PaperRecord>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    pub async fn get(&self, paper_id: &str) -> AppResult<Option<PaperRecord>> {
        Ok(self.list().await?.into_iter().find(|p| p.id == paper_id))
    }

    /// 保存新试卷到最前面
    pub async fn save(&self, record: PaperRecord) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut papers = self.read_all().await?;
        info!("💾 保存试卷: {} ({})", record.title, record.id);
        papers.insert(0, record);
        papers.truncate(self.max_papers);
        self.write_all(&papers).await
    }

    /// 修改已有试卷
    ///
    /// # 返回
    /// 找到并修改返回 `true`，不存在返回 `false`（不写文件）
    pub async fn update<F>(&self, paper_id: &str, apply: F) -> AppResult<bool>
    where
        F: FnOnce(&mut PaperRecord),
    {
        let _guard = self.lock.lock().await;
        let mut papers = self.read_all().await?;
        let Some(record) = papers.iter_mut().find(|p| p.id == paper_id) else {
            return Ok(false);
        };
        apply(record);
        self.write_all(&papers).await?;
        Ok(true)
    }

    pub async fn delete(&self, paper_id: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut papers = self.read_all().await?;
        let before = papers.len();
        papers.retain(|p| p.id != paper_id);
        if papers.len() == before {
            return Ok(false);
        }
        self.write_all(&papers).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        self.write_all(&[]).await
    }

    async fn read_all(&self) -> AppResult<Vec<PaperRecord>> {
        let path_str = self.path.display().to_string();
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: path_str,
                    source: e,
                }
                .into())
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupted {
                path: path_str,
                source: e,
            }
            .into()
        })
    }

    async fn write_all(&self, papers: &[PaperRecord]) -> AppResult<()> {
        let path_str = self.path.display().to_string();
        let json = serde_json::to_string_pretty(papers).map_err(|e| StorageError::Corrupted {
            path: path_str.clone(),
            source: e,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage_write_failed(&path_str, e))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| AppError::storage_write_failed(&path_str, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| AppError::storage_write_failed(&path_str, e))?;

        debug!("试卷存储已写入: {} 份 -> {}", papers.len(), path_str);
        Ok(())
    }
}
