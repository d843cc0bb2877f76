use crate::models::request::PaperRequest;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载组卷请求
pub async fn load_paper_request(toml_file_path: &Path) -> Result<PaperRequest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let request: PaperRequest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(request.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有组卷请求
///
/// 单个文件解析失败只记录警告，不影响其他请求。返回结果按文件名排序。
pub async fn load_all_requests(folder_path: &str) -> Result<Vec<PaperRequest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut requests = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_paper_request(&path).await {
            Ok(request) => {
                tracing::info!(
                    "成功加载请求: {} / {} ({} 个章节)",
                    request.class_id,
                    request.subject_id,
                    request.chapter_ids.len()
                );
                requests.push(request);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(requests)
}
