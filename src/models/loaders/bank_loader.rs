//! 题库文件加载
//!
//! 目录结构：`<题库根目录>/<年级>/<科目>.json` 或 `<科目>.toml`，科目名小写。

use crate::error::{AppError, AppResult, BankError};
use crate::models::chapter::SubjectData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 查找科目文件，JSON 优先
pub async fn find_subject_file(root: &Path, class_id: &str, subject_id: &str) -> Option<PathBuf> {
    let dir = root.join(class_id);
    let stem = subject_id.to_lowercase();
    for ext in ["json", "toml"] {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }
    None
}

/// 按扩展名解析单个科目文件
pub async fn load_subject_file(path: &Path) -> AppResult<SubjectData> {
    let path_display = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::bank_read_failed(path_display.clone(), e))?;

    let data: SubjectData = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|source| BankError::TomlParseFailed {
            path: path_display.clone(),
            source,
        })?,
        _ => serde_json::from_str(&content).map_err(|source| BankError::JsonParseFailed {
            path: path_display.clone(),
            source,
        })?,
    };

    debug!("已加载题库文件 {}: {} 个章节", path_display, data.chapters.len());
    Ok(data)
}

/// 加载某年级某科目的题库
pub async fn load_subject(root: &Path, class_id: &str, subject_id: &str) -> AppResult<SubjectData> {
    if !fs::try_exists(root).await.unwrap_or(false) {
        return Err(BankError::DirectoryNotFound {
            path: root.display().to_string(),
        }
        .into());
    }

    let path = find_subject_file(root, class_id, subject_id)
        .await
        .ok_or_else(|| BankError::SubjectNotFound {
            class_id: class_id.to_string(),
            subject_id: subject_id.to_string(),
        })?;

    load_subject_file(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_bank() -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "paper_bank_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        fs::create_dir_all(root.join("9th")).await.unwrap();
        root
    }

    #[tokio::test]
    async fn test_load_json_and_toml_subjects() {
        let root = temp_bank().await;
        fs::write(
            root.join("9th/physics.json"),
            r#"{"chapters": [{"id": "9_phy_ch1", "number": 1, "name": "Units",
                "mcqs": [{"id": "9_phy_ch1_m1", "questionText": "?", "difficulty": "easy"}]}]}"#,
        )
        .await
        .unwrap();
        fs::write(
            root.join("9th/chemistry.toml"),
            r#"
            [[chapters]]
            id = "9_chem_ch1"
            number = 1
            name = "Fundamentals"

            [[chapters.shortQuestions]]
            id = "9_chem_ch1_s1"
            questionText = "Define mole."
            difficulty = "medium"
            "#,
        )
        .await
        .unwrap();

        let physics = load_subject(&root, "9th", "Physics").await.unwrap();
        assert_eq!(physics.chapters[0].mcqs.len(), 1);

        let chemistry = load_subject(&root, "9th", "chemistry").await.unwrap();
        assert_eq!(chemistry.chapters[0].short_questions[0].id, "9_chem_ch1_s1");

        let missing = load_subject(&root, "10th", "physics").await;
        assert!(matches!(
            missing,
            Err(AppError::Bank(BankError::SubjectNotFound { .. }))
        ));

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_broken_file_reports_parse_error() {
        let root = temp_bank().await;
        fs::write(root.join("9th/biology.json"), "{not json").await.unwrap();

        let result = load_subject(&root, "9th", "biology").await;
        assert!(matches!(
            result,
            Err(AppError::Bank(BankError::JsonParseFailed { .. }))
        ));

        fs::remove_dir_all(&root).await.unwrap();
    }
}
