//! 单个试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个组卷请求，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **请求校验**：年级和科目不能为空
//! 2. **题库加载**：按需加载该年级科目的题库
//! 3. **流程调度**：委托 `PaperFlow` 完成组卷
//! 4. **结果输出**：写出导出数据 JSON、保存试卷记录
//! 5. **渲染**：配置了渲染服务时生成 PDF/DOCX
//! 6. **统计输出**：记录题目数量、总分和缺题情况

use crate::clients::RendererClient;
use crate::config::Config;
use crate::error::{AppError, ConfigError, ExportError};
use crate::infrastructure::{QuestionBank, StdRandom};
use crate::models::request::PaperRequest;
use crate::services::PaperStore;
use crate::workflow::{PaperCtx, PaperFlow, PaperOutcome};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 处理单个组卷请求
///
/// # 参数
/// - `bank`: 题库（按需加载）
/// - `store`: 试卷存储
/// - `renderer`: 渲染服务客户端（可选）
/// - `request`: 组卷请求
/// - `paper_index`: 试卷索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回是否成功处理；题库数量不足不算失败
pub async fn process_paper(
    bank: &QuestionBank,
    store: &PaperStore,
    renderer: Option<&RendererClient>,
    request: PaperRequest,
    paper_index: usize,
    config: &Config,
) -> Result<bool> {
    validate_request(&request)?;

    let ctx = PaperCtx::from_request(paper_index, &request);
    log_paper_start(&ctx, &request);

    if !bank.ensure_loaded(&request.class_id, &request.subject_id).await {
        warn!("{} ⚠️ 题库不可用，将生成空试卷", ctx);
    }

    let seed = request
        .seed
        .or_else(|| config.random_seed.map(|s| s.wrapping_add(paper_index as u64)));
    let mut rng = StdRandom::from_seed_option(seed);

    let output_dir = PathBuf::from(&config.output_folder);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    // 组卷（委托给 PaperFlow）
    let flow = PaperFlow::new(config);
    let outcome = flow.run(bank, &request, &ctx, &mut rng);

    // 写出导出数据
    let payload_path = output_dir.join(format!("{}.json", outcome.record.id));
    write_payload(&payload_path, &outcome)
        .await
        .with_context(|| format!("{} 导出数据写入失败", ctx))?;
    info!("{} 💾 导出数据已写入: {}", ctx, payload_path.display());

    // 保存试卷记录
    store
        .save(outcome.record.clone())
        .await
        .with_context(|| format!("{} 试卷记录保存失败", ctx))?;

    // 渲染（失败不影响试卷本身）
    if let Some(renderer) = renderer {
        let file_path = output_dir.join(format!(
            "{}.{}",
            outcome.record.id,
            renderer.format().extension()
        ));
        match render_to_file(renderer, &outcome, &file_path).await {
            Ok(()) => info!("{} ✓ 渲染文件已保存: {}", ctx, file_path.display()),
            Err(e) => error!("{} 渲染失败: {}", ctx, e),
        }
    }

    log_paper_complete(&ctx, &outcome);

    Ok(true)
}

/// 年级和科目必须给出
fn validate_request(request: &PaperRequest) -> Result<(), AppError> {
    let path = request.file_path.clone().unwrap_or_default();
    if request.class_id.trim().is_empty() {
        return Err(ConfigError::InvalidRequest {
            path,
            reason: "classId 不能为空".to_string(),
        }
        .into());
    }
    if request.subject_id.trim().is_empty() {
        return Err(ConfigError::InvalidRequest {
            path,
            reason: "subjectId 不能为空".to_string(),
        }
        .into());
    }
    Ok(())
}

async fn write_payload(path: &Path, outcome: &PaperOutcome) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&outcome.payload).map_err(ExportError::from)?;
    write_file(path, json.as_bytes()).await
}

async fn render_to_file(renderer: &RendererClient, outcome: &PaperOutcome, path: &Path) -> Result<(), AppError> {
    let bytes = renderer.render(&outcome.payload).await?;
    write_file(path, &bytes).await
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let to_error = |e: std::io::Error| -> AppError {
        ExportError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        }
        .into()
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(to_error)
}

// ========== 日志辅助函数 ==========

fn log_paper_start(ctx: &PaperCtx, request: &PaperRequest) {
    info!("{} 开始处理", ctx);
    info!("{} 标题: {}", ctx, request.settings.title);
    info!("{} 章节数: {}", ctx, request.chapter_ids.len());
    if let Some(template) = &request.template {
        info!("{} 模板: {} ({} 道题)", ctx, template.name, template.question_count());
    }
}

fn log_paper_complete(ctx: &PaperCtx, outcome: &PaperOutcome) {
    let counts = outcome.selection.counts();
    info!(
        "{} 题目统计: 选择题 {}, 简答题 {}, 论述题 {}, 总分 {}",
        ctx, counts.mcq, counts.short, counts.long, outcome.totals.total_marks
    );
    if outcome.is_complete() {
        info!("\n{} ✅ 试卷处理完成\n", ctx);
    } else {
        info!(
            "\n{} ✅ 试卷处理完成（{} 个题型数量不足）\n",
            ctx,
            outcome.shortfalls.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "paper_processor_{}_{}_{}",
            name,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[tokio::test]
    async fn test_rejects_missing_subject() {
        let dir = temp_dir("invalid");
        let config = Config {
            output_folder: dir.display().to_string(),
            ..Default::default()
        };
        let bank = QuestionBank::in_memory();
        let store = PaperStore::new(dir.join("papers.json"), 10);
        let request = PaperRequest {
            class_id: "9th".into(),
            ..Default::default()
        };
        let err = process_paper(&bank, &store, None, request, 1, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("subjectId"));
    }

    #[tokio::test]
    async fn test_writes_payload_and_record() {
        let dir = temp_dir("ok");
        tokio::fs::create_dir_all(dir.join("bank/9th")).await.unwrap();
        tokio::fs::write(
            dir.join("bank/9th/physics.json"),
            r#"{"chapters": [{"id": "9_phy_ch1", "number": 1, "name": "Units",
                "mcqs": [{"id": "9_phy_ch1_m1", "questionText": "Unit of mass?"}]}]}"#,
        )
        .await
        .unwrap();

        let config = Config {
            bank_folder: dir.join("bank").display().to_string(),
            output_folder: dir.join("out").display().to_string(),
            random_seed: Some(1),
            ..Default::default()
        };
        let bank = QuestionBank::from_dir(&config.bank_folder);
        let store = PaperStore::new(dir.join("out/papers.json"), 10);
        let request = PaperRequest {
            class_id: "9th".into(),
            subject_id: "physics".into(),
            chapter_ids: vec!["9_phy_ch1".into()],
            targets: Some(crate::models::paper::QuestionCounts::new(3, 0, 0)),
            ..Default::default()
        };

        assert!(process_paper(&bank, &store, None, request, 1, &config).await.unwrap());

        let papers = store.list().await.unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].mcq_ids, vec!["9_phy_ch1_m1"]);
        let payload_path = dir.join("out").join(format!("{}.json", papers[0].id));
        let payload: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(payload_path).await.unwrap()).unwrap();
        assert_eq!(payload["mcqs"][0]["chapterName"], "Units");
        assert!(dir.join("out/shortfall.txt").exists());
    }
}
