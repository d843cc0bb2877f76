//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量组卷请求的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建日志文件、题库、试卷存储、渲染客户端
//! 2. **批量加载**：扫描并加载所有待处理的请求（`Vec<PaperRequest>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将请求分批次处理，每批完成后再开始下一批
//! 5. **资源管理**：持有题库和存储，通过 Arc 共享给各任务
//! 6. **全局统计**：汇总所有试卷的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个试卷的细节
//! - **并发安全**：通过 Semaphore 和 tokio::spawn 实现并发
//! - **向下委托**：委托 paper_processor 处理单个试卷

use crate::clients::RendererClient;
use crate::config::Config;
use crate::infrastructure::QuestionBank;
use crate::models::request::PaperRequest;
use crate::orchestrator::paper_processor;
use crate::services::PaperStore;
use crate::utils::logging;
use anyhow::Result;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    bank: Arc<QuestionBank>,
    store: Arc<PaperStore>,
    renderer: Option<Arc<RendererClient>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        let bank = Arc::new(QuestionBank::from_dir(&config.bank_folder));
        let store = Arc::new(PaperStore::new(
            PathBuf::from(&config.output_folder).join("papers.json"),
            config.max_saved_papers,
        ));
        let renderer = RendererClient::from_config(&config)?.map(Arc::new);
        if renderer.is_none() {
            info!("💡 未配置 RENDERER_URL，只输出导出数据 JSON");
        }

        Ok(Self {
            config,
            bank,
            store,
            renderer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的请求
        let all_requests = self.load_requests().await?;

        if all_requests.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(());
        }

        let total = all_requests.len();
        logging::log_papers_loaded(total, self.config.max_concurrent_papers);

        // 处理所有请求
        let stats = self.process_all_papers(all_requests).await?;

        // 输出最终统计
        logging::print_final_stats(stats.success, stats.failed, stats.total, &self.config.output_log_file);

        Ok(())
    }

    /// 加载请求
    async fn load_requests(&self) -> Result<Vec<PaperRequest>> {
        info!("\n📁 正在扫描待处理的组卷请求...");
        crate::models::load_all_requests(&self.config.request_folder).await
    }

    /// 处理所有请求
    async fn process_all_papers(&self, all_requests: Vec<PaperRequest>) -> Result<ProcessingStats> {
        let max_concurrent = self.config.max_concurrent_papers.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total = all_requests.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        let total_batches = total.div_ceil(max_concurrent);

        // 分批处理
        for (batch_idx, batch) in all_requests.chunks(max_concurrent).enumerate() {
            let batch_start = batch_idx * max_concurrent;
            let batch_num = batch_idx + 1;

            logging::log_batch_start(batch_num, total_batches, batch_start + 1, batch_start + batch.len(), total);

            let batch_result = self.process_batch(batch, batch_start, semaphore.clone()).await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            logging::log_batch_complete(batch_num, batch_result.success, batch_result.success + batch_result.failed);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[PaperRequest],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        // 为本批创建并发任务
        for (idx, request) in batch.iter().enumerate() {
            let paper_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let bank = self.bank.clone();
            let store = self.store.clone();
            let renderer = self.renderer.clone();
            let request = request.clone();
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = paper_processor::process_paper(
                    &bank,
                    &store,
                    renderer.as_deref(),
                    request,
                    paper_index,
                    &config,
                )
                .await;
                if let Err(e) = &result {
                    error!("[试卷 {}] ❌ 处理过程中发生错误: {:#}", paper_index, e);
                }
                result
            });
            handles.push((paper_index, handle));
        }

        // 等待本批所有任务完成
        let (indices, handles): (Vec<usize>, Vec<_>) = handles.into_iter().unzip();
        let mut result = BatchResult::default();

        for (paper_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(true)) => result.success += 1,
                Ok(Ok(false)) | Ok(Err(_)) => result.failed += 1,
                Err(e) => {
                    error!("[试卷 {}] 任务执行失败: {}", paper_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "batch_processor_{}_{}_{}",
            name,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[tokio::test]
    async fn test_run_processes_folder() {
        let dir = temp_dir("run");
        tokio::fs::create_dir_all(dir.join("bank/10th")).await.unwrap();
        tokio::fs::create_dir_all(dir.join("requests")).await.unwrap();
        tokio::fs::write(
            dir.join("bank/10th/chemistry.toml"),
            r#"
[[chapters]]
id = "10_chem_ch1"
number = 1
name = "Equilibrium"

[[chapters.mcqs]]
id = "10_chem_ch1_m1"
questionText = "Le Chatelier's principle applies to?"
difficulty = "easy"

[[chapters.mcqs]]
id = "10_chem_ch1_m2"
questionText = "Kc depends on?"
difficulty = "hard"
"#,
        )
        .await
        .unwrap();
        for name in ["a", "b", "c"] {
            tokio::fs::write(
                dir.join(format!("requests/{}.toml", name)),
                r#"
classId = "10th"
subjectId = "chemistry"
chapterIds = ["10_chem_ch1"]

[targets]
mcq = 2
"#,
            )
            .await
            .unwrap();
        }
        tokio::fs::write(dir.join("requests/broken.toml"), "classId = [").await.unwrap();

        let config = Config {
            bank_folder: dir.join("bank").display().to_string(),
            request_folder: dir.join("requests").display().to_string(),
            output_folder: dir.join("out").display().to_string(),
            output_log_file: dir.join("output.txt").display().to_string(),
            max_concurrent_papers: 2,
            random_seed: Some(7),
            ..Default::default()
        };
        let app = App::initialize(config).await.unwrap();
        app.run().await.unwrap();

        let papers = app.store.list().await.unwrap();
        assert_eq!(papers.len(), 3);
        assert!(papers.iter().all(|p| p.mcq_count == 2));
    }

    #[tokio::test]
    async fn test_missing_request_folder_is_error() {
        let dir = temp_dir("missing");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let config = Config {
            request_folder: dir.join("nope").display().to_string(),
            output_folder: dir.join("out").display().to_string(),
            output_log_file: dir.join("output.txt").display().to_string(),
            ..Default::default()
        };
        let app = App::initialize(config).await.unwrap();
        assert!(app.run().await.is_err());
    }
}
