//! # Paper Composer
//!
//! 一个按章节、题型和难度从题库中随机组卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有题库和随机源，只暴露能力
//! - `QuestionBank` - 年级/科目题库，按需加载
//! - `RandomSource` - 可注入的随机数源，便于复现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PoolAccessor` - 按章节和题型取题
//! - `Sampler` / `CompositionEngine` - 无重复抽样、组卷与补题
//! - `resolve_question` - 合并编辑覆盖和自定义题目
//! - `compute_totals` / `MarksBreakdown` - 题量和总分
//! - `ExportBuilder` / `PaperStore` - 导出数据和试卷记录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份试卷"的完整处理流程
//! - `PaperCtx` - 上下文封装（paper_index + 名称 + 年级科目）
//! - `PaperFlow` - 流程编排（可用性 → 组卷 → 缺题 → 分值 → 导出）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量试卷处理器，管理资源和并发
//! - `orchestrator/paper_processor` - 单个试卷处理器，输出文件和记录
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{RenderFormat, RendererClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{QuestionBank, QuestionSource, RandomSource, StdRandom};
pub use models::{
    CompositionRequest, CustomMarks, DifficultyFilter, PaperRequest, Question, QuestionCounts,
    QuestionType, Selection,
};
pub use orchestrator::{process_paper, App};
pub use services::{CompositionEngine, PaperStore, PoolAccessor};
pub use workflow::{PaperCtx, PaperFlow, PaperOutcome};
