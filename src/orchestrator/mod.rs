//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载组卷请求（Vec<PaperRequest>）
//! - 控制并发数量（Semaphore）
//! - 持有题库、试卷存储和渲染客户端
//! - 输出全局统计信息
//!
//! ### `paper_processor` - 单个试卷处理器
//! - 校验请求、按需加载题库
//! - 创建 PaperFlow 完成组卷
//! - 写出导出数据、保存试卷记录
//! - 可选地调用渲染服务
//! - 输出单个试卷的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PaperRequest>)
//!     ↓
//! paper_processor (处理单个 PaperRequest)
//!     ↓
//! workflow::PaperFlow (组卷 → 缺题 → 分值 → 导出)
//!     ↓
//! services (能力层：pool / sampler / composer / merge / totals / store)
//!     ↓
//! infrastructure (基础设施：QuestionBank、RandomSource)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，paper_processor 管单个
//! 2. **资源隔离**：只有编排层持有题库、存储和 HTTP 客户端
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use paper_processor::process_paper;
