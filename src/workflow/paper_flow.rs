//! 组卷流程 - 流程层
//!
//! 核心职责：定义"一份试卷"的完整处理流程
//!
//! 流程顺序：
//! 1. 确定章节范围，可用数量检查
//! 2. 去掉失效的已选题目，在此基础上补足到目标数量
//! 3. 记录缺题
//! 4. 计算分值与总分
//! 5. 构建导出数据和试卷记录

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::{QuestionSource, RandomSource};
use crate::models::paper::{CustomMarks, ExportPayload, PaperRecord, PaperSettings, QuestionCounts, Selection};
use crate::models::question::QuestionType;
use crate::models::request::PaperRequest;
use crate::services::{
    build_paper_record, compute_totals, generate_paper_id, section_instructions, validate_marks,
    CompositionEngine,
    ExportBuilder, MarksBreakdown, MarksValidation, PaperTotals, PoolAccessor, ShortfallWriter,
};
use crate::utils::logging::truncate_text;
use crate::workflow::paper_ctx::PaperCtx;

/// 某题型的缺题信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub kind: QuestionType,
    pub requested: usize,
    pub actual: usize,
}

/// 一份试卷的处理结果
#[derive(Debug, Clone)]
pub struct PaperOutcome {
    pub selection: Selection,
    pub marks: CustomMarks,
    pub totals: PaperTotals,
    pub breakdown: MarksBreakdown,
    /// 请求中给出页眉总分时的校验结果
    pub validation: Option<MarksValidation>,
    pub shortfalls: Vec<Shortfall>,
    pub payload: ExportPayload,
    pub record: PaperRecord,
}

impl PaperOutcome {
    /// 每种题型都达到目标数量
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// 组卷流程
///
/// - 编排完整的组卷流程
/// - 决定何时补题、何时记录缺题
/// - 不持有题库，只借用
/// - 只依赖业务能力（services）
pub struct PaperFlow {
    shortfall_writer: Option<ShortfallWriter>,
    verbose_logging: bool,
}

impl PaperFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            shortfall_writer: Some(ShortfallWriter::with_path(format!(
                "{}/shortfall.txt",
                config.output_folder
            ))),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 不写缺题文件的流程（只记录日志）
    pub fn without_shortfall_file(config: &Config) -> Self {
        Self {
            shortfall_writer: None,
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn run<R: RandomSource>(
        &self,
        source: &dyn QuestionSource,
        request: &PaperRequest,
        ctx: &PaperCtx,
        rng: &mut R,
    ) -> PaperOutcome {
        let accessor = PoolAccessor::new(source);
        let engine = CompositionEngine::new(PoolAccessor::new(source));
        let builder = ExportBuilder::new(PoolAccessor::new(source));

        // ========== 1. 章节范围与可用数量 ==========
        let all_chapter_ids: Vec<String> = accessor
            .chapters(&request.class_id, &request.subject_id)
            .into_iter()
            .map(|chapter| chapter.id)
            .collect();
        let composition = request.composition_within(&all_chapter_ids);
        if request.chapter_ids.is_empty() && !composition.chapter_ids.is_empty() {
            info!(
                "{} 📖 按模板选用 {}/{} 个章节",
                ctx,
                composition.chapter_ids.len(),
                all_chapter_ids.len()
            );
        }

        let availability = engine.check_availability(&composition);
        info!(
            "{} 🎯 目标: 选择题 {} / 简答题 {} / 论述题 {} (难度: {})",
            ctx,
            composition.targets.mcq,
            composition.targets.short,
            composition.targets.long,
            composition.difficulty
        );
        if !availability.sufficient() {
            let pool = accessor.available_counts(&request.class_id, &request.subject_id, &composition.chapter_ids);
            debug!(
                "{} 可用数量: 选择题 {}/{} / 简答题 {}/{} / 论述题 {}/{} (筛选后/章节内)",
                ctx,
                availability.available.mcq,
                pool.mcq,
                availability.available.short,
                pool.short,
                availability.available.long,
                pool.long
            );
        }

        // ========== 2. 组卷 / 补题 ==========
        let existing = builder.retain_resolvable(
            &request.class_id,
            &request.subject_id,
            &request.selection,
            &request.edited_questions,
        );
        if !existing.is_empty() {
            info!(
                "{} 🔁 在已有 {} 道题的基础上补题",
                ctx,
                existing.counts().total()
            );
        }
        let selection = engine.fill_to_target(&composition, &existing, rng);

        // ========== 3. 缺题记录 ==========
        let shortfalls = self.record_shortfalls(ctx, &composition.targets, &selection);

        // ========== 4. 分值与总分 ==========
        let marks = match &request.template {
            Some(template) => template.marks(&request.settings.custom_marks),
            None => request.settings.custom_marks,
        };
        let totals = compute_totals(&selection, &marks);
        let attempts = request
            .template
            .as_ref()
            .map(|t| t.attempt_counts())
            .unwrap_or_default();
        let breakdown = MarksBreakdown::calculate(selection.counts(), attempts, &marks);
        info!("{} 📝 {}", ctx, breakdown.display());

        let header_total = request
            .settings
            .total_marks
            .or_else(|| request.template.as_ref().map(|t| t.total_marks).filter(|t| *t > 0.0));
        let validation = header_total.map(|header| validate_marks(header, selection.counts(), &marks));
        if let Some(error) = validation.as_ref().and_then(|v| v.error.as_ref()) {
            warn!("{} ⚠️ {}", ctx, error);
        }

        // ========== 5. 导出数据与记录 ==========
        let settings = self.resolve_settings(request, marks, header_total.unwrap_or(totals.total_marks));
        let mut payload = builder.build_payload(
            &request.class_id,
            &request.subject_id,
            &selection,
            &request.edited_questions,
            &request.question_order,
            settings,
        );
        payload.section_instructions = section_instructions(&breakdown);
        let record = build_paper_record(
            generate_paper_id(),
            &selection,
            &payload.settings,
            &request.edited_questions,
            &request.question_order,
            totals,
        );

        if self.verbose_logging {
            self.log_questions(ctx, &payload);
        }

        PaperOutcome {
            selection,
            marks,
            totals,
            breakdown,
            validation,
            shortfalls,
            payload,
            record,
        }
    }

    /// 比较目标数量与实际数量，不足时记录警告
    fn record_shortfalls(&self, ctx: &PaperCtx, targets: &QuestionCounts, selection: &Selection) -> Vec<Shortfall> {
        let mut shortfalls = Vec::new();
        for kind in QuestionType::ALL {
            let requested = targets.get(kind);
            let actual = selection.ids(kind).len();
            if actual >= requested {
                continue;
            }
            warn!(
                "{} ⚠️ {} 题型数量不足: 需要 {} 道，题库中只有 {} 道",
                ctx, kind, requested, actual
            );
            if let Some(writer) = &self.shortfall_writer {
                if let Err(e) = writer.write(&ctx.paper_name, kind, requested, actual) {
                    warn!("{} 写入缺题记录失败: {}", ctx, e);
                }
            }
            shortfalls.push(Shortfall {
                kind,
                requested,
                actual,
            });
        }
        shortfalls
    }

    fn log_questions(&self, ctx: &PaperCtx, payload: &ExportPayload) {
        for kind in QuestionType::ALL {
            for (i, question) in payload.questions(kind).iter().enumerate() {
                debug!(
                    "{} {} #{} [{}] {}",
                    ctx,
                    kind,
                    i + 1,
                    question.id,
                    truncate_text(&question.question_text, 40)
                );
            }
        }
    }

    /// 补全导出用的设置：年级科目、分值、页眉总分
    fn resolve_settings(&self, request: &PaperRequest, marks: CustomMarks, header_total: f64) -> PaperSettings {
        let mut settings = request.settings.clone();
        if settings.class_id.is_empty() {
            settings.class_id = request.class_id.clone();
        }
        if settings.subject.is_empty() {
            settings.subject = request.subject_id.clone();
        }
        if let Some(template) = &request.template {
            if !template.time_allowed.is_empty() {
                settings.time_allowed = template.time_allowed.clone();
            }
        }
        settings.custom_marks = marks;
        settings.total_marks = Some(header_total);
        settings
    }
}
