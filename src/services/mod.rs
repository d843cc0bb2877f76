pub mod composer;
pub mod difficulty_filter;
pub mod export_builder;
pub mod paper_store;
pub mod pool_accessor;
pub mod question_merge;
pub mod sampler;
pub mod shortfall_writer;
pub mod totals;

pub use composer::{Availability, CompositionEngine};
pub use difficulty_filter::filter_by_difficulty;
pub use export_builder::{apply_question_order, build_paper_record, generate_paper_id, ExportBuilder};
pub use paper_store::PaperStore;
pub use pool_accessor::{chapter_id_of, PoolAccessor};
pub use question_merge::resolve_question;
pub use sampler::Sampler;
pub use shortfall_writer::ShortfallWriter;
pub use totals::{
    attempt_instruction, compute_totals, section_instructions, validate_marks, MarksBreakdown,
    MarksValidation, PaperTotals,
};
