pub mod chapter;
pub mod loaders;
pub mod paper;
pub mod question;
pub mod request;
pub mod template;

pub use chapter::{Chapter, ChapterData, RawQuestion, SubjectData};
pub use loaders::{load_all_requests, load_paper_request, load_subject};
pub use paper::{
    CustomMarks, EditedQuestions, ExportPayload, PaperRecord, PaperSettings, QuestionCounts,
    QuestionOrder, QuestionOverride, SectionInstruction, Selection,
};
pub use question::{Difficulty, DifficultyFilter, McqChoice, Question, QuestionType};
pub use request::{ChapterHalf, CompositionRequest, PaperRequest};
pub use template::{SectionKind, Template, TemplateCategory, TemplateSection};
