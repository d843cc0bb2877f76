pub mod question_bank;
pub mod random;

pub use question_bank::{QuestionBank, QuestionSource};
pub use random::{FixedSequence, RandomSource, StdRandom};
