pub mod question;

pub use question::{PublicQuestion, QuestionRecord, RawQuestionState, ScriptReply};
