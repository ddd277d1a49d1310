pub mod category;
pub mod item;
pub mod pools;
pub mod question;

pub use category::Category;
pub use item::{Item, PassageGroup, PassageSource, Question, QuestionKind, QuestionRef};
pub use pools::{PhotoPassage, Pools, TextPassage};
pub use question::{AnswerKey, QuestionData, RawQuestion};
