//! Record model for the question-listing endpoint
//!
//! - `Question`: one fetched question, immutable once decoded
//! - `QuestionsPage`: one response envelope with quota and continuation data
//! - `Quota`: the request allowance reported alongside every page

mod page;
mod question;

pub use page::{QuestionsPage, Quota};
pub use question::Question;
