#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod shuffle;
pub mod time;

pub use error::Error;
pub use generator::{GenerateError, MAX_QUESTIONS, QuestionGenerator};
pub use time::Clock;
