pub mod assembler;
pub mod curator;
pub mod engine;
pub mod gateway;
pub mod generation;
pub mod prompt;
pub mod ranking;

pub use crate::domain::model::{Course, CourseOutline, CourseRequest, CourseSummary};
pub use crate::domain::ports::{Storage, TextGenerator};
pub use crate::utils::error::Result;
