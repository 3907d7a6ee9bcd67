pub mod adapters;
#[cfg(feature = "server")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, StorageBackend};
#[cfg(feature = "aws")]
pub use adapters::{BedrockGenerator, S3Storage};

#[cfg(feature = "server")]
pub use config::cli::CliArgs;
pub use config::ServiceConfig;

pub use crate::core::{
    assembler::CourseAssembler, curator::VideoCurator, engine::CourseEngine,
    gateway::CourseGateway, generation::ContentGenerator,
};
pub use domain::model::{Course, CourseRequest, CourseSummary, StoredCourse};
pub use utils::error::{CourseError, Result};
