use thiserror::Error;

/// 內容生成階段的錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation API throttled the request ({attempts} attempt(s)): {message}")]
    Throttled { attempts: u32, message: String },

    #[error("Generation API returned a malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Generation API unavailable: {message}")]
    UpstreamUnavailable { message: String, transient: bool },
}

impl GenerationError {
    /// 限流與暫時性故障才值得重試
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Throttled { .. } => true,
            GenerationError::UpstreamUnavailable { transient, .. } => *transient,
            GenerationError::MalformedResponse { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CourseError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Content generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Storage {operation} failed for '{key}': {message}")]
    StorageError {
        operation: String,
        key: String,
        message: String,
    },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Already exists: {resource}")]
    AlreadyExists { resource: String },

    #[error("Stored content could not be parsed: {message}")]
    ParseError { message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Generation,
    Network,
    Storage,
    Data,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Generation => "generation",
            ErrorCategory::Network => "network",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Data => "data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CourseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CourseError::ConfigError { .. }
            | CourseError::MissingConfigError { .. }
            | CourseError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CourseError::ValidationError { .. } => ErrorCategory::Validation,
            CourseError::Generation(_) => ErrorCategory::Generation,
            CourseError::ApiError(_) | CourseError::Timeout { .. } => ErrorCategory::Network,
            CourseError::IoError(_)
            | CourseError::StorageError { .. }
            | CourseError::NotFound { .. }
            | CourseError::AlreadyExists { .. } => ErrorCategory::Storage,
            CourseError::SerializationError(_) | CourseError::ParseError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CourseError::ValidationError { .. }
            | CourseError::NotFound { .. }
            | CourseError::AlreadyExists { .. } => ErrorSeverity::Low,
            CourseError::Generation(GenerationError::Throttled { .. })
            | CourseError::Generation(GenerationError::UpstreamUnavailable { .. })
            | CourseError::ApiError(_)
            | CourseError::Timeout { .. } => ErrorSeverity::Medium,
            CourseError::Generation(GenerationError::MalformedResponse { .. })
            | CourseError::StorageError { .. }
            | CourseError::ParseError { .. }
            | CourseError::SerializationError(_)
            | CourseError::IoError(_) => ErrorSeverity::High,
            CourseError::ConfigError { .. }
            | CourseError::MissingConfigError { .. }
            | CourseError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CourseError::ConfigError { .. } | CourseError::InvalidConfigValueError { .. } => {
                "Check the configuration file and environment variables"
            }
            CourseError::MissingConfigError { .. } => {
                "Set the missing value in the config file or the environment (.env)"
            }
            CourseError::ValidationError { .. } => "Fix the request fields and send it again",
            CourseError::Generation(GenerationError::Throttled { .. }) => {
                "The model is rate limited; wait a moment and retry"
            }
            CourseError::Generation(GenerationError::MalformedResponse { .. }) => {
                "Retry the request; try a more specific topic or description"
            }
            CourseError::Generation(GenerationError::UpstreamUnavailable { .. }) => {
                "Check AWS credentials, region and model access, then retry"
            }
            CourseError::ApiError(_) | CourseError::Timeout { .. } => {
                "Check network connectivity and retry"
            }
            CourseError::StorageError { .. } | CourseError::IoError(_) => {
                "Check bucket permissions and retry the upload"
            }
            CourseError::NotFound { .. } => "List stored courses to find a valid course id",
            CourseError::AlreadyExists { .. } => {
                "Courses are immutable; generate a new course instead"
            }
            CourseError::ParseError { .. } | CourseError::SerializationError(_) => {
                "The stored object is corrupt; regenerate and upload the course"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CourseError::ValidationError { field, message } => {
                format!("Invalid request field '{}': {}", field, message)
            }
            CourseError::NotFound { resource } => format!("Course '{}' was not found", resource),
            CourseError::AlreadyExists { resource } => {
                format!("Course '{}' has already been stored", resource)
            }
            CourseError::Generation(GenerationError::Throttled { .. }) => {
                "The course generator is busy right now, please try again shortly".to_string()
            }
            CourseError::Generation(GenerationError::MalformedResponse { .. }) => {
                "The course generator returned an unusable answer".to_string()
            }
            CourseError::Generation(GenerationError::UpstreamUnavailable { .. }) => {
                "The course generator is unavailable".to_string()
            }
            CourseError::Timeout { seconds } => {
                format!("Course generation did not finish within {}s", seconds)
            }
            CourseError::StorageError { operation, .. } => {
                format!("Could not {} the course in storage", operation)
            }
            CourseError::ParseError { .. } => "The stored course could not be read".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CourseError>;
