use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unexpected Input: bad request (mode must be 'saved' or 'liked', got '{mode}')")]
    InvalidMode { mode: String },

    #[error("Export file not found: {path}")]
    FileNotFound { path: String },

    #[error("Export file is not valid JSON ({path}): {details}")]
    InvalidJson { path: String, details: String },

    #[error("Export is missing the '{key}' section")]
    MissingSection { key: String },

    #[error("Malformed export record at index {index}: {details}")]
    MalformedRecord { index: usize, details: String },

    #[error("sample_num must be between {min} and {max}, got {requested}")]
    SampleOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("Cannot sample {requested} posts, only {available} available")]
    SampleTooLarge { requested: usize, available: usize },
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: String },

    #[error("API key invalid or missing for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Rate limit exceeded for {provider}. Retry after {retry_after} seconds")]
    RateLimitExceeded { provider: String, retry_after: u64 },

    #[error("Model not available: {model}")]
    ModelNotAvailable { model: String },

    #[error("Provider service unavailable: {provider} (status {status_code})")]
    ServiceUnavailable { provider: String, status_code: u16 },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Insufficient credits for {provider}")]
    InsufficientCredits { provider: String },

    #[error("Invalid response format from {provider}: {details}")]
    InvalidResponseFormat { provider: String, details: String },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file provided")]
    MissingFile,

    #[error("Only JSON files are allowed (got '{filename}')")]
    NotJson { filename: String },

    #[error("Uploaded file is not valid JSON: {details}")]
    InvalidJson { details: String },

    #[error("File exceeds the maximum upload size of {max} bytes")]
    TooLarge { max: u64 },

    #[error("Upload not found: {id}")]
    NotFound { id: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
