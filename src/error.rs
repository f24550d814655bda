use thiserror::Error;

#[derive(Error, Debug)]
pub enum UstaadError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown strategy version: {0}")]
    UnknownStrategy(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Output parse error: {0}")]
    OutputParse(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UstaadError>;

impl UstaadError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            UstaadError::Validation(_) => 400,
            UstaadError::UnknownStrategy(_) => 400,
            _ => 500,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            UstaadError::Validation(_) => "validation_error",
            UstaadError::UnknownStrategy(_) => "unknown_strategy",
            UstaadError::UnknownTool(_) => "unknown_tool",
            UstaadError::OutputParse(_) => "output_parse_error",
            UstaadError::Provider(_) => "provider_error",
            UstaadError::Config(_) => "config_error",
            UstaadError::Io(_) => "io_error",
            UstaadError::Json(_) => "json_error",
        }
    }
}
