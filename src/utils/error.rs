use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Invalid search parameters: {message}")]
    InvalidParameters { message: String },

    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Yelp API error {code}: {description}")]
    RemoteApiError { code: String, description: String },

    #[error("Malformed API response: {message}")]
    MalformedResponse { message: String },

    #[error("Unexpected record shape at business #{index}: {message}")]
    SchemaError { index: usize, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    RemoteApi,
    Data,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InvalidParameters { .. } => ErrorCategory::Input,
            EtlError::TransportError(_) => ErrorCategory::Network,
            EtlError::RemoteApiError { .. } => ErrorCategory::RemoteApi,
            EtlError::MalformedResponse { .. } | EtlError::SchemaError { .. } => {
                ErrorCategory::Data
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Output,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Medium errors may succeed on a rerun; Critical ones concern the output file.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::TransportError(_) | EtlError::RemoteApiError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::InvalidParameters { message } => {
                format!("The search could not be sent: {}", message)
            }
            EtlError::TransportError(e) if e.is_timeout() => {
                "The Yelp API did not answer in time".to_string()
            }
            EtlError::TransportError(e) => match e.status() {
                Some(status) => format!("The Yelp API rejected the request (HTTP {})", status),
                None => "Could not reach the Yelp API".to_string(),
            },
            EtlError::RemoteApiError { code, description } => {
                format!("Yelp reported an error ({}): {}", code, description)
            }
            EtlError::MalformedResponse { .. } => {
                "The Yelp API returned something that is not JSON".to_string()
            }
            EtlError::SchemaError { index, message } => {
                format!("Business #{} in the response is incomplete: {}", index, message)
            }
            EtlError::CsvError(e) => format!("Could not write the CSV output: {}", e),
            EtlError::IoError(e) => format!("File system error: {}", e),
            EtlError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            EtlError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for '{}': {}", value, field, reason),
            EtlError::MissingConfigError { field } => {
                format!("'{}' must be set", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::InvalidParameters { .. } => {
                "Provide a location (e.g. NYC) or both latitude and longitude"
            }
            EtlError::TransportError(e) if e.status().map_or(false, |s| s.as_u16() == 401) => {
                "Check that API_KEY holds a valid Yelp Fusion key"
            }
            EtlError::TransportError(_) => "Check your network connection and try again",
            EtlError::RemoteApiError { .. } => {
                "Review the search parameters against the Yelp business search documentation"
            }
            EtlError::MalformedResponse { .. } | EtlError::SchemaError { .. } => {
                "Retry later; if it persists the API response format may have changed"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output path is writable and not open in another program"
            }
            EtlError::MissingConfigError { .. } => {
                "Set API_KEY in the environment or in a .env file"
            }
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the reported value and run again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
