use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Tool timed out after {0}s")]
    Timeout(u64),
}

impl ToolError {
    pub fn missing_field(field: &str) -> Self {
        ToolError::InvalidInput(format!("missing '{}' parameter", field))
    }
}

impl From<SearchError> for ToolError {
    fn from(err: SearchError) -> Self {
        ToolError::Upstream(err.to_string())
    }
}

/// Read a required non-empty string field from tool input.
pub(crate) fn required_str<'a>(input: &'a serde_json::Value, field: &str) -> Result<&'a str, ToolError> {
    let value = input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::missing_field(field))?;
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!("'{}' must not be empty", field)));
    }
    Ok(value)
}

/// Failure talking to the search provider or fetching a result page
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
