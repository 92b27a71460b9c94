use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    /// The request never completed: connect failure, timeout, or a 5xx.
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the payload.
    #[error("rejected by backend ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    /// A local precondition failed before any request was made.
    #[error("{0}")]
    UserInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid prompt type '{0}': expected generation, critique, or planner")]
    InvalidPromptType(String),

    #[error("invalid selection context '{0}'")]
    InvalidContext(String),

    #[error("invalid tab '{0}': expected generate, critique, or planner")]
    InvalidTab(String),

    #[error("invalid refine mode '{0}': expected prompt or supplement")]
    InvalidRefineMode(String),

    #[error("home directory not found: set HOME or DRAFTDESK_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeskError {
    pub fn user_input(msg: impl Into<String>) -> Self {
        DeskError::UserInput(msg.into())
    }

    /// Short message suitable for showing next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Network(_) => "Could not reach the backend.".to_string(),
            DeskError::Validation { message, .. } => format!("Request rejected: {message}"),
            DeskError::Decode(_) => "The backend sent an unreadable response.".to_string(),
            DeskError::UserInput(msg) => msg.clone(),
            DeskError::NotFound(what) => format!("{what} not found."),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
