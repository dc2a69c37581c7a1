//! Error types for the conversational core.

/// Reasons the sanitizer rejects raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("message cannot be empty")]
    Empty,
    #[error("message exceeds maximum length of {max} characters")]
    TooLong { max: usize },
    #[error("message contains disallowed content: {0}")]
    DisallowedContent(String),
}

/// Errors from the chat engine.
///
/// Unresolvable queries are not errors; they surface as clarifications.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl ChatError {
    /// Text suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::InvalidInput(InvalidInputError::Empty) => {
                "Please type a question about the companies in the dataset.".to_string()
            }
            ChatError::InvalidInput(InvalidInputError::TooLong { max }) => {
                format!("That message is too long. Please keep it under {} characters.", max)
            }
            ChatError::InvalidInput(InvalidInputError::DisallowedContent(_)) => {
                "That message contains characters I can't process. Please rephrase it.".to_string()
            }
        }
    }
}
