use thiserror::Error;

/// All errors that can occur while editing or reading credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    // --- Crypto errors ---
    #[error("invalid master key: {0}")]
    KeyFormat(String),

    #[error("secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("ciphertext too short")]
    CiphertextTooShort,

    // --- Storage errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{context}: {source}")]
    FileIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // --- Edit workflow errors ---
    #[error("{0} is missing. Editing is not allowed")]
    MissingKey(String),

    #[error("failed to open editor: {0}")]
    Editor(String),

    // --- Reader errors ---
    #[error("failed to read master key: {0}")]
    KeyRead(#[source] Box<CredentialsError>),

    #[error("failed to decrypt credentials: {0}")]
    Decrypt(#[source] Box<CredentialsError>),

    #[error("failed to read decrypted config: {0}")]
    Parse(String),

    #[error("failed to unmarshal configuration: {0}")]
    Unmarshal(String),

    // --- Config / CLI errors ---
    #[error("Config file error: {0}")]
    Config(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl CredentialsError {
    /// Attach a description of the failed operation to an IO error.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIo {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for credentials results.
pub type Result<T> = std::result::Result<T, CredentialsError>;
