use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A wrapper operation was called before a successful `connect`
    #[error("Not connected to the database; call connect() first")]
    NotConnected,

    #[error(
        "Invalid schema input: expected a mapping of table names to column lists, got {found}"
    )]
    InvalidSchemaInput { found: String },

    #[error("Invalid tool parameters: {0}")]
    InvalidParams(String),

    #[error("Tool '{tool}' execution failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use warehouse_core::Error;
    /// let err = Error::config_error("Invalid format type");
    /// ```
    pub fn config_error(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Helper for creating general errors with a message
    ///
    /// # Example
    /// ```
    /// use warehouse_core::Error;
    /// let err = Error::message("Something went wrong");
    /// ```
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Other(anyhow::anyhow!("{}", msg.into()))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Error::InvalidParams(msg.into())
    }

    pub fn invalid_schema_input(found: impl Into<String>) -> Self {
        Error::InvalidSchemaInput {
            found: found.into(),
        }
    }
}
