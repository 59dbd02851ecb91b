use thiserror::Error;

/// Fatal compile errors. There is no recovery: the first one aborts the run.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A descriptor source is not well-formed JSON or does not have the
    /// descriptor shape.
    #[error("malformed descriptor source `{source_name}`: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// A canonical-table line matches no declaration shape.
    #[error("{source_name}:{line}: unrecognized declaration `{text}` ({message})")]
    Declaration {
        source_name: String,
        line: usize,
        text: String,
        message: String,
    },

    /// A `keynum` key spec outside the one supported offset shape.
    #[error(
        "command `{command}`: unsupported keynum key spec (keynumidx={keynum_index_offset}, \
         firstkey={first_key_offset}); expected keynumidx=0, firstkey=1"
    )]
    KeynumContract {
        command: String,
        keynum_index_offset: i64,
        first_key_offset: i64,
    },
}

impl SchemaError {
    pub(crate) fn malformed_source(source_name: &str, message: impl Into<String>) -> Self {
        SchemaError::Source {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}
