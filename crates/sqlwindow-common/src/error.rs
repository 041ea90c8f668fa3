use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, ThisError)]
pub enum Error {
    #[error("Specification error: {message} [window: {window}{}]", call_suffix(.call))]
    Specification {
        window: String,
        call: Option<String>,
        message: String,
    },
    #[error("Domain error: {message} [call: {call}, window: {window}]")]
    Domain {
        call: String,
        window: String,
        message: String,
    },
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Column not found: {name}{}", context_suffix(.call, .window))]
    ColumnNotFound {
        name: String,
        call: Option<String>,
        window: Option<String>,
    },
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Numeric overflow{}", context_suffix(.call, .window))]
    Overflow {
        call: Option<String>,
        window: Option<String>,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

fn call_suffix(call: &Option<String>) -> String {
    match call {
        Some(call) => format!(", call: {}", call),
        None => String::new(),
    }
}

fn context_suffix(call: &Option<String>, window: &Option<String>) -> String {
    match (call, window) {
        (Some(call), Some(window)) => format!(" [call: {}, window: {}]", call, window),
        (Some(call), None) => format!(" [call: {}]", call),
        (None, Some(window)) => format!(" [window: {}]", window),
        (None, None) => String::new(),
    }
}

impl Error {
    pub fn specification(window: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Specification {
            window: window.into(),
            call: None,
            message: message.into(),
        }
    }

    pub fn domain(
        call: impl Into<String>,
        window: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Domain {
            call: call.into(),
            window: window.into(),
            message: message.into(),
        }
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::InvalidQuery(msg.into())
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            name: name.into(),
            call: None,
            window: None,
        }
    }

    pub fn overflow() -> Self {
        Error::Overflow {
            call: None,
            window: None,
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Attaches the offending call to an error raised while binding or
    /// evaluating it. A call already recorded is kept.
    pub fn in_call(self, name: &str) -> Self {
        match self {
            Error::Specification {
                window,
                call: None,
                message,
            } => Error::Specification {
                window,
                call: Some(name.to_string()),
                message,
            },
            Error::ColumnNotFound {
                name: column,
                call: None,
                window,
            } => Error::ColumnNotFound {
                name: column,
                call: Some(name.to_string()),
                window,
            },
            Error::Overflow { call: None, window } => Error::Overflow {
                call: Some(name.to_string()),
                window,
            },
            other => other,
        }
    }

    /// Attaches the window label to column and overflow errors. Specification
    /// and domain errors always carry one already.
    pub fn in_window(self, label: &str) -> Self {
        match self {
            Error::ColumnNotFound {
                name,
                call,
                window: None,
            } => Error::ColumnNotFound {
                name,
                call,
                window: Some(label.to_string()),
            },
            Error::Overflow { call, window: None } => Error::Overflow {
                call,
                window: Some(label.to_string()),
            },
            other => other,
        }
    }

    pub fn is_specification(&self) -> bool {
        matches!(self, Error::Specification { .. })
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Error::Domain { .. })
    }
}
