use serde::Serialize;

/// A single failed input rule, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Validation(Vec<FieldError>),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

const VALIDATION_MESSAGE: &str = "Validation failed";
const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// The detail is for the server log only; clients get a generic message.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Message safe to show to the client.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(_) => VALIDATION_MESSAGE,
            Self::Internal(_) => INTERNAL_MESSAGE,
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => message.as_str(),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Internal(detail) => detail.as_str(),
            _ => self.message(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                let fields: Vec<String> = errors
                    .iter()
                    .map(|err| format!("{}: {}", err.field, err.message))
                    .collect();
                write!(f, "{VALIDATION_MESSAGE} ({})", fields.join("; "))
            }
            _ => write!(f, "{}", self.detail()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<crate::db::dao::DaoLayerError> for AppError {
    fn from(err: crate::db::dao::DaoLayerError) -> Self {
        use crate::db::dao::DaoLayerError;

        match err {
            DaoLayerError::NotFound { entity, .. } => {
                AppError::not_found(format!("{} not found", short_entity_name(entity)))
            }
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(_) => AppError::internal(err.to_string()),
        }
    }
}

// "chess_server::db::entities::game::Entity" -> "game"
fn short_entity_name(type_name: &str) -> &str {
    type_name
        .rsplit("::")
        .nth(1)
        .unwrap_or(type_name)
}
