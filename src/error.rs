use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Catalog feed errors
    #[error("Failed to fetch the free game catalog: {0}")]
    FetchError(reqwest::Error),
    // Parsing/validation errors
    #[error("{0}")]
    ParsingError(String),
    // Subscriber already present
    #[error("{0} is already subscribed")]
    Duplicate(String),
    // Email client errors
    #[error("Failed to send email: {0}")]
    SendEmailError(reqwest::Error),
    // Database errors
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

pub type RestResult<T> = std::result::Result<T, RestError>;

/// Errors returned from REST endpoints, rendered as `{ "error", "message" }` JSON bodies
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Failed to authenticate")]
    FailedToAuthenticate(#[source] anyhow::Error),

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream Error: {0}")]
    Upstream(String),

    #[error("Internal Server Error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RestError {
    fn kind(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "validation",
            Self::FailedToAuthenticate(_) => "unauthorized",
            Self::Conflict(_) => "duplicate",
            Self::Upstream(_) => "upstream",
            Self::InternalError(_) | Self::Other(_) => "internal",
        }
    }
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        match e {
            Error::ParsingError(msg) => Self::ParseError(msg),
            Error::Duplicate(email) => Self::Conflict(format!("{} is already subscribed", email)),
            Error::FetchError(ref source) => {
                tracing::error!(error.cause_chain = ?source, "Catalog fetch failed");
                Self::Upstream("Catalog feed unavailable".into())
            }
            Error::SendEmailError(ref source) => {
                tracing::error!(error.cause_chain = ?source, "Email delivery failed");
                Self::Upstream("Failed to send email".into())
            }
            Error::DatabaseError(ref source) => {
                tracing::error!(error.cause_chain = ?source, "Database operation failed");
                Self::InternalError("Database error".into())
            }
        }
    }
}

impl actix_web::ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::FailedToAuthenticate(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        if let Self::FailedToAuthenticate(_) = self {
            res.insert_header((header::WWW_AUTHENTICATE, r#"Basic realm="admin""#));
        }
        // Internal details stay in the logs
        let message = match self {
            Self::Other(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        res.json(serde_json::json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}
