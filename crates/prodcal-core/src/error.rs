use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::http_client::HttpError;

/// Errors surfaced by calendar construction and queries.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// A query was given an argument outside the recognized domain.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A single rules provider could not produce rules.
    #[error("rules source '{provider}' is unavailable: {cause}")]
    SourceUnavailable {
        provider: String,
        #[source]
        cause: SourceCause,
    },

    /// Every provider in the chain failed.
    #[error("no rules provider could supply a calendar:{}", format_failures(.failures))]
    AllProvidersFailed { failures: Vec<ProviderFailure> },
}

impl CalendarError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn source_unavailable(provider: impl Into<String>, cause: impl Into<SourceCause>) -> Self {
        Self::SourceUnavailable {
            provider: provider.into(),
            cause: cause.into(),
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "calendar.invalid_argument",
            Self::SourceUnavailable { .. } => "calendar.source_unavailable",
            Self::AllProvidersFailed { .. } => "calendar.all_providers_failed",
        }
    }
}

/// Underlying reason a provider reported itself unavailable.
#[derive(Debug, Error)]
pub enum SourceCause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Other(String),
}

impl From<String> for SourceCause {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for SourceCause {
    fn from(message: &str) -> Self {
        Self::Other(message.to_owned())
    }
}

/// One failed attempt recorded by the provider chain.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: CalendarError,
}

impl Display for ProviderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  - {failure}"))
        .collect()
}

/// Failure of a whole fetch batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Not a single request in the batch produced a body.
    #[error("fetch failed, no request produced a body:{}", format_request_errors(.errors))]
    FetchFailed { errors: Vec<HttpError> },
}

impl FetchError {
    pub fn errors(&self) -> &[HttpError] {
        match self {
            Self::FetchFailed { errors } => errors,
        }
    }
}

fn format_request_errors(errors: &[HttpError]) -> String {
    if errors.is_empty() {
        return String::from(" empty request batch");
    }
    errors.iter().map(|error| format!("\n  {error}")).collect()
}

/// Malformed feed document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed feed document: {0}")]
    Syntax(String),

    #[error("feed document has no '{0}' attribute on its root element")]
    MissingYear(&'static str),

    #[error("feed document declares invalid year '{0}'")]
    InvalidYear(String),

    #[error("day entry has invalid date '{0}', expected MM.DD")]
    InvalidDay(String),

    #[error("day entry is missing its '{0}' attribute")]
    MissingAttribute(&'static str),
}

impl From<quick_xml::Error> for DecodeError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Syntax(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Syntax(error.to_string())
    }
}
