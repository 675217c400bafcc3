use thiserror::Error;

/// Machine-readable quota denial reasons, surfaced to the calling layer so it
/// can render a signup or upgrade prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    GuestLimitReached,
    FreeLimitReached,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::GuestLimitReached => write!(f, "GUEST_LIMIT_REACHED"),
            DenyReason::FreeLimitReached => write!(f, "FREE_LIMIT_REACHED"),
        }
    }
}

/// Failure calling an LLM backend. Recovered locally by the fallback
/// synthesizer; never surfaced raw to the caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("missing credentials: {0}")] MissingCredentials(String),
    #[error("request failed: {0}")] Http(#[from] reqwest::Error),
    #[error("api error ({status}): {body}")] Api { status: u16, body: String },
    #[error("empty completion content")] EmptyContent,
    #[error("timed out after {0}s")] Timeout(u64),
    #[error("no adapter configured for provider '{0}'")] NotConfigured(String),
}

/// Failure generating image or video. Recovered by omitting the media field.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("missing credentials: {0}")] MissingCredentials(String),
    #[error("request failed: {0}")] Http(#[from] reqwest::Error),
    #[error("api error ({status}): {body}")] Api { status: u16, body: String },
    #[error("response carried no media url")] MissingUrl,
    #[error("timed out after {0}s")] Timeout(u64),
    #[error("provider error: {0}")] Provider(#[from] ProviderError),
}

/// Malformed client input. Distinct from quota denial and from upstream
/// provider faults.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("topic too short (minimum {min} characters)")] TopicTooShort { min: usize },
    #[error("creativity {0} outside the 0.1-1.0 range")] CreativityOutOfRange(f32),
    #[error("max length must be greater than zero")] ZeroMaxLength,
    #[error("base content is empty")] EmptyBaseContent,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("store unavailable: {0}")] Unavailable(String),
    #[error("write failed: {0}")] WriteFailed(String),
}

/// The only errors `Orchestrator::generate` surfaces. Provider and media
/// failures never appear here; they degrade to fallback content or missing
/// media inside the pipeline.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid request: {0}")] Validation(#[from] ValidationError),
    #[error("usage store failure: {0}")] Usage(#[from] PersistenceError),
}
