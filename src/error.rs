//! Failure outcomes.
//!
//! Nothing here is fatal to the page. Each variant names one way an effect
//! can end up absent, and every caller logs it and carries on.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// A page element an effect draws into is not present.
    #[error("missing page element: {0}")]
    MissingElement(String),
    /// The drawing context could not be created.
    #[error("graphics context unavailable: {0}")]
    GraphicsUnavailable(String),
    /// An outbound address lookup failed or returned an unusable body.
    #[error("address lookup failed: {0}")]
    LookupFailed(String),
    /// The platform refused to start audio playback.
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    /// The preference store refused a write (quota, private browsing).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl EffectError {
    /// Name the selector of a lookup that came back empty.
    pub fn require<T>(found: Option<T>, selector: &str) -> Result<T, Self> {
        found.ok_or_else(|| Self::MissingElement(selector.to_owned()))
    }
}
