//! Error types for mtg_proxy

use thiserror::Error;

/// Unified error type for card resolution, caching and layout
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Scryfall has no card matching the request
    #[error("Card not found on Scryfall: {0}")]
    NotFound(String),

    /// HTTP request failed before a status was received (DNS, refused, timeout, ...)
    #[error("Network error requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx HTTP status
    #[error("bad status: {url} - {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Cached or remote payload could not be decoded
    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The card has no image of the requested variant
    #[error("No {variant} image available for card: {card}")]
    NoSuchVariant { card: String, variant: String },

    /// Cache store or local file access failed
    #[error("I/O error: {0}")]
    Store(#[from] std::io::Error),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The page canvas rejected a drawing instruction
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// Cards were dropped and the caller asked for all or nothing
    #[error("{dropped} cards could not be resolved")]
    Incomplete { dropped: usize },

    /// The deck violates one of its invariants
    #[error("Invalid deck: {0}")]
    InvalidDeck(String),
}

impl ProxyError {
    /// Errors after which no further progress is possible for the job.
    ///
    /// Everything else is scoped to a single card and is reported, not propagated.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProxyError::Store(_)
                | ProxyError::HttpClient(_)
                | ProxyError::Canvas(_)
                | ProxyError::InvalidDeck(_)
                | ProxyError::Incomplete { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProxyError::NotFound(_))
    }
}

/// Result alias for mtg_proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_fatal() {
        let err = ProxyError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_incomplete_is_its_own_error() {
        let err = ProxyError::Incomplete { dropped: 3 };
        assert!(err.is_fatal());
        assert!(!matches!(err, ProxyError::InvalidDeck(_)));
        assert_eq!(err.to_string(), "3 cards could not be resolved");
    }

    #[test]
    fn test_resolution_errors_are_not_fatal() {
        let not_found = ProxyError::NotFound("Plainz".to_string());
        assert!(!not_found.is_fatal());
        assert!(not_found.is_not_found());

        let status = ProxyError::BadStatus {
            url: "https://api.scryfall.com/cards/named?fuzzy=x".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(!status.is_fatal());
        assert!(!status.is_not_found());
        assert!(status.to_string().starts_with("bad status:"));

        let variant = ProxyError::NoSuchVariant {
            card: "Plains".to_string(),
            variant: "large".to_string(),
        };
        assert!(!variant.is_fatal());
        assert_eq!(
            variant.to_string(),
            "No large image available for card: Plains"
        );
    }
}
