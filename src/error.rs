//! Error taxonomy shared by the fetch layer and the in-memory lookups.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid selection {index} (hand holds {len} cards)")]
    InvalidSelection { index: usize, len: usize },
}

impl DexError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        DexError::FetchFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        DexError::NotFound(what.into())
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, DexError::FetchFailure { .. })
    }
}

pub type DexResult<T> = Result<T, DexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_resource() {
        let err = DexError::fetch("https://pokeapi.co/api/v2/pokemon/9999", "404 Not Found");
        assert!(err.is_fetch_failure());
        assert_eq!(
            err.to_string(),
            "fetch failed for https://pokeapi.co/api/v2/pokemon/9999: 404 Not Found"
        );

        let err = DexError::InvalidSelection { index: 7, len: 6 };
        assert_eq!(err.to_string(), "invalid selection 7 (hand holds 6 cards)");
        assert!(!err.is_fetch_failure());
    }
}
