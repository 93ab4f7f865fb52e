use thiserror::Error;

use crate::domain::item::ItemId;

/// Failures the explosion pipeline can surface. Rows that classify as
/// `unknown` are a valid terminal state, not an error: they are silently
/// excluded from every total. Malformed quantities are rejected by the
/// ingestion layer before any row reaches this crate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no root item found (no row with level == 0)")]
    MissingRoot,
    #[error("ambiguous root: multiple distinct items at level 0: {candidates:?}")]
    AmbiguousRoot { candidates: Vec<ItemId> },
    #[error("explosion exceeded the depth limit of {limit} below item {item}")]
    DepthLimitExceeded { item: ItemId, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::DomainError;
    use crate::domain::item::ItemId;

    #[test]
    fn messages_name_the_offending_item() {
        let error = DomainError::DepthLimitExceeded { item: ItemId::from("A-1"), limit: 64 };
        assert!(error.to_string().contains("A-1"));
        assert!(error.to_string().contains("64"));
    }

    #[test]
    fn missing_root_is_a_dedicated_condition() {
        assert_eq!(
            DomainError::MissingRoot.to_string(),
            "no root item found (no row with level == 0)"
        );
    }
}
