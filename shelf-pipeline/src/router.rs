//! Query routing: picks which expiry subset answers a chat message.
//!
//! Rules, first match wins, on lower-cased whitespace-collapsed text:
//! 1. a near-expiry phrase        -> about_to_expire
//! 2. the word "expired"          -> expired
//! 3. anything else               -> expired, then about_to_expire
//!
//! The result is truncated to the first `limit` rows, never sampled.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::classifier::ExpiryClassification;
use crate::thresholds::ExpiryWindow;
use crate::types::InventoryTable;
use crate::util::normalize_text;

/// Phrases that route a message to the near-expiry subset.
pub const NEAR_EXPIRY_PHRASES: [&str; 4] = [
    "about to expire",
    "near expiry",
    "nearing expiry",
    "close to expiry",
];

/// Which subset a message was routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ContextScope {
    NearExpiry,
    Expired,
    ExpiredAndNearExpiry,
}

impl ContextScope {
    pub fn detect(user_text: &str) -> Self {
        let text = normalize_text(user_text);
        if NEAR_EXPIRY_PHRASES.iter().any(|p| text.contains(p)) {
            ContextScope::NearExpiry
        } else if text.contains("expired") {
            ContextScope::Expired
        } else {
            ContextScope::ExpiredAndNearExpiry
        }
    }

    /// Human-readable description of the rows this scope selects.
    pub fn label(&self, window: ExpiryWindow) -> String {
        match self {
            ContextScope::NearExpiry => format!(
                "products with {}-{} days to expiry",
                window.min(),
                window.max()
            ),
            ContextScope::Expired => "expired products".to_string(),
            ContextScope::ExpiredAndNearExpiry => "expired and near-expiry products".to_string(),
        }
    }
}

impl fmt::Display for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextScope::NearExpiry => write!(f, "near-expiry"),
            ContextScope::Expired => write!(f, "expired"),
            ContextScope::ExpiredAndNearExpiry => write!(f, "expired+near-expiry"),
        }
    }
}

/// The bounded set of records forwarded to the assistant for one message.
#[derive(Clone, Debug)]
pub struct ContextSelection {
    pub scope: ContextScope,
    pub label: String,
    pub records: InventoryTable,
}

/// No row matched the routed filter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no products match the {label} filter")]
pub struct EmptyContext {
    pub scope: ContextScope,
    pub label: String,
}

/// Route a chat message to its context subset.
pub fn route(
    user_text: &str,
    classification: &ExpiryClassification,
    limit: usize,
) -> Result<ContextSelection, EmptyContext> {
    let scope = ContextScope::detect(user_text);
    let label = scope.label(classification.window);

    let records = match scope {
        ContextScope::NearExpiry => classification.about_to_expire.head(limit),
        ContextScope::Expired => classification.expired.head(limit),
        ContextScope::ExpiredAndNearExpiry => {
            let expired = &classification.expired;
            let near = &classification.about_to_expire;
            // Both subsets come from one classify() call and share a schema.
            match expired.concat(near) {
                Some(both) => both.head(limit),
                None if expired.is_empty() => near.head(limit),
                None => expired.head(limit),
            }
        }
    };

    log::debug!("routed scope={} rows={}", scope, records.len());

    if records.is_empty() {
        return Err(EmptyContext { scope, label });
    }

    Ok(ContextSelection {
        scope,
        label,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_expiry_phrases_win() {
        assert_eq!(ContextScope::detect("Is anything ABOUT TO   EXPIRE?"), ContextScope::NearExpiry);
        assert_eq!(ContextScope::detect("items close to expiry"), ContextScope::NearExpiry);
        assert_eq!(
            ContextScope::detect("expired or nearing expiry?"),
            ContextScope::NearExpiry
        );
    }

    #[test]
    fn expired_without_near_phrase() {
        assert_eq!(ContextScope::detect("list expired items"), ContextScope::Expired);
    }

    #[test]
    fn everything_else_is_combined() {
        assert_eq!(ContextScope::detect("status check"), ContextScope::ExpiredAndNearExpiry);
        assert_eq!(ContextScope::detect(""), ContextScope::ExpiredAndNearExpiry);
    }

    #[test]
    fn near_expiry_label_uses_window() {
        let window = ExpiryWindow::new(2, 14).unwrap();
        assert_eq!(
            ContextScope::NearExpiry.label(window),
            "products with 2-14 days to expiry"
        );
    }
}
