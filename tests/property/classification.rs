//! Property tests for connection error classification.
//!
//! Invariants tested:
//! - Any message containing a keyword, in any case, is a connection error
//! - Classification sees keywords anywhere in the source chain
//! - Context errors are never connection errors

use lifeline::{is_connection_error, ResourceError};
use proptest::prelude::*;

const KEYWORDS: &[&str] = &[
    "connection refused",
    "connection reset",
    "broken pipe",
    "no such host",
    "timeout",
    "eof",
    "closed",
];

fn keyword() -> impl Strategy<Value = &'static str> {
    prop::sample::select(KEYWORDS)
}

/// Changes the case of every other character.
fn mixed_case(s: &str, upper_first: bool) -> String {
    s.chars()
        .enumerate()
        .map(|(i, c)| {
            if (i % 2 == 0) == upper_first {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Embedded keywords are found regardless of case and context
    #[test]
    fn keyword_anywhere_is_connection_error(
        prefix in "[a-z0-9 :]{0,20}",
        suffix in "[a-z0-9 :]{0,20}",
        keyword in keyword(),
        upper_first in any::<bool>(),
    ) {
        let message = format!("{prefix}{}{suffix}", mixed_case(keyword, upper_first));
        let err = ResourceError::msg(message);
        prop_assert!(err.is_connection_error());
        prop_assert!(is_connection_error(Some(&err)));
    }

    /// Property: Wrapping does not hide a connection error
    #[test]
    fn keyword_in_source_chain(keyword in keyword(), depth in 1usize..4) {
        let mut err = ResourceError::msg(format!("dial: {keyword}"));
        for level in 0..depth {
            err = match level % 3 {
                0 => err.named("db"),
                1 => ResourceError::RetryExhausted { attempts: 3, source: Box::new(err) },
                _ => ResourceError::ReconnectFailed { source: Box::new(err) },
            };
        }
        prop_assert!(err.is_connection_error());
    }

    /// Property: Messages made only of other letters are never connection errors
    #[test]
    fn unrelated_messages_are_not_connection_errors(message in "[fghjkmquvwxz ]{0,40}") {
        let err = ResourceError::msg(message);
        prop_assert!(!err.is_connection_error());
    }
}

#[test]
fn context_errors_are_not_connection_errors() {
    assert!(!ResourceError::Cancelled.is_connection_error());
    assert!(!ResourceError::DeadlineExceeded.is_connection_error());
    assert!(!is_connection_error(None));
}
