//! Quota checks for note drafts.
//!
//! # Responsibility
//! - Count words the same way the note service does.
//! - Decide whether a draft may be submitted and why not.
//!
//! # Invariants
//! - Pure and synchronous; no logging, no I/O.
//! - Only the word-limit rejection is an error. Empty drafts and a full
//!   quota disable submission silently.

use std::fmt::{Display, Formatter};

/// Hard cap on notes per account.
pub const MAX_NOTES_PER_ACCOUNT: usize = 10;
/// Hard cap on words per note.
pub const MAX_WORDS_PER_NOTE: usize = 50;

/// User-facing message for the word-limit rejection.
pub const WORD_LIMIT_MESSAGE: &str = "Note exceeds 50 words limit";

/// Counts whitespace-separated, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Result of checking a draft against both quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitCheck {
    Ok,
    Rejected(SubmitRejection),
}

impl SubmitCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Draft is empty after trimming.
    Empty,
    /// Draft has more than [`MAX_WORDS_PER_NOTE`] words.
    OverWordLimit { words: usize },
    /// Account already holds [`MAX_NOTES_PER_ACCOUNT`] notes.
    QuotaFull { count: usize },
}

impl SubmitRejection {
    /// Whether the rejection is shown as an error message rather than as a
    /// disabled submit control.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::OverWordLimit { .. })
    }
}

impl Display for SubmitRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Note is empty"),
            Self::OverWordLimit { .. } => write!(f, "{WORD_LIMIT_MESSAGE}"),
            Self::QuotaFull { count } => {
                write!(f, "Maximum number of notes ({MAX_NOTES_PER_ACCOUNT}) reached ({count})")
            }
        }
    }
}

/// Checks `text` against the word limit and `current_note_count` against the
/// note quota.
///
/// Precedence when several rules fail: empty, then word limit, then quota.
/// This keeps the word-limit error visible even when the quota is full.
pub fn can_submit_note(text: &str, current_note_count: usize) -> SubmitCheck {
    if text.trim().is_empty() {
        return SubmitCheck::Rejected(SubmitRejection::Empty);
    }
    let words = word_count(text);
    if words > MAX_WORDS_PER_NOTE {
        return SubmitCheck::Rejected(SubmitRejection::OverWordLimit { words });
    }
    if current_note_count >= MAX_NOTES_PER_ACCOUNT {
        return SubmitCheck::Rejected(SubmitRejection::QuotaFull {
            count: current_note_count,
        });
    }
    SubmitCheck::Ok
}

#[cfg(test)]
mod tests {
    use super::{can_submit_note, word_count, SubmitCheck, SubmitRejection};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn word_count_ignores_surrounding_and_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count(" a  b "), 2);
        assert_eq!(word_count("one\ntwo\tthree"), 3);
    }

    #[test]
    fn word_count_is_stable_on_normalized_input() {
        let text = "already trimmed single spaced";
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(word_count(text), word_count(&normalized));
        assert_eq!(word_count(text), 4);
    }

    #[test]
    fn word_limit_rejects_regardless_of_note_count() {
        for count in [0, 5, 9, 10, 12] {
            assert_eq!(
                can_submit_note(&words(51), count),
                SubmitCheck::Rejected(SubmitRejection::OverWordLimit { words: 51 })
            );
        }
    }

    #[test]
    fn full_quota_rejects_even_one_word() {
        let check = can_submit_note("hello", 10);
        assert_eq!(
            check,
            SubmitCheck::Rejected(SubmitRejection::QuotaFull { count: 10 })
        );
    }

    #[test]
    fn fifty_words_with_nine_notes_is_accepted() {
        assert!(can_submit_note(&words(50), 9).is_ok());
    }

    #[test]
    fn blank_draft_is_rejected_as_empty() {
        assert_eq!(
            can_submit_note("  \n ", 0),
            SubmitCheck::Rejected(SubmitRejection::Empty)
        );
    }

    #[test]
    fn only_word_limit_counts_as_error() {
        assert!(SubmitRejection::OverWordLimit { words: 60 }.is_error());
        assert!(!SubmitRejection::Empty.is_error());
        assert!(!SubmitRejection::QuotaFull { count: 10 }.is_error());
        assert_eq!(
            SubmitRejection::OverWordLimit { words: 60 }.to_string(),
            "Note exceeds 50 words limit"
        );
    }
}
