//! Transcript matching for the read-aloud game.
//!
//! Decides whether a (noisy) speech-recognition transcript counts as a correct
//! reading of the target word. Both sides are canonicalized with
//! [`normalize_text`] before comparison, and matching is deliberately
//! forgiving: the target only has to appear somewhere in the transcript.
//!
//! This module knows nothing about audio, files or HTTP.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

/// Anything that is neither a Unicode word character nor whitespace.
fn punctuation_regex() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Canonical comparison form of `text`.
///
/// Lowercases, trims, deletes punctuation (keeping letters of any script and
/// digits) and collapses whitespace runs into a single space.
///
/// ```
/// use bacaucap::matching::normalize_text;
///
/// assert_eq!(normalize_text("  BUKU!!  uh...  "), "buku uh");
/// ```
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = punctuation_regex().replace_all(lowered.trim(), "");
    let collapsed = whitespace_regex().replace_all(&stripped, " ");

    // Removing punctuation can expose whitespace at either edge ("buku !").
    collapsed.trim().to_string()
}

/// Whether `transcript` is an acceptable reading of `target_word`.
///
/// The normalized target must occur as a contiguous substring of the
/// normalized transcript. This is not word-bounded: "bukuku" is accepted for
/// "buku", and filler words around the target are ignored. When that fails,
/// spaces are removed from both sides and the check is repeated, which
/// recovers words the recognizer split apart ("ik an" for "ikan").
///
/// A blank target matches every transcript; reject it before calling this.
pub fn is_match(target_word: &str, transcript: &str) -> bool {
    matches_normalized(&normalize_text(target_word), &normalize_text(transcript))
}

fn matches_normalized(target: &str, transcript: &str) -> bool {
    if transcript.contains(target) {
        return true;
    }

    let compact_target = without_spaces(target);
    let compact_transcript = without_spaces(transcript);
    compact_transcript.contains(&compact_target)
}

fn without_spaces(text: &str) -> String {
    text.chars().filter(|c| *c != ' ').collect()
}

/// Outcome of evaluating one transcript against a target word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    transcript: String,
    normalized_transcript: String,
    is_correct: bool,
}

impl MatchResult {
    /// The transcript exactly as the recognizer produced it.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn normalized_transcript(&self) -> &str {
        &self.normalized_transcript
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

/// Normalize and match in one call, keeping the raw transcript for display.
pub fn evaluate_transcription(target_word: &str, transcript: &str) -> MatchResult {
    let normalized_target = normalize_text(target_word);
    let normalized_transcript = normalize_text(transcript);
    let is_correct = matches_normalized(&normalized_target, &normalized_transcript);

    debug!(
        "Evaluated '{}' against target '{}': {}",
        normalized_transcript,
        normalized_target,
        if is_correct { "correct" } else { "incorrect" }
    );

    MatchResult {
        transcript: transcript.to_string(),
        normalized_transcript,
        is_correct,
    }
}
