//! Log sanitization for screening data.
//!
//! Screening answers and scores are health information. This module redacts
//! them from formatted log output, together with contact details and
//! assessment identifiers:
//! - Assessment IDs (UUIDs)
//! - Email addresses and phone numbers
//! - `key=value` / `key: value` pairs for scores, answers and clinical fields
//!
//! # Prefer structured logging
//!
//! Sanitizing strings is a fallback. Call sites should not log respondent
//! values in the first place; counts and tier labels are fine.
//!
//! # Performance
//!
//! Input is capped at `MINDSCOPE_SANITIZE_MAX_BYTES` bytes per call
//! (default 16 KiB) before scanning.

use regex::{Regex, RegexSet};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<SensitivePatterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

/// Environment variable overriding the per-call size cap.
pub const SANITIZE_MAX_BYTES_ENV: &str = "MINDSCOPE_SANITIZE_MAX_BYTES";

struct SensitivePattern {
    regex: Regex,
    replacement: &'static str,
}

struct SensitivePatterns {
    set: RegexSet,
    patterns: Vec<SensitivePattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var(SANITIZE_MAX_BYTES_ENV)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static SensitivePatterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Assessment IDs
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-ID]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
            // Answer lists, e.g. answers=[1, 2, 3] or phq9: [0,1,2]
            (
                r"(?i)\b(?:answers|responses|phq9|phq-9|gad7|gad-7)\b\s*[:=]\s*\[[0-9,\s]*\]",
                "[REDACTED-ANSWERS]",
            ),
            // Scores and clinical fields, e.g. depression_score=12, "Sleep_Hours": 6.5
            (
                r#"(?i)"?\b(?:depression[_ ]?score|anxiety[_ ]?score|phq9[_ ]?score|gad7[_ ]?score|score|age|sleep[_ ]?hours|days[_ ]?of[_ ]?treatment|treatment[_ ]?days)\b"?\s*[:=]\s*-?[0-9]+(?:\.[0-9]+)?"#,
                "[REDACTED-SCORE]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = rules
            .into_iter()
            .map(|(pattern, replacement)| SensitivePattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        SensitivePatterns { set, patterns }
    })
}

/// Replace every sensitive pattern in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let matched: Vec<usize> = patterns.set.matches(prefix).into_iter().collect();
    let mut result = prefix.to_string();
    for idx in matched {
        let pattern = &patterns.patterns[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Whether `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _truncated) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// Wraps a `MakeWriter` so every formatted log line is redacted before it
/// reaches the sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            pending: Vec::new(),
        }
    }
}

/// Line-buffered writer handed out by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    /// Bytes after the last newline seen so far
    pending: Vec<u8>,
}

impl<W: Write> SanitizingWriter<W> {
    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        let clean = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(clean.as_bytes())
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        if let Some(last) = self.pending.iter().rposition(|&b| b == b'\n') {
            let tail = self.pending.split_off(last + 1);
            let complete = std::mem::replace(&mut self.pending, tail);
            for line in complete.split_inclusive(|&b| b == b'\n') {
                self.emit(line)?;
            }
        }

        // An unterminated line past the cap is cut; sanitize marks the cut
        if self.pending.len() > max_sanitize_bytes() {
            let overlong = std::mem::take(&mut self.pending);
            self.emit(&overlong)?;
            self.inner.write_all(b"\n")?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest)?;
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_assessment_id() {
        let sanitized = sanitize("Assessment 550e8400-e29b-41d4-a716-446655440000 stored");
        assert!(sanitized.contains("[REDACTED-ID]"));
        assert!(!sanitized.contains("550e8400"));
    }

    #[test]
    fn test_sanitize_contacts() {
        let sanitized = sanitize("Contact: someone@example.org or 555-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_sanitize_scores() {
        let sanitized = sanitize("depression_score=12 anxiety_score: 10 tier=High");
        assert!(!sanitized.contains("12"));
        assert!(!sanitized.contains("10"));
        assert!(sanitized.contains("tier=High"));
    }

    #[test]
    fn test_sanitize_json_fields() {
        let sanitized = sanitize(r#"{"Sleep_Hours": 6.5, "Gender": "Female"}"#);
        assert!(!sanitized.contains("6.5"));
        assert!(sanitized.contains("Gender"));
    }

    #[test]
    fn test_sanitize_answer_list() {
        let sanitized = sanitize("phq9=[1, 2, 3, 0, 1, 2, 3, 0, 1]");
        assert_eq!(sanitized, "[REDACTED-ANSWERS]");
    }

    #[test]
    fn test_contains_sensitive() {
        assert!(contains_sensitive("age=29"));
        assert!(!contains_sensitive("Training complete: best model Random Forest"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("0123456789abcdefghijklmnop", 16);
        assert!(sanitized.ends_with("[TRUNCATED]"));
        assert!(sanitized.starts_with("0123456789abcdef"));
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                pending: Vec::new(),
            };
            writer.write_all(b"score=27\nok line\n").unwrap();
            writer.flush().unwrap();
        }
        let out = String::from_utf8(sink).unwrap();
        assert!(out.contains("[REDACTED-SCORE]"));
        assert!(out.contains("ok line"));
        assert!(!out.contains("27"));
    }

    #[test]
    fn test_writer_joins_split_writes() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                pending: Vec::new(),
            };
            writer.write_all(b"phq9_sc").unwrap();
            writer.write_all(b"ore=19 done\nnext").unwrap();
            writer.flush().unwrap();
        }
        let out = String::from_utf8(sink).unwrap();
        assert!(!out.contains("19"));
        assert!(out.ends_with("next"));
    }

    #[test]
    fn test_writer_redacts_generated_ids() {
        let id = crate::domain::new_assessment_id();
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                pending: Vec::new(),
            };
            writeln!(writer, "stored assessment {id}").unwrap();
        }
        let out = String::from_utf8(sink).unwrap();
        assert!(!out.contains(&id));
        assert!(out.starts_with("stored assessment "));
    }
}
