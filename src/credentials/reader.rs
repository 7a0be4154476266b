// ABOUTME: Line reader for email:api_key credential files
// ABOUTME: Drops blanks and comments, splits on the first colon, and records skipped lines

use super::{CredentialRecord, Normalizer};
use crate::utils::sanitize_identifier;
use anyhow::{Context, Result};
use std::path::Path;

/// An input line that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input file
    pub line_number: usize,
    pub raw: String,
    pub reason: String,
}

/// Result of parsing one credential file
#[derive(Debug, Clone, Default)]
pub struct ParsedCredentials {
    pub records: Vec<CredentialRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl ParsedCredentials {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse credential text, one `email:api_key` pair per line
///
/// Blank lines and lines starting with `#` are ignored silently. Lines
/// without a colon, with an empty half, or with an email the normalizer
/// refuses are skipped with a warning naming the line number.
///
/// # Examples
///
/// ```
/// # use d1_apikey_loader::credentials::{parse_credentials, Normalizer};
/// let text = "# pool\nalice@x.com:k1\n\nnoColonHere\nbob:k2\n";
/// let parsed = parse_credentials(text, &Normalizer::default());
///
/// assert_eq!(parsed.records.len(), 2);
/// assert_eq!(parsed.records[1].email, "bob@gmail.com");
/// assert_eq!(parsed.skipped[0].line_number, 4);
/// ```
pub fn parse_credentials(text: &str, normalizer: &Normalizer) -> ParsedCredentials {
    let mut parsed = ParsedCredentials::default();
    // Editors on Windows often save with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut skip = |reason: String| {
            tracing::warn!(
                "Line {}: {}, skipping: {}",
                line_number,
                reason,
                redact_line(line)
            );
            parsed.skipped.push(SkippedLine {
                line_number,
                raw: line.to_string(),
                reason,
            });
        };

        let Some((email_part, key_part)) = line.split_once(':') else {
            skip("expected email:api_key".to_string());
            continue;
        };

        let email_part = email_part.trim();
        let api_key = key_part.trim();
        if email_part.is_empty() || api_key.is_empty() {
            skip("incomplete record".to_string());
            continue;
        }

        let email = match normalizer.normalize(email_part) {
            Ok(email) => email,
            Err(e) => {
                skip(e.to_string());
                continue;
            }
        };

        if email != email_part {
            tracing::info!("Line {}: appended default domain: {}", line_number, email);
        }

        parsed.records.push(CredentialRecord::new(email, api_key));
    }

    parsed
}

/// Line text for logs, with everything after the first colon masked
fn redact_line(line: &str) -> String {
    let redacted = match line.split_once(':') {
        Some((email, key)) => {
            let visible: String = key.trim().chars().take(4).collect();
            format!("{}:{}****", email, visible)
        }
        None => line.to_string(),
    };
    sanitize_identifier(&redacted)
}

/// Read and parse a credential file
///
/// A missing file is logged and yields an empty result rather than an
/// error, so callers must check [`ParsedCredentials::is_empty`]. Any other
/// read failure is returned as an error.
pub fn read_credentials(path: &Path, normalizer: &Normalizer) -> Result<ParsedCredentials> {
    if !path.exists() {
        tracing::error!("Input file does not exist: {}", path.display());
        return Ok(ParsedCredentials::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;

    let parsed = parse_credentials(&text, normalizer);
    tracing::info!(
        "Read {} API key record(s) from {} ({} line(s) skipped)",
        parsed.records.len(),
        path.display(),
        parsed.skipped.len()
    );

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IdentifierPolicy;
    use std::io::Write;

    #[test]
    fn test_well_formed_lines_trimmed() {
        let parsed = parse_credentials("  a@x.com :  k1  \nb@x.com:k2", &Normalizer::default());

        assert_eq!(
            parsed.records,
            vec![
                CredentialRecord::new("a@x.com", "k1"),
                CredentialRecord::new("b@x.com", "k2"),
            ]
        );
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        let parsed = parse_credentials("\n   \n# a@x.com:k1\n   # indented\n", &Normalizer::default());

        assert!(parsed.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_leading_byte_order_mark_ignored() {
        let parsed = parse_credentials(
            "\u{feff}# format: email:key\nalice@x.com:k1\n",
            &Normalizer::default(),
        );
        assert_eq!(parsed.records, vec![CredentialRecord::new("alice@x.com", "k1")]);
        assert!(parsed.skipped.is_empty());

        let parsed = parse_credentials("\u{feff}alice@x.com:k1", &Normalizer::default());
        assert_eq!(parsed.records[0].email, "alice@x.com");
    }

    #[test]
    fn test_redact_line_masks_api_key() {
        assert_eq!(redact_line("alice:AIzaSyFULLSECRET"), "alice:AIza****");
        assert_eq!(redact_line("noColonHere"), "noColonHere");
    }

    #[test]
    fn test_skipped_line_keeps_raw_text() {
        let normalizer = Normalizer::new(IdentifierPolicy::Reject, "gmail.com");
        let parsed = parse_credentials("alice:AIzaSyFULLSECRET", &normalizer);
        assert_eq!(parsed.skipped[0].raw, "alice:AIzaSyFULLSECRET");
    }

    #[test]
    fn test_line_without_colon_skipped_with_line_number() {
        let parsed = parse_credentials("a@x.com:k1\n\nnoColonHere\n", &Normalizer::default());

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line_number, 3);
        assert_eq!(parsed.skipped[0].raw, "noColonHere");
    }

    #[test]
    fn test_empty_parts_skipped() {
        let parsed = parse_credentials(":k1\na@x.com:\n  :  \n", &Normalizer::default());

        assert!(parsed.is_empty());
        let lines: Vec<usize> = parsed.skipped.iter().map(|s| s.line_number).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_only_first_colon_splits() {
        let parsed = parse_credentials("a@x.com:key:with:colons", &Normalizer::default());
        assert_eq!(parsed.records[0].api_key, "key:with:colons");
    }

    #[test]
    fn test_reject_policy_skips_bare_user_names() {
        let normalizer = Normalizer::new(IdentifierPolicy::Reject, "gmail.com");
        let parsed = parse_credentials("alice:k1\nbob@x.com:k2", &normalizer);

        assert_eq!(parsed.records, vec![CredentialRecord::new("bob@x.com", "k2")]);
        assert_eq!(parsed.skipped[0].line_number, 1);
        assert!(parsed.skipped[0].reason.contains("no '@'"));
    }

    #[test]
    fn test_append_policy_completes_user_names() {
        let parsed = parse_credentials("alice:k1", &Normalizer::default());
        assert_eq!(parsed.records[0].email, "alice@gmail.com");
    }

    #[test]
    fn test_every_record_has_at_sign() {
        let text = "a:1\nb@c:2\nd :3\n#e:4\nf@g.h:5";
        let parsed = parse_credentials(text, &Normalizer::default());
        assert_eq!(parsed.records.len(), 4);
        assert!(parsed.records.iter().all(|r| r.email.contains('@')));
    }

    #[test]
    fn test_read_missing_file_returns_empty() {
        let parsed =
            read_credentials(Path::new("/nonexistent/apikeys.txt"), &Normalizer::default())
                .unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# keys").unwrap();
        writeln!(file, "a@x.com:k1").unwrap();
        writeln!(file, "b@x.com:k2").unwrap();

        let parsed = read_credentials(file.path(), &Normalizer::default()).unwrap();
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn test_read_non_utf8_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, b':', b'k']).unwrap();

        assert!(read_credentials(file.path(), &Normalizer::default()).is_err());
    }
}
