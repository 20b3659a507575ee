//! Job reference.
//!
//! A task never carries a live job instance; it carries the stable name
//! the worker's registry resolves at execution time. That keeps tasks
//! serializable across process boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable name of an executable job type (e.g. `SendEmailJob` or
/// `acme.billing.ChargeJob`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display-only label: lowercase, underscore-separated.
    ///
    /// Takes the last `.`/`::`-separated segment, splits it on case
    /// boundaries (a run of consecutive uppercase letters counts as one
    /// unit, so `HTTPServer` becomes `http_server`), and drops a
    /// trailing `job` segment unless it is the only one. Does not
    /// affect the stored name.
    pub fn human_readable(&self) -> String {
        let last = self
            .0
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(&self.0);

        let chars: Vec<char> = last.chars().collect();
        let mut words: Vec<String> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_ascii_uppercase() {
                // Consume the uppercase/digit run.
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_ascii_uppercase() || chars[j].is_ascii_digit())
                {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_lowercase() {
                    if j - i > 1 {
                        // Acronym followed by a word: the last uppercase
                        // letter opens the next word.
                        words.push(lowered(&chars[i..j - 1]));
                        i = j - 1;
                    } else {
                        // Single capital heading a word.
                        let mut k = j;
                        while k < chars.len()
                            && (chars[k].is_ascii_lowercase() || chars[k].is_ascii_digit())
                        {
                            k += 1;
                        }
                        words.push(lowered(&chars[i..k]));
                        i = k;
                    }
                } else {
                    // Acronym at the end of the name.
                    words.push(lowered(&chars[i..j]));
                    i = j;
                }
            } else if chars[i].is_ascii_alphanumeric() {
                let mut k = i + 1;
                while k < chars.len() && (chars[k].is_ascii_lowercase() || chars[k].is_ascii_digit())
                {
                    k += 1;
                }
                words.push(lowered(&chars[i..k]));
                i = k;
            } else {
                // Separators ('_', '-', ...) delimit words but are not kept.
                i += 1;
            }
        }

        if words.len() > 1 && words.last().map(String::as_str) == Some("job") {
            words.pop();
        }

        words.join("_")
    }
}

fn lowered(chars: &[char]) -> String {
    chars.iter().collect::<String>().to_ascii_lowercase()
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("SendEmailJob", "send_email")]
    #[case::acronym("HTTPFetchJob", "http_fetch")]
    #[case::no_job_suffix("Cleanup", "cleanup")]
    #[case::acronym_mid("HTTPServer", "http_server")]
    #[case::trailing_acronym("ExportCSV", "export_csv")]
    #[case::digits("S3UploadJob", "s3_upload")]
    #[case::sole_segment("Job", "job")]
    #[case::dotted_namespace("acme.billing.ChargeJob", "charge")]
    #[case::rust_path("reports::HTTPFetchJob", "http_fetch")]
    fn human_readable_labels(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(JobName::new(raw).human_readable(), expected);
    }

    #[test]
    fn human_readable_does_not_touch_the_stored_name() {
        let name = JobName::new("SendEmailJob");
        let _ = name.human_readable();
        assert_eq!(name.as_str(), "SendEmailJob");
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = JobName::new("SendEmailJob");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"SendEmailJob\"");
    }
}
