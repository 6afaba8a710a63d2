//! Deterministic matching of extraction field names onto form field
//! paths.

use serde::{Deserialize, Serialize};

use super::processor::FormField;

/// Which rule matched an extraction field to a form field, ordered from
/// strictest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Extraction name equals the form field path.
    Exact,
    /// Equal ignoring case.
    CaseInsensitive,
    /// Equal after lowercasing and stripping non-alphanumerics.
    Normalized,
    /// Matches the last path segment or the field label.
    Alias,
}

/// A successful extraction-to-form match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub form_path: String,
    pub strategy: MatchStrategy,
}

/// Lowercase, alphanumerics only. "Contact E-Mail" and "contact_email"
/// normalize identically.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Matches one extraction field name against the target form fields.
///
/// Strategies are tried strictest-first across the whole field list, so
/// an exact match anywhere always beats a looser match earlier in the
/// list. Within one strategy the first form field in declaration order
/// wins, keeping the outcome deterministic.
pub fn match_field(name: &str, form_fields: &[FormField]) -> Option<FieldMatch> {
    if let Some(field) = form_fields.iter().find(|f| f.path == name) {
        return Some(FieldMatch {
            form_path: field.path.clone(),
            strategy: MatchStrategy::Exact,
        });
    }

    if let Some(field) = form_fields
        .iter()
        .find(|f| f.path.eq_ignore_ascii_case(name))
    {
        return Some(FieldMatch {
            form_path: field.path.clone(),
            strategy: MatchStrategy::CaseInsensitive,
        });
    }

    let normalized = normalize(name);
    if !normalized.is_empty() {
        if let Some(field) = form_fields.iter().find(|f| normalize(&f.path) == normalized) {
            return Some(FieldMatch {
                form_path: field.path.clone(),
                strategy: MatchStrategy::Normalized,
            });
        }

        if let Some(field) = form_fields.iter().find(|f| {
            normalize(last_segment(&f.path)) == normalized || normalize(&f.label) == normalized
        }) {
            return Some(FieldMatch {
                form_path: field.path.clone(),
                strategy: MatchStrategy::Alias,
            });
        }
    }

    None
}
