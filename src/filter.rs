// src/filter.rs

//! Admission filter for fetched postings.
//!
//! Applies the three-tier keyword policy to the lower-cased concatenation of
//! title + URL + note:
//!
//! 1. Role keywords must match at a word boundary ("java" matches
//!    "Java SE Developer" but not "JavaScript Developer").
//! 2. Include keywords match as plain substrings; an empty list falls back
//!    to a fixed set of remote-work indicators.
//! 3. Any exclude keyword rejects the posting unconditionally.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{CombinePolicy, FilterConfig, Posting};

/// Fallback include terms used when no include keywords are configured.
const DEFAULT_REMOTE_TERMS: [&str; 6] =
    ["remote", "wfh", "work from home", "anywhere", "latam", "brazil"];

/// Decides whether a posting is admitted to reconciliation.
///
/// Pure and side-effect free; all keyword patterns are compiled once at
/// construction.
#[derive(Debug)]
pub struct AdmissionFilter {
    role_patterns: Vec<Regex>,
    include_keywords: Vec<String>,
    exclude_keywords: Vec<String>,
    combine: CombinePolicy,
}

impl AdmissionFilter {
    /// Build a filter from the configured keyword lists.
    ///
    /// Keywords are lower-cased; role keywords become word-boundary
    /// patterns.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let role_patterns = normalize_keywords(&config.role_keywords)
            .iter()
            .map(|kw| {
                Regex::new(&format!(r"\b{}\b", regex::escape(kw)))
                    .map_err(|e| AppError::config(format!("bad role keyword {kw:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            role_patterns,
            include_keywords: normalize_keywords(&config.include_keywords),
            exclude_keywords: normalize_keywords(&config.exclude_keywords),
            combine: config.combine,
        })
    }

    /// Whether the posting passes the keyword policy.
    pub fn matches(&self, posting: &Posting) -> bool {
        let text = format!("{} {} {}", posting.title, posting.url, posting.note).to_lowercase();

        // Exclusion dominates regardless of the combine policy.
        if self.exclude_keywords.iter().any(|kw| text.contains(kw)) {
            return false;
        }

        let role_ok =
            self.role_patterns.is_empty() || self.role_patterns.iter().any(|re| re.is_match(&text));

        let include_ok = if self.include_keywords.is_empty() {
            DEFAULT_REMOTE_TERMS.iter().any(|term| text.contains(term))
        } else {
            self.include_keywords.iter().any(|kw| text.contains(kw))
        };

        match self.combine {
            CombinePolicy::Strict => role_ok && include_ok,
            CombinePolicy::Either => role_ok || include_ok,
        }
    }
}

/// Lower-case a keyword list and drop blank entries.
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, note: &str) -> Posting {
        Posting::new("Test", "acme", title, "https://a.co/1", note).unwrap()
    }

    fn filter(role: &[&str], include: &[&str], exclude: &[&str]) -> AdmissionFilter {
        let config = FilterConfig {
            role_keywords: role.iter().map(|s| s.to_string()).collect(),
            include_keywords: include.iter().map(|s| s.to_string()).collect(),
            exclude_keywords: exclude.iter().map(|s| s.to_string()).collect(),
            combine: CombinePolicy::Strict,
        };
        AdmissionFilter::new(&config).unwrap()
    }

    #[test]
    fn role_keyword_respects_word_boundaries() {
        let f = filter(&["java"], &["remote"], &[]);

        assert!(f.matches(&posting("Java SE Developer", "Remote")));
        assert!(!f.matches(&posting("JavaScript Developer", "Remote")));
    }

    #[test]
    fn empty_role_list_is_vacuously_satisfied() {
        let f = filter(&[], &["remote"], &[]);
        assert!(f.matches(&posting("Anything Developer", "Remote")));
    }

    #[test]
    fn empty_include_list_falls_back_to_remote_terms() {
        let f = filter(&["java"], &[], &[]);

        assert!(f.matches(&posting("Java Backend", "Remote")));
        assert!(f.matches(&posting("Java Backend", "WFH friendly")));
        assert!(!f.matches(&posting("Java Backend", "Onsite NYC")));
    }

    #[test]
    fn exclusion_dominates_role_and_include() {
        let f = filter(&["java"], &["remote"], &["javascript"]);

        // Matches role and include, but carries an excluded keyword.
        assert!(!f.matches(&posting("Java and JavaScript Developer", "Remote")));
    }

    #[test]
    fn url_and_note_participate_in_matching() {
        let f = filter(&["java"], &["remote"], &[]);

        let p = Posting::new(
            "Test",
            "acme",
            "Backend Engineer",
            "https://a.co/java-backend",
            "remote, anywhere",
        )
        .unwrap();
        assert!(f.matches(&p));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let f = filter(&["java"], &["REMOTE"], &["JAVASCRIPT"]);

        assert!(f.matches(&posting("JAVA Developer", "Remote")));
        assert!(!f.matches(&posting("JaVaScRiPt Developer", "Remote")));
    }

    #[test]
    fn either_policy_needs_only_one_tier() {
        let config = FilterConfig {
            role_keywords: vec!["java".into()],
            include_keywords: vec!["remote".into()],
            exclude_keywords: vec![],
            combine: CombinePolicy::Either,
        };
        let f = AdmissionFilter::new(&config).unwrap();

        assert!(f.matches(&posting("Java Backend", "Onsite")));
        assert!(f.matches(&posting("Kotlin Backend", "Remote")));
        assert!(!f.matches(&posting("Kotlin Backend", "Onsite")));
    }

    #[test]
    fn java_remote_posting_is_admitted() {
        let f = filter(&["java"], &[], &["javascript"]);
        assert!(f.matches(&posting("Java Backend", "Remote")));
    }
}
