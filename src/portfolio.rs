//! Portfolio links matched against a job's skills.
//!
//! The drafting pipeline only needs [`PortfolioMatcher`]; [`Portfolio`] is a
//! small in-memory matcher that scores entries by how many of their tags
//! appear in the skill list.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::ChainError;

/// A portfolio URL tagged with the skills it demonstrates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortfolioLink {
    #[serde(rename = "tags")]
    pub skill_tags: BTreeSet<String>,
    pub url: String,
}

/// Maps a skill list to relevant portfolio links.
pub trait PortfolioMatcher {
    fn find_links(&self, skills: &[String]) -> Vec<PortfolioLink>;
}

#[derive(Debug, Deserialize)]
struct PortfolioFile {
    #[serde(default = "default_results_per_query")]
    results_per_query: usize,
    #[serde(default, rename = "entry")]
    entries: Vec<PortfolioLink>,
}

fn default_results_per_query() -> usize {
    2
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    entries: Vec<PortfolioLink>,
    results_per_query: usize,
}

impl Portfolio {
    pub fn new(entries: Vec<PortfolioLink>) -> Self {
        Self {
            entries,
            results_per_query: default_results_per_query(),
        }
    }

    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = n;
        self
    }

    /// Parses a TOML document of `[[entry]]` tables:
    ///
    /// ```toml
    /// results_per_query = 2
    ///
    /// [[entry]]
    /// tags = ["React", "Node.js"]
    /// url = "https://example.com/react-portfolio"
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ChainError> {
        let file: PortfolioFile = toml::from_str(s)?;
        Ok(Self {
            entries: file.entries,
            results_per_query: file.results_per_query,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ChainError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PortfolioMatcher for Portfolio {
    fn find_links(&self, skills: &[String]) -> Vec<PortfolioLink> {
        let wanted: HashSet<String> = skills.iter().map(|s| normalize(s)).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &PortfolioLink)> = self
            .entries
            .iter()
            .map(|e| {
                let hits = e
                    .skill_tags
                    .iter()
                    .filter(|t| wanted.contains(&normalize(t)))
                    .count();
                (hits, e)
            })
            .filter(|(hits, _)| *hits > 0)
            .collect();

        // Stable: equal scores keep file order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(self.results_per_query)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn link(tags: &[&str], url: &str) -> PortfolioLink {
        PortfolioLink {
            skill_tags: tags.iter().map(|t| t.to_string()).collect(),
            url: url.to_string(),
        }
    }

    fn skills(s: &[&str]) -> Vec<String> {
        s.iter().map(|x| x.to_string()).collect()
    }

    fn sample() -> Portfolio {
        Portfolio::new(vec![
            link(&["React", "Node.js"], "https://p.example/react"),
            link(&["Python", "Django", "PostgreSQL"], "https://p.example/django"),
            link(&["Python", "Machine Learning"], "https://p.example/ml"),
            link(&["Rust"], "https://p.example/rust"),
        ])
    }

    #[test]
    fn best_overlap_first() {
        let found = sample().find_links(&skills(&["python", "postgresql", "AWS"]));
        let urls: Vec<_> = found.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://p.example/django", "https://p.example/ml"]);
    }

    #[test]
    fn ties_keep_insertion_order_and_respect_limit() {
        let found = sample()
            .with_results_per_query(1)
            .find_links(&skills(&["Python"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://p.example/django");
    }

    #[test]
    fn no_overlap_no_links() {
        assert!(sample().find_links(&skills(&["COBOL"])).is_empty());
        assert!(sample().find_links(&[]).is_empty());
    }

    #[test]
    fn loads_from_toml_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"
results_per_query = 3

[[entry]]
tags = ["Rust", "Tokio"]
url = "https://p.example/rust"

[[entry]]
tags = ["Go"]
url = "https://p.example/go"
"#
        )
        .unwrap();

        let p = Portfolio::load(f.path()).unwrap();
        assert_eq!(p.len(), 2);
        let found = p.find_links(&skills(&["tokio"]));
        assert_eq!(found[0].url, "https://p.example/rust");
        assert!(found[0].skill_tags.contains("Tokio"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = Portfolio::from_toml_str("[[entry]]\nurl = 5").unwrap_err();
        assert!(matches!(err, ChainError::Toml(_)));
    }
}
