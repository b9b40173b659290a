//! Submission heuristics.
//!
//! Derives priority, complexity and the required capability set from a
//! request's description and context using plain keyword matching. The
//! heuristics are deliberately shallow: understanding the request is the
//! phases' job, intake only decides which phases run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::phase::Capability;
use crate::status::Priority;

/// Maximum complexity score.
pub const MAX_COMPLEXITY: u8 = 5;

/// Maximum length of a derived title, in characters.
pub const MAX_TITLE_LEN: usize = 80;

// Terms are whole words. A trailing `*` matches any word starting with the
// stem; multi-word terms match consecutive words.
const CRITICAL_TERMS: &[&str] = &[
  "critical",
  "urgent",
  "asap",
  "emergency",
  "outage",
  "production down",
];
const HIGH_TERMS: &[&str] = &["important", "high priority", "blocker", "security fix"];
const LOW_TERMS: &[&str] = &[
  "low priority",
  "minor",
  "nice to have",
  "cosmetic",
  "whenever",
];

const DESIGN_TERMS: &[&str] = &[
  "design",
  "designs",
  "redesign",
  "architect*",
  "schema*",
  "blueprint*",
];
const TESTING_TERMS: &[&str] = &[
  "test",
  "tests",
  "testing",
  "tested",
  "unittest*",
  "coverage",
  "qa",
  "regression*",
];
const SECURITY_TERMS: &[&str] = &[
  "security",
  "secure",
  "vulnerab*",
  "auth",
  "authn",
  "authz",
  "authenticat*",
  "authoriz*",
  "encrypt*",
];
const PERFORMANCE_TERMS: &[&str] = &[
  "performance",
  "optimi*",
  "latency",
  "throughput",
  "scalab*",
];
const DATABASE_TERMS: &[&str] = &["database*"];
const INTEGRATION_TERMS: &[&str] = &["integration*", "api", "apis"];

/// Result of assessing a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
  pub priority: Priority,
  pub complexity: u8,
  pub capabilities: BTreeSet<Capability>,
}

impl Default for Assessment {
  fn default() -> Self {
    Self {
      priority: Priority::Medium,
      complexity: 1,
      capabilities: BTreeSet::from([Capability::Implementation]),
    }
  }
}

/// Assess a submission.
pub fn assess(description: &str, context: &Context) -> Assessment {
  let description = description.to_lowercase();
  let requirements = context.requirements.to_lowercase();
  let desc_words = words(&description);
  let mut all_words = desc_words.clone();
  all_words.extend(words(&requirements));

  Assessment {
    priority: priority(&desc_words),
    complexity: complexity(&all_words, context),
    capabilities: capabilities(&all_words, context),
  }
}

/// Derive a title from the first line or sentence of the description.
pub fn derive_title(description: &str) -> String {
  let first_line = description.trim().lines().next().unwrap_or_default();
  let sentence = match first_line.find(". ") {
    Some(end) => &first_line[..end],
    None => first_line.trim_end_matches('.'),
  };

  if sentence.chars().count() <= MAX_TITLE_LEN {
    return sentence.to_string();
  }
  let truncated: String = sentence.chars().take(MAX_TITLE_LEN - 3).collect();
  format!("{}...", truncated.trim_end())
}

fn words(text: &str) -> Vec<&str> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .collect()
}

fn word_matches(word: &str, pattern: &str) -> bool {
  match pattern.strip_suffix('*') {
    Some(stem) => word.starts_with(stem),
    None => word == pattern,
  }
}

fn mentions(words: &[&str], terms: &[&str]) -> bool {
  terms.iter().any(|term| {
    let parts: Vec<&str> = term.split(' ').collect();
    words
      .windows(parts.len())
      .any(|window| window.iter().zip(&parts).all(|(w, p)| word_matches(w, p)))
  })
}

fn priority(description: &[&str]) -> Priority {
  if mentions(description, CRITICAL_TERMS) {
    Priority::Critical
  } else if mentions(description, HIGH_TERMS) {
    Priority::High
  } else if mentions(description, LOW_TERMS) {
    Priority::Low
  } else {
    Priority::Medium
  }
}

fn complexity(words: &[&str], context: &Context) -> u8 {
  let mut score = 1u8;
  if context.affected_files.len() > 5 {
    score += 1;
  }
  if mentions(words, DATABASE_TERMS) {
    score += 1;
  }
  if !context.security_requirements.is_empty() {
    score += 1;
  }
  if mentions(words, INTEGRATION_TERMS) {
    score += 1;
  }
  score.min(MAX_COMPLEXITY)
}

fn capabilities(words: &[&str], context: &Context) -> BTreeSet<Capability> {
  let mut caps = BTreeSet::from([Capability::Implementation]);

  if mentions(words, DESIGN_TERMS) {
    caps.insert(Capability::Design);
  }
  if mentions(words, TESTING_TERMS) {
    caps.insert(Capability::Testing);
  }
  if mentions(words, SECURITY_TERMS) || !context.security_requirements.is_empty() {
    caps.insert(Capability::Security);
  }
  if mentions(words, PERFORMANCE_TERMS) || !context.performance_requirements.is_empty() {
    caps.insert(Capability::Performance);
  }

  caps
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::{PerformanceRequirement, SecurityRequirement};

  #[test]
  fn design_an_api_requires_design() {
    let assessment = assess("Design an API for user profiles", &Context::default());
    assert!(assessment.capabilities.contains(&Capability::Design));
    assert!(assessment.capabilities.contains(&Capability::Implementation));
    assert!(!assessment.capabilities.contains(&Capability::Security));
    assert_eq!(assessment.complexity, 2);
  }

  #[test]
  fn plain_request_is_simple() {
    let assessment = assess("Rename the helper function", &Context::default());
    assert_eq!(assessment.complexity, 1);
    assert_eq!(
      assessment.capabilities,
      BTreeSet::from([Capability::Implementation])
    );
    assert_eq!(assessment.priority, Priority::Medium);
  }

  #[test]
  fn complexity_accumulates_and_caps() {
    let ctx = Context::default()
      .with_files((0..8).map(|i| format!("src/m{}.rs", i)))
      .with_security(SecurityRequirement {
        kind: "authentication".into(),
        level: Default::default(),
        description: String::new(),
      });
    let assessment = assess(
      "Add database integration behind the public api",
      &ctx,
    );
    assert_eq!(assessment.complexity, MAX_COMPLEXITY);
    assert!(assessment.capabilities.contains(&Capability::Security));
  }

  #[test]
  fn five_files_do_not_count_as_many() {
    let ctx = Context::default().with_files((0..5).map(|i| format!("f{}", i)));
    assert_eq!(assess("tidy things", &ctx).complexity, 1);
  }

  #[test]
  fn requirements_text_feeds_heuristics() {
    let ctx = Context::default().with_requirements("must stay under 10ms latency; add tests");
    let assessment = assess("update cache", &ctx);
    assert!(assessment.capabilities.contains(&Capability::Performance));
    assert!(assessment.capabilities.contains(&Capability::Testing));
  }

  #[test]
  fn performance_requirement_implies_capability() {
    let ctx = Context::default().with_performance(PerformanceRequirement {
      metric: "p99".into(),
      target: 50.0,
      unit: "ms".into(),
    });
    assert!(
      assess("update cache", &ctx)
        .capabilities
        .contains(&Capability::Performance)
    );
  }

  #[test]
  fn priority_keywords() {
    let ctx = Context::default();
    assert_eq!(assess("URGENT: fix checkout", &ctx).priority, Priority::Critical);
    assert_eq!(assess("Important cleanup", &ctx).priority, Priority::High);
    assert_eq!(assess("minor copy change", &ctx).priority, Priority::Low);
  }

  #[test]
  fn word_fragments_do_not_trigger_capabilities() {
    let ctx = Context::default();
    let caps = |text: &str| assess(text, &ctx).capabilities;
    let plain = BTreeSet::from([Capability::Implementation]);

    assert_eq!(caps("Update the designated owner field"), plain);
    assert_eq!(caps("Show the author name"), plain);
    assert_eq!(caps("Bump to the latest release"), plain);
    assert_eq!(caps("Format the attestation date"), plain);
    assert_eq!(assess("rapid fix for the capital letters", &ctx).complexity, 1);
  }

  #[test]
  fn stems_match_word_starts() {
    let ctx = Context::default();
    let assessment = assess("Optimize the architecture and fix vulnerabilities", &ctx);
    assert!(assessment.capabilities.contains(&Capability::Performance));
    assert!(assessment.capabilities.contains(&Capability::Design));
    assert!(assessment.capabilities.contains(&Capability::Security));
    assert_eq!(assess("migrate databases", &ctx).complexity, 2);
  }

  #[test]
  fn multi_word_terms_need_adjacent_words() {
    let ctx = Context::default();
    assert_eq!(assess("production is down", &ctx).priority, Priority::Medium);
    assert_eq!(assess("Production down again", &ctx).priority, Priority::Critical);
  }

  #[test]
  fn title_uses_first_sentence() {
    assert_eq!(
      derive_title("Add a login page. It should use OAuth."),
      "Add a login page"
    );
    assert_eq!(derive_title("  Fix typo.\nmore text"), "Fix typo");
  }

  #[test]
  fn long_titles_are_truncated() {
    let title = derive_title(&"x".repeat(200));
    assert_eq!(title.chars().count(), MAX_TITLE_LEN);
    assert!(title.ends_with("..."));
  }
}
