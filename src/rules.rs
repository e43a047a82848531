/// Grouping rules: the ordered pattern list and the URL matcher
use crate::tab_data::GroupColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key for the rule list in the durable synced store.
pub const GROUPING_PATTERNS_KEY: &str = "groupingPatterns";

/// A single grouping rule. Order in the list is match priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub pattern: String,
    pub group_title: String,
    #[serde(default)]
    pub color: GroupColor,
}

impl Rule {
    pub fn new(pattern: &str, group_title: &str, color: GroupColor) -> Rule {
        Rule {
            pattern: pattern.to_string(),
            group_title: group_title.to_string(),
            color,
        }
    }
}

/// Built-in rules seeded on first run, before the user has configured anything.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("github.com", "GitHub", GroupColor::Blue),
        Rule::new("jira", "Jira Project", GroupColor::Red),
        Rule::new("docs.google.com", "Google Docs", GroupColor::Green),
        Rule::new("figma.com", "Figma Designs", GroupColor::Purple),
    ]
}

/// First rule whose pattern is a case-insensitive substring of the URL.
pub fn find_matching_rule<'a>(rules: &'a [Rule], url: &str) -> Option<&'a Rule> {
    let url = url.to_lowercase();
    rules
        .iter()
        .find(|rule| url.contains(&rule.pattern.to_lowercase()))
}

/// Owns the in-memory rule list for the background coordinator. The list is
/// only ever swapped wholesale, so readers never observe a partial update.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    pub fn new() -> RuleStore {
        RuleStore { rules: Vec::new() }
    }

    pub fn current(&self) -> &[Rule] {
        &self.rules
    }

    /// Replace the whole list (startup load or external change notification).
    /// Externally-supplied rules are trusted as-is.
    pub fn replace(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    pub fn find_match(&self, url: &str) -> Option<&Rule> {
        find_matching_rule(&self.rules, url)
    }
}

/// Why a new rule was rejected by the options form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Pattern and Title cannot be empty.")]
    EmptyField,
    #[error("Pattern cannot be just \"*\".")]
    WildcardPattern,
    #[error("This pattern already exists.")]
    DuplicatePattern,
}

/// Validation applied on the options page before a rule is added.
/// Background-side loads skip this entirely and trust the stored list.
pub fn validate_new_rule(existing: &[Rule], pattern: &str, title: &str) -> Result<(), RuleError> {
    if pattern.is_empty() || title.is_empty() {
        return Err(RuleError::EmptyField);
    }
    if pattern == "*" {
        return Err(RuleError::WildcardPattern);
    }
    let lowered = pattern.to_lowercase();
    if existing.iter().any(|r| r.pattern.to_lowercase() == lowered) {
        return Err(RuleError::DuplicatePattern);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            Rule::new("docs.google.com", "Google Docs", GroupColor::Green),
            Rule::new("google.com", "Google", GroupColor::Yellow),
        ];

        let hit = find_matching_rule(&rules, "https://docs.google.com/document/d/1").unwrap();
        assert_eq!(hit.group_title, "Google Docs");

        // A URL matching only the broader pattern falls through to it.
        let hit = find_matching_rule(&rules, "https://mail.google.com").unwrap();
        assert_eq!(hit.group_title, "Google");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let rules = vec![Rule::new("GitHub.COM", "GitHub", GroupColor::Blue)];
        assert!(find_matching_rule(&rules, "https://GITHUB.com/rust-lang").is_some());
        assert!(find_matching_rule(&rules, "https://github.com/yewstack").is_some());
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = default_rules();
        assert!(find_matching_rule(&rules, "https://example.org").is_none());
        assert!(find_matching_rule(&[], "https://github.com").is_none());
    }

    #[test]
    fn test_pattern_matches_anywhere_in_url() {
        let rules = vec![Rule::new("jira", "Jira Project", GroupColor::Red)];
        let hit = find_matching_rule(&rules, "https://mycompany.atlassian.net/jira/browse/X-1");
        assert!(hit.is_some());
    }

    #[test]
    fn test_default_rules_seed() {
        let rules = default_rules();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].pattern, "github.com");
        assert_eq!(rules[0].color, GroupColor::Blue);
        assert_eq!(rules[3].group_title, "Figma Designs");
    }

    #[test]
    fn test_rule_store_replace_is_wholesale() {
        let mut store = RuleStore::new();
        store.replace(default_rules());
        assert_eq!(store.current().len(), 4);

        store.replace(vec![Rule::new("rust-lang.org", "Rust", GroupColor::Orange)]);
        assert_eq!(store.current().len(), 1);
        assert_eq!(store.find_match("https://rust-lang.org").unwrap().group_title, "Rust");
        assert!(store.find_match("https://github.com").is_none());
    }

    #[test]
    fn test_rule_wire_format() {
        let json = r#"{"pattern": "github.com", "groupTitle": "GitHub", "color": "blue"}"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.group_title, "GitHub");
        assert_eq!(rule.color, GroupColor::Blue);

        let back = serde_json::to_string(&rule).unwrap();
        assert!(back.contains("\"groupTitle\":\"GitHub\""));
    }

    #[test]
    fn test_validate_new_rule() {
        let existing = vec![Rule::new("github.com", "GitHub", GroupColor::Blue)];

        assert_eq!(validate_new_rule(&existing, "", "x"), Err(RuleError::EmptyField));
        assert_eq!(validate_new_rule(&existing, "x", ""), Err(RuleError::EmptyField));
        assert_eq!(validate_new_rule(&existing, "*", "All"), Err(RuleError::WildcardPattern));
        assert_eq!(
            validate_new_rule(&existing, "GITHUB.com", "Code"),
            Err(RuleError::DuplicatePattern)
        );
        assert_eq!(validate_new_rule(&existing, "figma.com", "Figma"), Ok(()));
    }
}
