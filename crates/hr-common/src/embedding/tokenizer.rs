use std::collections::HashSet;
use std::sync::LazyLock;

use super::{EncoderConfig, ProfileText};
use crate::skill_normalizer::normalize_skill;

/// Weighted token fed to the hashing encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

/// Words that carry no signal for matching people: English function words plus
/// the staffing boilerplate that shows up in nearly every query.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "but",
        "by", "can", "could", "do", "for", "from", "has", "have", "he", "her", "his", "i", "in",
        "into", "is", "it", "its", "me", "more", "most", "my", "no", "not", "of", "on", "or",
        "our", "she", "should", "so", "some", "than", "that", "the", "their", "them", "there",
        "they", "this", "to", "up", "us", "was", "we", "were", "what", "when", "which", "who",
        "whom", "will", "with", "would", "you", "your",
        // query boilerplate
        "candidate", "candidates", "developer", "developers", "employee", "employees",
        "engineer", "engineers", "experience", "experienced", "find", "least", "looking",
        "need", "needs", "people", "person", "please", "show", "someone", "somebody", "team",
        "year", "years", "yrs", "want", "get", "give", "list",
    ]
    .into_iter()
    .collect()
});

/// Split text into lower-cased word tokens.
///
/// `+`, `#` and inner `.` survive so "c++", "c#" and "node.js" stay whole;
/// trailing dots (sentence ends) are dropped.
pub fn tokenize_words(text: &str) -> Vec<String> {
    split_words(text)
        .into_iter()
        .map(str::to_lowercase)
        .collect()
}

/// Same word boundaries as [`tokenize_words`], original casing kept.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|word| word.trim_end_matches('.'))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Content terms of a text: words minus stopwords, bare numbers and
/// punctuation-only fragments.
pub fn content_terms(text: &str) -> Vec<String> {
    tokenize_words(text)
        .into_iter()
        .filter(|word| word.chars().any(char::is_alphabetic))
        .filter(|word| word.chars().count() >= 2 || matches!(word.as_str(), "c" | "r"))
        .filter(|word| !STOPWORDS.contains(word.as_str()))
        .collect()
}

/// Token scheme shared by profiles and queries:
/// - `skill:<canonical>` for each declared or recognised skill
/// - `dept:<department>` for the department
/// - `term:<word>` for each content term of the free text
pub fn tokenize_profile(text: &ProfileText, config: &EncoderConfig) -> Vec<WeightedToken> {
    let mut tokens = Vec::new();

    for skill in &text.skills {
        let canonical = normalize_skill(skill);
        if !canonical.is_empty() {
            tokens.push(WeightedToken::new(format!("skill:{canonical}"), config.skill_weight));
        }
    }

    if let Some(ref department) = text.department {
        let dept = department.trim().to_lowercase();
        if !dept.is_empty() {
            tokens.push(WeightedToken::new(format!("dept:{dept}"), config.department_weight));
        }
    }

    for fragment in &text.fragments {
        for term in content_terms(fragment) {
            tokens.push(WeightedToken::new(format!("term:{term}"), 1.0));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_language_symbols_and_drops_sentence_dots() {
        assert_eq!(
            tokenize_words("C++, C# and Node.js. Python."),
            vec!["c++", "c#", "and", "node.js", "python"]
        );
    }

    #[test]
    fn split_words_keeps_casing() {
        assert_eq!(
            split_words("Go, ML and k8s."),
            vec!["Go", "ML", "and", "k8s"]
        );
    }

    #[test]
    fn content_terms_drop_boilerplate_and_numbers() {
        assert_eq!(
            content_terms("Find Python developers with 3+ years experience"),
            vec!["python"]
        );
    }

    #[test]
    fn profile_tokens_cover_skills_department_and_terms() {
        let text = ProfileText {
            skills: vec!["JS".into()],
            department: Some("Engineering".into()),
            fragments: vec!["Payments platform".into()],
        };

        let tokens: Vec<_> = tokenize_profile(&text, &EncoderConfig::default())
            .into_iter()
            .map(|t| t.token)
            .collect();

        assert_eq!(
            tokens,
            vec![
                "skill:javascript",
                "dept:engineering",
                "term:payments",
                "term:platform"
            ]
        );
    }
}
