//! Independent, pure pattern matchers over query text.
//!
//! Each matcher contributes at most one constraint field and returns `None`
//! when nothing (or something ambiguous) is found.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    Availability,
    embedding::tokenizer::{split_words, tokenize_words},
    skill_normalizer::surface_forms,
};

const NUMBER: &str = r"(\d+(?:\.\d+)?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty)";
const YEARS: &str = r"(?:years?|yrs?)";

static BETWEEN_RANGE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\bbetween\s+{NUMBER}\s*(?:-|to|and)\s*{NUMBER}\s*\+?\s*{YEARS}\b");
    Regex::new(&pattern).expect("between-range pattern compiles")
});

static RANGE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b{NUMBER}\s*(?:-|to)\s*{NUMBER}\s*\+?\s*{YEARS}\b");
    Regex::new(&pattern).expect("range pattern compiles")
});

static NO_LESS_THAN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:no|not)\s+less\s+than\s+{NUMBER}\s*{YEARS}\b");
    Regex::new(&pattern).expect("no-less-than pattern compiles")
});

static NO_MORE_THAN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:no|not)\s+more\s+than\s+{NUMBER}\s*{YEARS}\b");
    Regex::new(&pattern).expect("no-more-than pattern compiles")
});

const MIN_LEAD: &str =
    r"(?:at\s+least|minimum(?:\s+of)?|min(?:\s+of)?|more\s+than|over|above|upwards\s+of)";

/// Phrases that only ever mean a lower bound. A bare "N+" needs a years word
/// after it, so headcounts ("2+ developers") and versions ("Python 3+") stay out.
static EXPLICIT_MIN: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"\b{MIN_LEAD}\s+{NUMBER}\s*\+?\s*{YEARS}\b"),
        format!(r"\b{NUMBER}\s*\+\s*(?:{YEARS}|experience|exp)\b"),
        format!(r"\b{NUMBER}\s*{YEARS}\s+(?:or\s+more|or\s+above|plus)\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("min experience pattern compiles"))
    .collect()
});

/// Bare "5 years of experience" / "with 5 years": read as a minimum, but only
/// once bounded phrases have been masked out.
static BARE_MIN: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"\b{NUMBER}\s*{YEARS}(?:\s+of)?\s+(?:experience|exp)\b"),
        format!(r"\bwith\s+{NUMBER}\s*{YEARS}\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("bare experience pattern compiles"))
    .collect()
});

const MAX_LEAD: &str =
    r"(?:at\s+most|up\s+to|less\s+than|fewer\s+than|under|below|maximum(?:\s+of)?|max(?:\s+of)?)";

/// Upper-bound phrases. "under 3 years" and "less than 3 years" are read as an
/// inclusive maximum, the same as "up to 3 years".
static MAX_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"\b{MAX_LEAD}\s+{NUMBER}\s*{YEARS}\b"),
        format!(r"\b{NUMBER}\s*{YEARS}\s+(?:or\s+less|or\s+fewer|max(?:imum)?)\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("max experience pattern compiles"))
    .collect()
});

static NEGATED_AVAILABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:not|isn't|aren't)\s+(?:available|free)|unavailable)\b")
        .expect("negation pattern compiles")
});
static FEEL_FREE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfeel\s+free\b").expect("feel-free pattern compiles"));
static ON_LEAVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bon\s+leave\b").expect("on-leave pattern compiles"));
static BUSY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:busy|fully\s+booked|occupied)\b").expect("busy pattern compiles")
});
static AVAILABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:available|on\s+the\s+bench|free)\b").expect("available pattern compiles")
});

/// Skill aliases that are also everyday words. In free text they only count
/// when written with a capital letter ("Go", "ML").
const WORD_LIKE_ALIASES: &[&str] = &["go", "node", "ml", "dl", "ts"];

/// Lower-case and unify dash variants so patterns stay simple.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase().replace(['–', '—', '‐'], "-")
}

fn parse_number(raw: &str) -> Option<f64> {
    let word = match raw {
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" => 12.0,
        "thirteen" => 13.0,
        "fourteen" => 14.0,
        "fifteen" => 15.0,
        "sixteen" => 16.0,
        "seventeen" => 17.0,
        "eighteen" => 18.0,
        "nineteen" => 19.0,
        "twenty" => 20.0,
        digits => return digits.parse().ok().filter(|n: &f64| n.is_finite()),
    };
    Some(word)
}

fn range_bounds(text: &str) -> Option<(f64, f64)> {
    let caps = [&*BETWEEN_RANGE, &*RANGE]
        .into_iter()
        .find_map(|pattern| pattern.captures(text))?;
    let lo = parse_number(caps.get(1)?.as_str())?;
    let hi = parse_number(caps.get(2)?.as_str())?;
    Some(if lo <= hi { (lo, hi) } else { (hi, lo) })
}

/// Blank out every match of `patterns` so a later matcher can't re-read them.
fn mask<'a>(text: &str, patterns: impl IntoIterator<Item = &'a Regex>) -> String {
    let mut masked = text.to_string();
    for pattern in patterns {
        masked = pattern
            .replace_all(&masked, |caps: &Captures<'_>| " ".repeat(caps[0].len()))
            .into_owned();
    }
    masked
}

fn first_number<'a>(text: &str, patterns: impl IntoIterator<Item = &'a Regex>) -> Option<f64> {
    patterns.into_iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_number(m.as_str()))
    })
}

/// "3+ years", "at least 3 years", "3-5 years", "5 years of experience" → 3 / 3 / 3 / 5.
pub fn match_min_experience(text: &str) -> Option<f64> {
    let text = normalize_text(text);
    if let Some((lo, _)) = range_bounds(&text) {
        return Some(lo);
    }
    if let Some(n) = first_number(&text, [&*NO_LESS_THAN]) {
        return Some(n);
    }
    let upper_bounds = std::iter::once(&*NO_MORE_THAN).chain(MAX_PHRASES.iter());
    let masked = mask(&text, upper_bounds);
    first_number(&masked, EXPLICIT_MIN.iter().chain(BARE_MIN.iter()))
}

/// "no more than 5 years", "up to 5 years", "3 to 5 years" → 5.
pub fn match_max_experience(text: &str) -> Option<f64> {
    let text = normalize_text(text);
    if let Some((_, hi)) = range_bounds(&text) {
        return Some(hi);
    }
    if let Some(n) = first_number(&text, [&*NO_MORE_THAN]) {
        return Some(n);
    }
    let lower_bounds = std::iter::once(&*NO_LESS_THAN).chain(EXPLICIT_MIN.iter());
    let masked = mask(&text, lower_bounds);
    first_number(&masked, MAX_PHRASES.iter())
}

/// Availability keywords. Negations and conflicting statuses yield `None`.
pub fn match_availability(text: &str) -> Option<Availability> {
    let text = normalize_text(text);
    if NEGATED_AVAILABLE.is_match(&text) {
        return None;
    }
    let text = mask(&text, [&*FEEL_FREE]);

    let found: HashSet<Availability> = [
        (ON_LEAVE.is_match(&text), Availability::OnLeave),
        (BUSY.is_match(&text), Availability::Busy),
        (AVAILABLE.is_match(&text), Availability::Available),
    ]
    .into_iter()
    .filter_map(|(hit, status)| hit.then_some(status))
    .collect();

    if found.len() == 1 {
        found.into_iter().next()
    } else {
        None
    }
}

/// Token-joined form with sentinel spaces, for whole-phrase containment.
fn phrase_key(text: &str) -> String {
    format!(" {} ", tokenize_words(text).join(" "))
}

fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let needle = phrase_key(phrase);
    !needle.trim().is_empty() && haystack.contains(&needle)
}

/// Skills from `vocabulary` (canonical names) mentioned in the text, by
/// canonical name or any known alias. Matching is on whole tokens, so "java"
/// is not found inside "javascript". Longer phrases claim their tokens first:
/// "sql server" leaves nothing behind for "sql".
pub fn match_skills(text: &str, vocabulary: &BTreeSet<String>) -> Vec<String> {
    let words = split_words(text);
    let lowered: Vec<String> = words.iter().map(|word| word.to_lowercase()).collect();

    let mut phrases: Vec<(Vec<String>, &String)> = vocabulary
        .iter()
        .flat_map(|canonical| {
            surface_forms(canonical)
                .into_iter()
                .map(move |form| (tokenize_words(&form), canonical))
        })
        .filter(|(tokens, _)| !tokens.is_empty())
        .collect();
    phrases.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

    let mut claimed = vec![false; lowered.len()];
    let mut found = BTreeSet::new();
    for (phrase, canonical) in phrases {
        let word_like = phrase.len() == 1 && WORD_LIKE_ALIASES.contains(&phrase[0].as_str());
        for start in 0..(lowered.len() + 1).saturating_sub(phrase.len()) {
            let span = start..start + phrase.len();
            let unclaimed = claimed[span.clone()].iter().all(|taken| !*taken);
            if !unclaimed || lowered[span.clone()] != phrase[..] {
                continue;
            }
            if word_like && !words[start].chars().any(char::is_uppercase) {
                continue;
            }
            claimed[span].fill(true);
            found.insert(canonical.clone());
        }
    }
    found.into_iter().collect()
}

/// Department named in the text. More than one distinct hit is ambiguous.
pub fn match_department(text: &str, departments: &[String]) -> Option<String> {
    let haystack = phrase_key(text);
    let mut hits = departments
        .iter()
        .filter(|dept| contains_phrase(&haystack, dept));

    let first = hits.next()?;
    if hits.next().is_some() {
        return None;
    }
    Some(first.clone())
}
