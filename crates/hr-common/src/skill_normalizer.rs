use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;

/// Known aliases grouped under their canonical skill name.
const SKILL_ALIASES: &[(&str, &[&str])] = &[
    // JavaScript ecosystem
    (
        "javascript",
        &["js", "javascript", "java script", "ecmascript", "es6"],
    ),
    ("typescript", &["ts", "typescript", "type script"]),
    ("nodejs", &["node.js", "node js", "nodejs", "node"]),
    ("express", &["express.js", "expressjs", "express"]),
    ("react", &["reactjs", "react.js", "react js", "react"]),
    ("react native", &["react native", "react-native", "reactnative"]),
    ("vue", &["vue.js", "vuejs", "vue js", "vue"]),
    ("angular", &["angularjs", "angular.js", "angular"]),
    ("nextjs", &["next.js", "nextjs", "next js"]),
    ("html", &["html", "html5"]),
    ("css", &["css", "css3"]),
    // Backend frameworks
    ("spring", &["spring boot", "springboot", "spring"]),
    ("django", &["django rest framework", "drf", "django"]),
    ("flask", &["flask"]),
    ("fastapi", &["fast api", "fastapi"]),
    // Databases
    ("postgresql", &["postgres", "postgresql", "postgre sql"]),
    ("mysql", &["my sql", "mysql", "mariadb"]),
    ("mongodb", &["mongo", "mongo db", "mongodb"]),
    ("redis", &["redis"]),
    ("sql", &["sql"]),
    ("elasticsearch", &["elastic search", "elasticsearch"]),
    // Cloud platforms
    ("aws", &["amazon web services", "aws"]),
    ("gcp", &["google cloud platform", "google cloud", "gcp"]),
    ("azure", &["microsoft azure", "azure"]),
    // Programming languages
    ("python", &["python3", "python 3", "python"]),
    ("java", &["java"]),
    ("csharp", &["c#", "c sharp", "csharp", ".net", "dotnet"]),
    ("cplusplus", &["c++", "cpp", "c plus plus"]),
    ("golang", &["go", "golang", "go lang"]),
    ("rust", &["rust lang", "rust"]),
    ("php", &["php"]),
    ("ruby", &["ruby"]),
    ("swift", &["swift"]),
    ("kotlin", &["kotlin"]),
    // DevOps and tools
    ("docker", &["docker"]),
    ("kubernetes", &["k8s", "kubernetes"]),
    ("terraform", &["terraform"]),
    ("jenkins", &["jenkins"]),
    ("git", &["git", "github", "gitlab"]),
    // Data and ML
    (
        "machine learning",
        &["machine learning", "ml", "machine-learning"],
    ),
    ("deep learning", &["deep learning", "dl"]),
    ("data science", &["data science"]),
    ("tensorflow", &["tensor flow", "tensorflow"]),
    ("pytorch", &["torch", "py torch", "pytorch"]),
    ("scikit-learn", &["scikit-learn", "scikit learn", "sklearn"]),
    ("pandas", &["pandas"]),
    ("numpy", &["numpy"]),
    ("spark", &["apache spark", "spark"]),
    ("kafka", &["apache kafka", "kafka"]),
    // Mobile
    ("flutter", &["flutter"]),
];

/// Alias → canonical lookup (O(1)).
static ALIAS_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, alias_list) in SKILL_ALIASES {
        map.insert(*canonical, *canonical);
        for alias in *alias_list {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Same lookup keyed by the separator-free form, so "Node JS" and "node.js" meet.
static COMPACT_ALIAS_TO_CANONICAL: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (alias, canonical) in ALIAS_TO_CANONICAL.iter() {
        map.entry(compact_key(alias)).or_insert(*canonical);
    }
    map
});

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

fn compact_key(input: &str) -> String {
    input
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/' | ','))
        .collect()
}

/// Map a skill string to its canonical form. Unknown skills are lower-cased
/// and whitespace-collapsed but otherwise kept as-is, so "Java" and
/// "JavaScript" never collapse into one another.
pub fn normalize_skill(skill: &str) -> String {
    let normalized = nfkc_lower_trim(skill)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if normalized.is_empty() {
        return normalized;
    }

    if let Some(canonical) = ALIAS_TO_CANONICAL.get(normalized.as_str()) {
        return (*canonical).to_string();
    }

    let compact = compact_key(&normalized);
    if !compact.is_empty() {
        if let Some(canonical) = COMPACT_ALIAS_TO_CANONICAL.get(&compact) {
            return (*canonical).to_string();
        }
    }

    normalized
}

/// Normalise a skill list into a set, dropping blanks.
pub fn normalize_skill_set(skills: &[String]) -> HashSet<String> {
    skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| normalize_skill(s))
        .collect()
}

/// Normalised, sorted and de-duplicated skill list.
pub fn normalize_skills_vec(skills: &[String]) -> Vec<String> {
    let mut result: Vec<String> = skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect();
    result.sort();
    result.dedup();
    result
}

/// Surface forms that should be recognised in free text for a canonical skill:
/// the canonical name itself plus every known alias.
pub fn surface_forms(canonical: &str) -> BTreeSet<String> {
    let mut forms = BTreeSet::new();
    forms.insert(canonical.to_string());
    for (alias, target) in ALIAS_TO_CANONICAL.iter() {
        if *target == canonical {
            forms.insert((*alias).to_string());
        }
    }
    forms
}
