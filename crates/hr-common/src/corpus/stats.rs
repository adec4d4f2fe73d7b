use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Availability, EmployeeRecord};

const TOP_SKILLS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// Corpus-wide summary numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_employees: usize,
    pub available_employees: usize,
    /// Mean experience rounded to one decimal; 0.0 for an empty corpus.
    pub average_experience: f64,
    /// Most frequent skills (count desc, then name asc).
    pub top_skills: Vec<SkillCount>,
    pub department_distribution: BTreeMap<String, usize>,
}

impl CorpusStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EmployeeRecord>) -> Self {
        let mut total = 0usize;
        let mut available = 0usize;
        let mut experience_sum = 0.0f64;
        let mut skill_counts: HashMap<&str, usize> = HashMap::new();
        let mut department_distribution = BTreeMap::new();

        for record in records {
            total += 1;
            if record.availability == Availability::Available {
                available += 1;
            }
            experience_sum += record.experience_years;
            for skill in &record.skills {
                *skill_counts.entry(skill.as_str()).or_insert(0) += 1;
            }
            if let Some(ref dept) = record.department {
                *department_distribution.entry(dept.clone()).or_insert(0) += 1;
            }
        }

        let average_experience = if total == 0 {
            0.0
        } else {
            ((experience_sum / total as f64) * 10.0).round() / 10.0
        };

        let mut top_skills: Vec<SkillCount> = skill_counts
            .into_iter()
            .map(|(skill, count)| SkillCount {
                skill: skill.to_string(),
                count,
            })
            .collect();
        top_skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
        top_skills.truncate(TOP_SKILLS_LIMIT);

        Self {
            total_employees: total,
            available_employees: available,
            average_experience,
            top_skills,
            department_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, count: usize) -> SkillCount {
        SkillCount {
            skill: name.to_string(),
            count,
        }
    }

    #[test]
    fn summarises_records() {
        let records = vec![
            EmployeeRecord::new(1, "Ada", &["Python", "AWS"], 5.0, Availability::Available)
                .with_department("Engineering"),
            EmployeeRecord::new(2, "Bob", &["Java", "AWS"], 2.0, Availability::Busy)
                .with_department("Engineering"),
            EmployeeRecord::new(3, "Cleo", &["Python"], 1.5, Availability::Available)
                .with_department("Data"),
        ];

        let stats = CorpusStats::from_records(&records);

        assert_eq!(stats.total_employees, 3);
        assert_eq!(stats.available_employees, 2);
        assert_eq!(stats.average_experience, 2.8);
        assert_eq!(
            stats.top_skills,
            vec![skill("AWS", 2), skill("Python", 2), skill("Java", 1)]
        );
        assert_eq!(stats.department_distribution.get("Engineering"), Some(&2));
        assert_eq!(stats.department_distribution.get("Data"), Some(&1));
    }

    #[test]
    fn empty_corpus_has_zero_average() {
        let stats = CorpusStats::from_records(&[]);
        assert_eq!(stats.total_employees, 0);
        assert_eq!(stats.average_experience, 0.0);
        assert!(stats.top_skills.is_empty());
    }
}
