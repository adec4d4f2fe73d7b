//! Natural-language summaries for `/api/chat`.

use std::fmt::Write;

use hr_common::EmployeeRecord;

pub const NO_MATCH_MESSAGE: &str = "I couldn't find any employees matching your specific \
requirements. Please try rephrasing your query or adjusting the criteria.";

const FOLLOW_UP: &str = "Would you like me to provide more details about any of these candidates \
or help you with additional search criteria?";

/// Candidates described in detail before the "and N more" tail.
const DETAILED: usize = 3;

/// `5.0` -> `"5"`, `3.5` -> `"3.5"`.
fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}")
    } else {
        format!("{years:.1}")
    }
}

fn first_n(items: &[String], n: usize) -> String {
    items
        .iter()
        .take(n)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn years_label(years: f64) -> &'static str {
    if years == 1.0 { "year" } else { "years" }
}

/// Builds the assistant reply for a ranked candidate list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn compose(&self, candidates: &[&EmployeeRecord]) -> String {
        let mut out = match candidates {
            [] => return NO_MATCH_MESSAGE.to_string(),
            [single] => Self::single(single),
            many => Self::summary(many),
        };
        out.push_str("\n\n");
        out.push_str(FOLLOW_UP);
        out
    }

    fn single(emp: &EmployeeRecord) -> String {
        let mut out = String::from("I found an excellent candidate for your requirements:\n\n");
        let _ = write!(
            out,
            "**{}** would be a strong fit for this role. With {} {} of experience",
            emp.name,
            format_years(emp.experience_years),
            years_label(emp.experience_years),
        );
        if emp.projects.is_empty() {
            out.push_str(". ");
        } else {
            let _ = write!(
                out,
                ", they have worked on projects like {}. ",
                first_n(&emp.projects, 2)
            );
        }
        if !emp.skills.is_empty() {
            let skills = first_n(&emp.skills, 5);
            let _ = write!(out, "Their key skills include {skills}. ");
        }
        let _ = write!(out, "They are currently {}", emp.availability);
        match emp.location.as_deref() {
            Some(location) => {
                let _ = write!(out, " and based in {location}.");
            }
            None => out.push('.'),
        }
        if !emp.specializations.is_empty() {
            let _ = write!(
                out,
                "\n\nTheir specializations include: {}.",
                emp.specializations.join(", ")
            );
        }
        out
    }

    fn summary(candidates: &[&EmployeeRecord]) -> String {
        let mut out = format!(
            "Based on your requirements, I found {} excellent candidates:\n\n",
            candidates.len()
        );

        for (i, emp) in candidates.iter().take(DETAILED).enumerate() {
            let _ = writeln!(
                out,
                "**{}. {}** ({} {} experience)",
                i + 1,
                emp.name,
                format_years(emp.experience_years),
                years_label(emp.experience_years),
            );
            if !emp.skills.is_empty() {
                let _ = writeln!(out, "   • Skills: {}", first_n(&emp.skills, 4));
            }
            if !emp.projects.is_empty() {
                let _ = writeln!(out, "   • Recent projects: {}", first_n(&emp.projects, 2));
            }
            let _ = write!(out, "   • Status: {}", emp.availability);
            if let Some(location) = emp.location.as_deref() {
                let _ = write!(out, " | Location: {location}");
            }
            out.push('\n');
            if !emp.specializations.is_empty() {
                let _ = writeln!(
                    out,
                    "   • Specializations: {}",
                    first_n(&emp.specializations, 3)
                );
            }
            out.push('\n');
        }

        if candidates.len() > DETAILED {
            let _ = write!(
                out,
                "And {} more candidates available.",
                candidates.len() - DETAILED
            );
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_common::Availability;

    fn employee(id: i64, name: &str) -> EmployeeRecord {
        let mut record =
            EmployeeRecord::new(id, name, &["Python", "AWS"], 5.0, Availability::Available)
                .with_projects(&["Billing", "Search", "Payroll"]);
        record.location = Some("Berlin".into());
        record
    }

    #[test]
    fn empty_list_gets_the_no_match_sentence() {
        assert_eq!(ResponseComposer.compose(&[]), NO_MATCH_MESSAGE);
    }

    #[test]
    fn single_candidate_paragraph() {
        let mut ada = employee(1, "Ada");
        ada.specializations = vec!["Data pipelines".into()];

        let text = ResponseComposer.compose(&[&ada]);

        assert!(text.starts_with("I found an excellent candidate"));
        assert!(text.contains("**Ada**"));
        assert!(text.contains("With 5 years of experience"));
        assert!(text.contains("projects like Billing, Search."));
        assert!(text.contains("currently available and based in Berlin."));
        assert!(text.contains("specializations include: Data pipelines."));
        assert!(text.ends_with(FOLLOW_UP));
    }

    #[test]
    fn summary_details_top_three_and_counts_the_rest() {
        let people: Vec<EmployeeRecord> = (1..=5).map(|i| employee(i, &format!("P{i}"))).collect();
        let refs: Vec<&EmployeeRecord> = people.iter().collect();

        let text = ResponseComposer.compose(&refs);

        assert!(text.starts_with("Based on your requirements, I found 5 excellent candidates"));
        assert!(text.contains("**1. P1** (5 years experience)"));
        assert!(text.contains("**3. P3**"));
        assert!(!text.contains("**4. P4**"));
        assert!(text.contains("And 2 more candidates available."));
        assert!(text.ends_with(FOLLOW_UP));
    }

    #[test]
    fn fractional_years_keep_one_decimal() {
        assert_eq!(format_years(3.5), "3.5");
        assert_eq!(format_years(7.0), "7");
    }
}
