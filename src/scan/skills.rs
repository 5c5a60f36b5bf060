use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Every job-description token is required exactly once.
const JOB_COUNT: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRow {
    pub skill: String,
    pub resume_count: i64,
    pub job_count: i64,
    pub gap: i64,
    pub matched: bool,
}

/// Keyword-overlap fallback used when the agent omits `skills_analysis`.
///
/// One row per whitespace token of the job description, duplicates included,
/// counting case-insensitive occurrences of that token in the résumé.
pub fn skills_analysis(job_description: &str, resume_content: &str) -> Vec<SkillRow> {
    let mut resume_counts: HashMap<String, i64> = HashMap::new();
    for token in resume_content.split_whitespace() {
        *resume_counts.entry(token.to_lowercase()).or_default() += 1;
    }

    job_description
        .split_whitespace()
        .map(|token| {
            let resume_count = resume_counts
                .get(&token.to_lowercase())
                .copied()
                .unwrap_or(0);
            SkillRow {
                skill: token.to_string(),
                resume_count,
                job_count: JOB_COUNT,
                gap: JOB_COUNT - resume_count,
                matched: resume_count >= JOB_COUNT,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(skill: &str, resume_count: i64) -> SkillRow {
        SkillRow {
            skill: skill.into(),
            resume_count,
            job_count: 1,
            gap: 1 - resume_count,
            matched: resume_count >= 1,
        }
    }

    #[test]
    fn python_and_sql_example() {
        let rows = skills_analysis("Need Python and SQL skills", "I know Python well");
        assert_eq!(
            rows,
            vec![row("Need", 0), row("Python", 1), row("and", 0), row("SQL", 0), row("skills", 0)]
        );
        assert_eq!(rows[3].gap, 1);
        assert!(!rows[3].matched);
    }

    #[test]
    fn case_insensitive_with_repeats_and_duplicates() {
        let rows = skills_analysis("rust Rust", "RUST rust Go");
        assert_eq!(rows, vec![row("rust", 2), row("Rust", 2)]);
        assert_eq!(rows[0].gap, -1);
    }

    #[test]
    fn punctuation_stays_part_of_token() {
        let rows = skills_analysis("SQL,", "SQL");
        assert_eq!(rows, vec![row("SQL,", 0)]);
    }

    #[test]
    fn empty_inputs() {
        assert!(skills_analysis("", "anything").is_empty());
        assert!(skills_analysis("   \n\t ", "anything").is_empty());
        assert_eq!(skills_analysis("Go", ""), vec![row("Go", 0)]);
    }

    #[test]
    fn deterministic() {
        let jd = "Kubernetes Docker\nTerraform  AWS aws";
        let cv = "aws AWS docker";
        assert_eq!(skills_analysis(jd, cv), skills_analysis(jd, cv));
    }
}
