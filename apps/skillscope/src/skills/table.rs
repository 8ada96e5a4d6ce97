use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::extraction::log_parser::{parse_log_dir, LogParseError};
use crate::models::skill::SkillRow;
use crate::skills::normalize::SynonymMap;

/// The canonical skill table: parsed log rows with normalized skill names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillTable {
    rows: Vec<SkillRow>,
}

impl SkillTable {
    /// Normalizes `rows` with `synonyms` and takes ownership of them.
    pub fn new(mut rows: Vec<SkillRow>, synonyms: &SynonymMap) -> Self {
        synonyms.normalize_rows(&mut rows);
        Self { rows }
    }

    /// Parses a log directory and normalizes the result.
    pub fn from_logs(dir: &Path, synonyms: &SynonymMap) -> Result<Self, LogParseError> {
        let parsed = parse_log_dir(dir)?;
        Ok(Self::new(parsed.rows, synonyms))
    }

    pub fn rows(&self) -> &[SkillRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose job title is one of `job_titles` (case-insensitive).
    /// An empty selection means every title.
    pub fn for_job_titles<'a>(&'a self, job_titles: &'a [String]) -> impl Iterator<Item = &'a SkillRow> + 'a {
        self.rows.iter().filter(move |row| {
            job_titles.is_empty()
                || job_titles
                    .iter()
                    .any(|t| t.trim().eq_ignore_ascii_case(row.job_title.trim()))
        })
    }

    /// Distinct canonical skill names for the selection, sorted so the
    /// clustering input does not depend on row order. Degraded rows carry no
    /// name and are left out.
    pub fn distinct_skills(&self, job_titles: &[String]) -> Vec<String> {
        self.for_job_titles(job_titles)
            .filter_map(|row| row.skill_name.clone())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every job title present in the table, sorted.
    pub fn job_titles(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.job_title.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(job_title: &str, skill_name: &str) -> SkillRow {
        SkillRow {
            job_title: job_title.to_string(),
            skill_name: Some(skill_name.to_string()),
            category: None,
            types_of_tools_or_technologies: Some(vec![]),
            evidence: None,
            raw_skill: None,
        }
    }

    fn table() -> SkillTable {
        SkillTable::new(
            vec![
                row("data engineer", "Python Programming"),
                row("data engineer", "SQL"),
                row("data analyst", "Microsoft Excel"),
                row("data analyst", "sql"),
                row("data scientist", "Statistics"),
                SkillRow::degraded("data analyst", "??".to_string()),
            ],
            &SynonymMap::embedded().unwrap(),
        )
    }

    #[test]
    fn test_rows_are_normalized_on_construction() {
        let table = table();
        assert_eq!(table.rows()[0].skill_name.as_deref(), Some("python"));
        assert_eq!(table.rows()[2].skill_name.as_deref(), Some("excel"));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_distinct_skills_for_selection() {
        let table = table();
        let selection = vec!["Data Analyst".to_string(), "data engineer".to_string()];
        assert_eq!(table.distinct_skills(&selection), vec!["excel", "python", "sql"]);
    }

    #[test]
    fn test_empty_selection_means_all_titles() {
        let table = table();
        assert_eq!(
            table.distinct_skills(&[]),
            vec!["excel", "python", "sql", "statistical analysis and modelling"]
        );
        assert_eq!(
            table.job_titles(),
            vec!["data analyst", "data engineer", "data scientist"]
        );
    }

    #[test]
    fn test_unknown_title_selects_nothing() {
        let table = table();
        assert!(table.distinct_skills(&["ml engineer".to_string()]).is_empty());
    }
}
