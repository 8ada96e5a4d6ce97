//! Skill Normalizer — collapses spelling and language variants to canonical names.
//!
//! The synonym table is data, not code: `data/skill_synonyms.json` is embedded
//! at build time and can be replaced at runtime via `SKILL_SYNONYMS_PATH`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::skill::SkillRow;

const EMBEDDED_SYNONYMS: &str = include_str!("../../data/skill_synonyms.json");

#[derive(Debug, Error)]
pub enum SynonymMapError {
    #[error("failed to read synonym table {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid synonym table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("synonym chain: '{from}' -> '{via}' -> '{to}'")]
    Chain { from: String, via: String, to: String },

    #[error("empty skill name in synonym table")]
    EmptyName,

    #[error("'{0}' is listed twice with different targets")]
    Conflict(String),
}

/// Immutable raw-name -> canonical-name table.
///
/// Every key and target is lowercased and trimmed on load, and no target is
/// itself a key that maps elsewhere, so `canonicalize` is idempotent.
#[derive(Debug, Clone)]
pub struct SynonymMap {
    entries: HashMap<String, String>,
}

impl SynonymMap {
    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self, SynonymMapError> {
        Self::from_json(EMBEDDED_SYNONYMS)
    }

    pub fn from_path(path: &Path) -> Result<Self, SynonymMapError> {
        let raw = fs::read_to_string(path).map_err(|source| SynonymMapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json(&raw)?;
        info!("Loaded {} skill synonyms from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn from_json(raw: &str) -> Result<Self, SynonymMapError> {
        let table: BTreeMap<String, String> = serde_json::from_str(raw)?;
        Self::from_pairs(table)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SynonymMapError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: HashMap<String, String> = HashMap::new();
        for (raw, canonical) in pairs {
            let raw = fold(raw.as_ref());
            let canonical = fold(canonical.as_ref());
            if raw.is_empty() || canonical.is_empty() {
                return Err(SynonymMapError::EmptyName);
            }
            // Identity entries add nothing and would read as chains below.
            if raw == canonical {
                continue;
            }
            if let Some(existing) = entries.get(&raw) {
                if *existing != canonical {
                    return Err(SynonymMapError::Conflict(raw));
                }
            }
            entries.insert(raw, canonical);
        }

        for (from, via) in &entries {
            if let Some(to) = entries.get(via) {
                return Err(SynonymMapError::Chain {
                    from: from.clone(),
                    via: via.clone(),
                    to: to.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowercases, trims and maps a raw skill name; unknown names pass through.
    pub fn canonicalize(&self, skill_name: &str) -> String {
        let folded = fold(skill_name);
        match self.entries.get(&folded) {
            Some(canonical) => canonical.clone(),
            None => folded,
        }
    }

    /// Rewrites `skill_name` of every row in place. Degraded rows are untouched.
    pub fn normalize_rows(&self, rows: &mut [SkillRow]) {
        for row in rows.iter_mut() {
            if let Some(name) = row.skill_name.as_deref() {
                row.skill_name = Some(self.canonicalize(name));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded() -> SynonymMap {
        SynonymMap::embedded().unwrap()
    }

    #[test]
    fn test_embedded_table_loads() {
        let map = embedded();
        assert!(map.len() >= 55, "expected a full table, got {}", map.len());
    }

    #[test]
    fn test_known_and_unknown_names() {
        let map = embedded();
        assert_eq!(
            map.canonicalize("statistical modelling"),
            "statistical analysis and modelling"
        );
        assert_eq!(map.canonicalize("javascript"), "javascript");
    }

    #[test]
    fn test_case_and_whitespace_are_folded() {
        let map = embedded();
        assert_eq!(map.canonicalize("  Microsoft Excel "), "excel");
        assert_eq!(map.canonicalize("SQL"), "sql");
        assert_eq!(map.canonicalize("Samenwerken"), "collaboration");
    }

    #[test]
    fn test_canonicalize_is_idempotent_for_every_entry() {
        let map = embedded();
        for (raw, canonical) in map.iter() {
            let once = map.canonicalize(raw);
            assert_eq!(once, canonical);
            assert_eq!(map.canonicalize(&once), once, "chain through '{raw}'");
        }
        for name in ["javascript", "Power BI", "dbt", ""] {
            let once = map.canonicalize(name);
            assert_eq!(map.canonicalize(&once), once);
        }
    }

    #[test]
    fn test_no_target_is_also_a_source() {
        let map = embedded();
        let sources: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        for (_, target) in map.iter() {
            assert!(!sources.contains(&target), "'{target}' is both target and source");
        }
    }

    #[test]
    fn test_chains_are_rejected() {
        let err = SynonymMap::from_pairs([("stats", "statistics"), ("statistics", "statistical analysis")])
            .unwrap_err();
        assert!(matches!(err, SynonymMapError::Chain { .. }));
    }

    #[test]
    fn test_identity_entries_are_dropped() {
        let map = SynonymMap::from_pairs([("lua", "lua"), ("Lua scripting", "lua")]).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.canonicalize("LUA"), "lua");
        assert_eq!(map.canonicalize("lua scripting"), "lua");
    }

    #[test]
    fn test_conflicting_duplicates_are_rejected() {
        let err = SynonymMap::from_pairs([("Teamwork", "collaboration"), ("teamwork", "team")])
            .unwrap_err();
        assert!(matches!(err, SynonymMapError::Conflict(name) if name == "teamwork"));
    }

    #[test]
    fn test_normalize_rows_is_per_row_and_skips_degraded() {
        let map = embedded();
        let mut rows = vec![
            SkillRow {
                job_title: "data analyst".to_string(),
                skill_name: Some("Team Work".to_string()),
                category: None,
                types_of_tools_or_technologies: None,
                evidence: None,
                raw_skill: None,
            },
            SkillRow::degraded("data analyst", "{broken".to_string()),
        ];
        map.normalize_rows(&mut rows);
        assert_eq!(rows[0].skill_name.as_deref(), Some("collaboration"));
        assert!(rows[1].skill_name.is_none());
        assert_eq!(rows[1].raw_skill.as_deref(), Some("{broken"));
    }

    #[test]
    fn test_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synonyms.json");
        fs::write(&path, r#"{"Py": "python"}"#).unwrap();
        let map = SynonymMap::from_path(&path).unwrap();
        assert_eq!(map.canonicalize("py"), "python");

        let err = SynonymMap::from_path(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SynonymMapError::Read { .. }));
    }
}
