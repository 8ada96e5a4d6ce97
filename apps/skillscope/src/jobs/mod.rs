//! Job postings: loading, title/location normalization and the aggregates the
//! dashboard charts are drawn from.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::models::job::JobRecord;

pub mod handlers;

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("failed to read jobs file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("jobs file {path} is not a JSON array of job records: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Title substring -> cleaned title. Applied in order; a later match overrides
/// an earlier one, so "data analyst internship" ends up as "internship".
const TITLE_RULES: &[(&[&str], &str)] = &[
    (&["engin"], "data engineer"),
    (&["scien"], "data scientist"),
    (&["anal"], "data analyst"),
    (&["advisor"], "data consultant"),
    (&["traineeship", "internship"], "internship"),
];

const LOCATION_RULES: &[(&[&str], &str)] = &[
    (&["ghent"], "ghent"),
    (&["antwerp", "schoten"], "antwerp"),
];

/// Assumed age of a posting whose relative date is missing or unreadable.
const UNKNOWN_POSTING_AGE_DAYS: u64 = 2;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("static regex"));

/// Company names whose title-cased form needs fixing up.
const COMPANY_OVERRIDES: &[(&str, &str)] = &[("Vib", "VIB")];

pub fn load_jobs(path: &Path) -> Result<Vec<JobRecord>, JobsError> {
    let raw = fs::read_to_string(path).map_err(|source| JobsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let jobs: Vec<JobRecord> = serde_json::from_str(&raw).map_err(|source| JobsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded {} job postings from {}", jobs.len(), path.display());
    Ok(jobs)
}

/// Lowercases every text field and derives `title_cleaned`, the canonical
/// location, the schedule and the posting date. Fields no rule matches keep
/// their (lowercased) value.
pub fn normalize_job(job: &mut JobRecord) {
    normalize_job_on(job, Utc::now().date_naive());
}

fn normalize_job_on(job: &mut JobRecord, today: NaiveDate) {
    for field in [
        &mut job.title,
        &mut job.title_cleaned,
        &mut job.description,
        &mut job.location,
        &mut job.company_name,
        &mut job.schedule,
    ] {
        if let Some(text) = field.as_mut() {
            *text = text.to_lowercase();
        }
    }
    for value in job.extra.values_mut() {
        if let Value::String(text) = value {
            *text = text.to_lowercase();
        }
    }

    if let Some(title) = job.title.as_deref() {
        if let Some(cleaned) = apply_rules(TITLE_RULES, title) {
            job.title_cleaned = Some(cleaned.to_string());
        }
    }
    if let Some(location) = job.location.as_deref() {
        if let Some(canonical) = apply_rules(LOCATION_RULES, location) {
            job.location = Some(canonical.to_string());
        }
    }

    let extensions = detected_extensions(&job.extra);
    let extension = |key: &str| {
        extensions
            .as_ref()
            .and_then(|ext| ext.get(key))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase())
    };
    if job.schedule.is_none() {
        job.schedule = extension("schedule_type").filter(|s| !s.is_empty());
    }
    if job.posted_at.is_none() {
        job.posted_at = Some(posted_date(extension("posted_at").as_deref(), today));
    }
}

/// `detected_extensions` as delivered by the job search API: an object, or
/// that object serialized into a string.
fn detected_extensions(extra: &Map<String, Value>) -> Option<Map<String, Value>> {
    match extra.get("detected_extensions")? {
        Value::Object(map) => Some(map.clone()),
        Value::String(raw) => serde_json::from_str::<Map<String, Value>>(raw).ok(),
        _ => None,
    }
}

/// Turns "3 days ago" into a date relative to `today`. Hours and minutes
/// count as today; anything without a number gets the default age.
pub fn posted_date(relative: Option<&str>, today: NaiveDate) -> NaiveDate {
    let fallback = today
        .checked_sub_days(Days::new(UNKNOWN_POSTING_AGE_DAYS))
        .unwrap_or(today);
    let Some(text) = relative.map(str::to_lowercase) else {
        return fallback;
    };
    if text.contains("hour") || text.contains("minute") || text.contains("just now") {
        return today;
    }
    LEADING_NUMBER
        .captures(&text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .and_then(|days| today.checked_sub_days(Days::new(days)))
        .unwrap_or(fallback)
}

pub fn normalize_jobs(jobs: &mut [JobRecord]) {
    jobs.iter_mut().for_each(normalize_job);
}

fn apply_rules(rules: &[(&[&str], &'static str)], text: &str) -> Option<&'static str> {
    rules
        .iter()
        .filter(|(needles, _)| needles.iter().any(|n| text.contains(n)))
        .map(|(_, target)| *target)
        .last()
}

/// Dashboard filter over job postings. Each list is an OR over its values
/// (case-insensitive); the lists combine with AND; an empty list keeps all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub job_titles: Vec<String>,
    pub companies: Vec<String>,
    pub locations: Vec<String>,
    pub schedules: Vec<String>,
}

impl JobFilter {
    /// True when something other than the job title restricts the selection.
    pub fn narrows_beyond_titles(&self) -> bool {
        !(self.companies.is_empty() && self.locations.is_empty() && self.schedules.is_empty())
    }

    pub fn matches(&self, job: &JobRecord) -> bool {
        any_of(&self.job_titles, job.title_cleaned.as_deref())
            && any_of(&self.companies, job.company_name.as_deref())
            && any_of(&self.locations, job.location.as_deref())
            && any_of(&self.schedules, job.schedule.as_deref())
    }
}

fn any_of(wanted: &[String], value: Option<&str>) -> bool {
    wanted.is_empty()
        || value.is_some_and(|v| wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(v.trim())))
}

pub fn select_jobs<'a>(jobs: &'a [JobRecord], filter: &'a JobFilter) -> impl Iterator<Item = &'a JobRecord> + 'a {
    jobs.iter().filter(move |job| filter.matches(job))
}

/// Distinct cleaned titles among the jobs `filter` keeps, sorted.
pub fn filtered_titles(jobs: &[JobRecord], filter: &JobFilter) -> Vec<String> {
    select_jobs(jobs, filter)
        .filter_map(|job| job.title_cleaned.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

/// One stacked bar: postings for a title, split by location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleFrequency {
    pub title: String,
    pub total: usize,
    pub locations: Vec<LocationCount>,
}

/// Postings per (cleaned title, location), titles ordered by total descending.
/// Jobs without a cleaned title or a location are not counted.
pub fn job_frequency<'a, I>(jobs: I) -> Vec<TitleFrequency>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut grouped: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for job in jobs {
        let (Some(title), Some(location)) = (job.title_cleaned.as_deref(), job.location.as_deref())
        else {
            continue;
        };
        *grouped
            .entry(title_case(title))
            .or_default()
            .entry(title_case(location))
            .or_default() += 1;
    }

    let mut frequencies: Vec<TitleFrequency> = grouped
        .into_iter()
        .map(|(title, locations)| TitleFrequency {
            total: locations.values().sum(),
            title,
            locations: locations
                .into_iter()
                .map(|(location, count)| LocationCount { location, count })
                .collect(),
        })
        .collect();
    // Stable sort keeps ties alphabetical.
    frequencies.sort_by(|a, b| b.total.cmp(&a.total));
    frequencies
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCount {
    pub name: String,
    pub count: usize,
}

/// Postings per title-cased company name, most frequent first (word-cloud input).
pub fn company_counts<'a, I>(jobs: I) -> Vec<CompanyCount>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in jobs.into_iter().filter_map(|job| job.company_name.as_deref()) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let mut display = title_case(name);
        if let Some((_, fixed)) = COMPANY_OVERRIDES.iter().find(|(from, _)| *from == display) {
            display = fixed.to_string();
        }
        *counts.entry(display).or_default() += 1;
    }

    let mut companies: Vec<CompanyCount> = counts
        .into_iter()
        .map(|(name, count)| CompanyCount { name, count })
        .collect();
    companies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    companies
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
