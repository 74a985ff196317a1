use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::models::{DenormalizedRecord, Relations, StudentRecord};

pub const ALL: &str = "All";
pub const RECENT_BATCH_WINDOW: usize = 3;
pub const RECENT_BATCHES_LABEL: &str = "Last 3 Years";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() || value == ALL {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BatchSelection {
    #[default]
    All,
    Only(String),
    /// The N greatest batches of the reference student population.
    Recent(usize),
}

impl FromStr for BatchSelection {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Ok(match value {
            "" | ALL => BatchSelection::All,
            RECENT_BATCHES_LABEL => BatchSelection::Recent(RECENT_BATCH_WINDOW),
            other => BatchSelection::Only(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub department: Selection,
    pub batch: BatchSelection,
    pub company: Selection,
}

impl FilterSet {
    pub fn is_pass_through(&self) -> bool {
        *self == FilterSet::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FilteredView {
    rows: Vec<DenormalizedRecord>,
}

impl FilteredView {
    pub fn new(rows: Vec<DenormalizedRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DenormalizedRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DenormalizedRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<DenormalizedRecord> {
        self.rows
    }
}

/// The recent-batches window comes from `reference`, the unfiltered student
/// relation, never from `records`.
pub fn apply_filters(
    records: &[DenormalizedRecord],
    reference: &[StudentRecord],
    filter: &FilterSet,
) -> FilteredView {
    let window = match &filter.batch {
        BatchSelection::Recent(count) => recent_batches(reference, *count),
        _ => None,
    };

    let rows: Vec<DenormalizedRecord> = records
        .iter()
        .filter(|record| filter.department.matches(Some(record.dept.as_str())))
        .filter(|record| match &filter.batch {
            BatchSelection::All => true,
            BatchSelection::Only(batch) => record.batch == *batch,
            BatchSelection::Recent(_) => window
                .as_ref()
                .map_or(true, |batches| batches.contains(&record.batch)),
        })
        .filter(|record| filter.company.matches(record.company.as_deref()))
        .cloned()
        .collect();

    debug!(input = records.len(), selected = rows.len(), "applied filters");
    FilteredView::new(rows)
}

/// The `count` greatest distinct batches, or `None` when fewer exist.
pub fn recent_batches(reference: &[StudentRecord], count: usize) -> Option<BTreeSet<String>> {
    let batches = sorted_batches(reference.iter().map(|student| student.batch.as_str()));
    if count == 0 || batches.len() < count {
        return None;
    }
    Some(batches[batches.len() - count..].iter().cloned().collect())
}

/// Orders batches numerically when both parse as integers, textually otherwise.
pub fn compare_batches(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<i64>(), right.trim().parse::<i64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

fn sorted_batches<'a>(batches: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = batches.filter(|batch| !batch.trim().is_empty()).collect();
    let mut sorted: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    sorted.sort_by(|a, b| compare_batches(a, b));
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub batches: Vec<String>,
    pub companies: Vec<String>,
}

impl FilterOptions {
    pub fn from_relations(relations: &Relations) -> Self {
        let departments: BTreeSet<&str> = relations
            .students
            .iter()
            .map(|student| student.dept.as_str())
            .filter(|dept| !dept.trim().is_empty())
            .collect();
        let companies: BTreeSet<&str> = relations
            .companies
            .iter()
            .map(|company| company.company.as_str())
            .filter(|name| !name.trim().is_empty())
            .collect();

        let mut batches = vec![ALL.to_string(), RECENT_BATCHES_LABEL.to_string()];
        batches.extend(sorted_batches(
            relations.students.iter().map(|student| student.batch.as_str()),
        ));

        Self {
            departments: with_all(departments),
            batches,
            companies: with_all(companies),
        }
    }
}

fn with_all(values: BTreeSet<&str>) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(values.into_iter().map(str::to_string))
        .collect()
}
