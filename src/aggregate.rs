use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::filter::{compare_batches, FilteredView};
use crate::models::{
    ConversionRate, DenormalizedRecord, GroupStatusShare, PlacementSummary, RecruiterCount,
    SalaryStats, StatusShare, StudentRecord,
};
use crate::status::PlacementStatus;

/// `Empty` when no row qualifies; not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum Aggregate<T> {
    Empty,
    Rows(Vec<T>),
}

impl<T> Aggregate<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Aggregate::Empty
        } else {
            Aggregate::Rows(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Aggregate::Empty)
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Aggregate::Empty => &[],
            Aggregate::Rows(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Department,
    Batch,
}

impl GroupBy {
    fn key(self, record: &DenormalizedRecord) -> &str {
        match self {
            GroupBy::Department => &record.dept,
            GroupBy::Batch => &record.batch,
        }
    }
}

/// Half-open CGPA bins; the top bin is closed at 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CgpaBucket {
    Below6,
    From6To7,
    From7To8,
    From8To9,
    From9To10,
}

impl CgpaBucket {
    /// `None` for a missing, non-finite or out-of-scale CGPA.
    pub fn from_cgpa(cgpa: Option<f64>) -> Option<Self> {
        let cgpa = cgpa.filter(|value| value.is_finite() && (0.0..=10.0).contains(value))?;
        Some(if cgpa < 6.0 {
            CgpaBucket::Below6
        } else if cgpa < 7.0 {
            CgpaBucket::From6To7
        } else if cgpa < 8.0 {
            CgpaBucket::From7To8
        } else if cgpa < 9.0 {
            CgpaBucket::From8To9
        } else {
            CgpaBucket::From9To10
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            CgpaBucket::Below6 => "<6",
            CgpaBucket::From6To7 => "6-7",
            CgpaBucket::From7To8 => "7-8",
            CgpaBucket::From8To9 => "8-9",
            CgpaBucket::From9To10 => "9-10",
        }
    }
}

impl fmt::Display for CgpaBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CgpaBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgpaBucketCount {
    pub bucket: CgpaBucket,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgpaDistribution {
    pub all: Aggregate<CgpaBucketCount>,
    pub progressed: Aggregate<CgpaBucketCount>,
}

pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn known(view: &FilteredView) -> impl Iterator<Item = &DenormalizedRecord> {
    view.iter().filter(|record| record.status.is_known())
}

/// Distinct students per status over the whole view, in catalog order.
pub fn overall_distribution(view: &FilteredView) -> Aggregate<StatusShare> {
    let mut buckets: BTreeMap<PlacementStatus, HashSet<&str>> = BTreeMap::new();
    let mut students: HashSet<&str> = HashSet::new();

    for record in known(view) {
        buckets
            .entry(record.status)
            .or_default()
            .insert(record.usn.as_str());
        students.insert(record.usn.as_str());
    }

    let total = students.len();
    Aggregate::from_rows(
        buckets
            .into_iter()
            .map(|(status, usns)| StatusShare {
                status,
                count: usns.len(),
                percent: percent(usns.len(), total),
            })
            .collect(),
    )
}

/// Status distribution per department or batch. A student counts once per
/// group, under the most progressed status they reached there.
pub fn grouped_distribution(view: &FilteredView, group_by: GroupBy) -> Aggregate<GroupStatusShare> {
    let mut outcomes: HashMap<&str, HashMap<&str, PlacementStatus>> = HashMap::new();

    for record in known(view) {
        let best = outcomes
            .entry(group_by.key(record))
            .or_default()
            .entry(record.usn.as_str())
            .or_insert(record.status);
        *best = (*best).max(record.status);
    }

    let mut groups: Vec<&str> = outcomes.keys().copied().collect();
    match group_by {
        GroupBy::Batch => groups.sort_by(|a, b| compare_batches(a, b)),
        GroupBy::Department => groups.sort(),
    }

    let mut rows = Vec::new();
    for group in groups {
        let Some(students) = outcomes.get(group) else {
            continue;
        };
        let mut counts: BTreeMap<PlacementStatus, usize> = BTreeMap::new();
        for status in students.values() {
            *counts.entry(*status).or_default() += 1;
        }
        for (status, count) in counts {
            rows.push(GroupStatusShare {
                group: group.to_string(),
                status,
                count,
                percent: percent(count, students.len()),
            });
        }
    }

    Aggregate::from_rows(rows)
}

/// Companies by distinct placed or shortlisted students, most first. Ties
/// keep the order in which companies first appear in the view.
pub fn top_recruiters(view: &FilteredView) -> Aggregate<RecruiterCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut students: HashMap<&str, HashSet<&str>> = HashMap::new();

    for record in view.iter().filter(|record| record.status.is_progressed()) {
        let Some(company) = record.company.as_deref() else {
            continue;
        };
        let usns = students.entry(company).or_insert_with(|| {
            order.push(company);
            HashSet::new()
        });
        usns.insert(record.usn.as_str());
    }

    let mut rows: Vec<RecruiterCount> = order
        .into_iter()
        .map(|company| RecruiterCount {
            company: company.to_string(),
            students: students.get(company).map_or(0, HashSet::len),
        })
        .collect();
    rows.sort_by(|a, b| b.students.cmp(&a.students));

    Aggregate::from_rows(rows)
}

/// Distinct students per CGPA bin, for everyone in the view and for the
/// placed or shortlisted subset.
pub fn cgpa_distribution(view: &FilteredView) -> CgpaDistribution {
    let mut all: BTreeMap<CgpaBucket, HashSet<&str>> = BTreeMap::new();
    let mut progressed: BTreeMap<CgpaBucket, HashSet<&str>> = BTreeMap::new();

    for record in view.iter() {
        let Some(bucket) = CgpaBucket::from_cgpa(record.cgpa) else {
            continue;
        };
        all.entry(bucket).or_default().insert(record.usn.as_str());
        if record.status.is_progressed() {
            progressed
                .entry(bucket)
                .or_default()
                .insert(record.usn.as_str());
        }
    }

    CgpaDistribution {
        all: bucket_counts(all),
        progressed: bucket_counts(progressed),
    }
}

fn bucket_counts(buckets: BTreeMap<CgpaBucket, HashSet<&str>>) -> Aggregate<CgpaBucketCount> {
    Aggregate::from_rows(
        buckets
            .into_iter()
            .map(|(bucket, usns)| CgpaBucketCount {
                bucket,
                students: usns.len(),
            })
            .collect(),
    )
}

/// Highest, lowest and mean compensation of placed rows, per company.
pub fn salary_stats(view: &FilteredView) -> Aggregate<SalaryStats> {
    let mut packages: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in view
        .iter()
        .filter(|record| record.status == PlacementStatus::Placed)
    {
        if let (Some(company), Some(ctc)) = (record.company.as_deref(), record.ctc) {
            packages.entry(company).or_default().push(ctc);
        }
    }

    Aggregate::from_rows(
        packages
            .into_iter()
            .map(|(company, values)| SalaryStats {
                company: company.to_string(),
                highest: values.iter().copied().fold(f64::MIN, f64::max),
                lowest: values.iter().copied().fold(f64::MAX, f64::min),
                average: values.iter().sum::<f64>() / values.len() as f64,
            })
            .collect(),
    )
}

/// Placed over interviewed distinct students per company, highest first.
pub fn conversion_rates(view: &FilteredView) -> Aggregate<ConversionRate> {
    let mut companies: BTreeMap<&str, (HashSet<&str>, HashSet<&str>)> = BTreeMap::new();

    for record in known(view) {
        let Some(company) = record.company.as_deref() else {
            continue;
        };
        let (interviewed, placed) = companies.entry(company).or_default();
        interviewed.insert(record.usn.as_str());
        if record.status == PlacementStatus::Placed {
            placed.insert(record.usn.as_str());
        }
    }

    let mut rows: Vec<ConversionRate> = companies
        .into_iter()
        .filter(|(_, (interviewed, _))| !interviewed.is_empty())
        .map(|(company, (interviewed, placed))| ConversionRate {
            company: company.to_string(),
            placed: placed.len(),
            interviewed: interviewed.len(),
            rate: percent(placed.len(), interviewed.len()).round() as u32,
        })
        .collect();
    rows.sort_by(|a, b| b.rate.cmp(&a.rate));

    Aggregate::from_rows(rows)
}

/// Headline counts. The total comes from the unfiltered student relation;
/// placed and shortlisted counts come from the filtered view.
pub fn placement_summary(view: &FilteredView, reference: &[StudentRecord]) -> PlacementSummary {
    let total_students = reference
        .iter()
        .map(|student| student.usn.as_str())
        .collect::<HashSet<_>>()
        .len();
    let distinct_with = |status: PlacementStatus| {
        view.iter()
            .filter(|record| record.status == status)
            .map(|record| record.usn.as_str())
            .collect::<HashSet<_>>()
            .len()
    };
    let placed = distinct_with(PlacementStatus::Placed);
    let shortlisted = distinct_with(PlacementStatus::Shortlisted);

    PlacementSummary {
        total_students,
        placed,
        shortlisted,
        not_placed: total_students.saturating_sub(placed),
        placement_rate: percent(placed + shortlisted, total_students),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(
        usn: &str,
        dept: &str,
        batch: &str,
        cgpa: Option<f64>,
        company: Option<&str>,
        code: Option<i32>,
        ctc: Option<f64>,
    ) -> DenormalizedRecord {
        DenormalizedRecord {
            usn: usn.to_string(),
            name: usn.to_string(),
            dept: dept.to_string(),
            batch: batch.to_string(),
            cgpa,
            cid: company.map(str::to_string),
            company: company.map(str::to_string),
            hiring_date: None,
            ctc,
            raw_status_code: code,
            status: PlacementStatus::from_code(code),
        }
    }

    fn view() -> FilteredView {
        FilteredView::new(vec![
            row("s1", "CS", "2023", Some(9.1), Some("Acme"), Some(10), Some(12.0)),
            row("s1", "CS", "2023", Some(9.1), Some("Globex"), Some(10), Some(8.0)),
            row("s2", "CS", "2023", Some(5.5), Some("Acme"), Some(1), Some(12.0)),
            row("s3", "EC", "2024", Some(7.2), Some("Globex"), Some(9), None),
            row("s4", "EC", "2024", Some(6.4), Some("Globex"), Some(10), Some(10.0)),
            row("s5", "EC", "2024", None, None, None, None),
        ])
    }

    #[test]
    fn overall_counts_each_student_once_per_status() {
        let shares = overall_distribution(&view());
        let counts: Vec<(PlacementStatus, usize)> =
            shares.rows().iter().map(|s| (s.status, s.count)).collect();
        assert_eq!(
            counts,
            vec![
                (PlacementStatus::FailedFirstRound, 1),
                (PlacementStatus::Shortlisted, 1),
                (PlacementStatus::Placed, 2),
            ]
        );
        // s5 has no outcome and stays out of the denominator.
        assert!((shares.rows()[2].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn grouped_percentages_use_group_totals() {
        let shares = grouped_distribution(&view(), GroupBy::Department);
        let ec: Vec<&GroupStatusShare> = shares.rows().iter().filter(|s| s.group == "EC").collect();
        assert_eq!(ec.len(), 2);
        let sum: f64 = ec.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(shares.rows()[0].group, "CS");
    }

    #[test]
    fn grouped_counts_each_student_under_one_status() {
        let view = FilteredView::new(vec![
            row("s1", "CS", "2023", Some(8.0), Some("Acme"), Some(10), None),
            row("s1", "CS", "2023", Some(8.0), Some("Globex"), Some(1), None),
            row("s2", "CS", "2023", Some(6.5), Some("Acme"), Some(1), None),
        ]);
        let shares: Vec<(PlacementStatus, usize, f64)> =
            grouped_distribution(&view, GroupBy::Department)
                .rows()
                .iter()
                .map(|s| (s.status, s.count, s.percent))
                .collect();
        assert_eq!(
            shares,
            vec![
                (PlacementStatus::FailedFirstRound, 1, 50.0),
                (PlacementStatus::Placed, 1, 50.0),
            ]
        );
    }

    #[test]
    fn batch_groups_sort_numerically() {
        let mut rows = view().into_rows();
        rows.push(row("s6", "ME", "999", None, Some("Acme"), Some(0), None));
        let shares = grouped_distribution(&FilteredView::new(rows), GroupBy::Batch);
        let groups: Vec<&str> = shares.rows().iter().map(|s| s.group.as_str()).collect();
        assert_eq!(groups.first(), Some(&"999"));
        assert_eq!(groups.last(), Some(&"2024"));
    }

    #[test]
    fn top_recruiters_rank_distinct_students() {
        let recruiters = top_recruiters(&view());
        assert_eq!(
            recruiters.rows().to_vec(),
            vec![
                RecruiterCount {
                    company: "Globex".to_string(),
                    students: 3,
                },
                RecruiterCount {
                    company: "Acme".to_string(),
                    students: 1,
                },
            ]
        );
    }

    #[test]
    fn recruiter_ties_keep_first_appearance() {
        let tied = FilteredView::new(vec![
            row("a", "CS", "2023", None, Some("Zeta"), Some(10), None),
            row("b", "CS", "2023", None, Some("Alpha"), Some(9), None),
        ]);
        let companies: Vec<String> = top_recruiters(&tied)
            .rows()
            .iter()
            .map(|r| r.company.clone())
            .collect();
        assert_eq!(companies, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn cgpa_bins_are_half_open() {
        assert_eq!(CgpaBucket::from_cgpa(Some(5.99)), Some(CgpaBucket::Below6));
        assert_eq!(CgpaBucket::from_cgpa(Some(6.0)), Some(CgpaBucket::From6To7));
        assert_eq!(CgpaBucket::from_cgpa(Some(8.99)), Some(CgpaBucket::From8To9));
        assert_eq!(CgpaBucket::from_cgpa(Some(9.0)), Some(CgpaBucket::From9To10));
        assert_eq!(CgpaBucket::from_cgpa(Some(10.0)), Some(CgpaBucket::From9To10));
        assert_eq!(CgpaBucket::from_cgpa(Some(10.5)), None);
        assert_eq!(CgpaBucket::from_cgpa(Some(f64::NAN)), None);
        assert_eq!(CgpaBucket::from_cgpa(None), None);
    }

    #[test]
    fn cgpa_distribution_splits_progressed_students() {
        let distribution = cgpa_distribution(&view());
        let all: Vec<(&str, usize)> = distribution
            .all
            .rows()
            .iter()
            .map(|c| (c.bucket.label(), c.students))
            .collect();
        assert_eq!(all, vec![("<6", 1), ("6-7", 1), ("7-8", 1), ("9-10", 1)]);
        let progressed: Vec<(&str, usize)> = distribution
            .progressed
            .rows()
            .iter()
            .map(|c| (c.bucket.label(), c.students))
            .collect();
        assert_eq!(progressed, vec![("6-7", 1), ("7-8", 1), ("9-10", 1)]);
    }

    #[test]
    fn salary_stats_cover_placed_rows_only() {
        let stats = salary_stats(&view());
        assert_eq!(
            stats.rows().to_vec(),
            vec![
                SalaryStats {
                    company: "Acme".to_string(),
                    highest: 12.0,
                    lowest: 12.0,
                    average: 12.0,
                },
                SalaryStats {
                    company: "Globex".to_string(),
                    highest: 10.0,
                    lowest: 8.0,
                    average: 9.0,
                },
            ]
        );
    }

    #[test]
    fn conversion_rates_round_and_sort() {
        let rates = conversion_rates(&view());
        let summary: Vec<(&str, usize, usize, u32)> = rates
            .rows()
            .iter()
            .map(|r| (r.company.as_str(), r.placed, r.interviewed, r.rate))
            .collect();
        assert_eq!(summary, vec![("Globex", 2, 3, 67), ("Acme", 1, 2, 50)]);
        assert!(rates.rows().iter().all(|r| r.rate <= 100));
    }

    #[test]
    fn empty_view_yields_empty_markers() {
        let empty = FilteredView::default();
        assert!(overall_distribution(&empty).is_empty());
        assert!(grouped_distribution(&empty, GroupBy::Batch).is_empty());
        assert!(top_recruiters(&empty).is_empty());
        assert!(salary_stats(&empty).is_empty());
        assert!(conversion_rates(&empty).is_empty());
        let cgpa = cgpa_distribution(&empty);
        assert!(cgpa.all.is_empty() && cgpa.progressed.is_empty());
    }

    #[test]
    fn unknown_only_view_is_empty_for_status_aggregates() {
        let view = FilteredView::new(vec![row("s5", "EC", "2024", Some(8.0), None, Some(42), None)]);
        assert!(overall_distribution(&view).is_empty());
        assert!(conversion_rates(&view).is_empty());
        assert_eq!(cgpa_distribution(&view).all.rows().len(), 1);
    }

    #[test]
    fn summary_uses_reference_total() {
        let reference: Vec<StudentRecord> = ["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"]
            .iter()
            .map(|usn| StudentRecord {
                usn: usn.to_string(),
                name: usn.to_string(),
                dept: "CS".to_string(),
                batch: "2023".to_string(),
                cgpa: None,
            })
            .collect();
        let summary = placement_summary(&view(), &reference);
        assert_eq!(summary.total_students, 8);
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.shortlisted, 1);
        assert_eq!(summary.not_placed, 6);
        assert!((summary.placement_rate - 37.5).abs() < 1e-9);
    }

    #[test]
    fn summary_with_no_students_has_zero_rate() {
        let summary = placement_summary(&FilteredView::default(), &[]);
        assert_eq!(summary.total_students, 0);
        assert_eq!(summary.placement_rate, 0.0);
    }
}
