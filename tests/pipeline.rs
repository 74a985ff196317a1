use placement_analytics::aggregate::{self, Aggregate, CgpaBucket};
use placement_analytics::models::{
    CompanyRecord, HiringRecord, PerformanceRecord, Relations, StudentRecord,
};
use placement_analytics::{pipeline, FilterSet, JoinKeyError, PlacementStatus, Selection};
use pretty_assertions::assert_eq;

fn student(usn: &str, cgpa: f64) -> StudentRecord {
    StudentRecord {
        usn: usn.to_string(),
        name: format!("Student {usn}"),
        dept: "CS".to_string(),
        batch: "2023".to_string(),
        cgpa: Some(cgpa),
    }
}

fn two_student_cohort() -> Relations {
    Relations {
        students: vec![student("S1", 9.1), student("S2", 5.5)],
        performance: vec![
            PerformanceRecord {
                usn: "S1".to_string(),
                cid: "A".to_string(),
                status: Some(10),
            },
            PerformanceRecord {
                usn: "S2".to_string(),
                cid: "A".to_string(),
                status: Some(1),
            },
        ],
        hiring: vec![HiringRecord {
            cid: "A".to_string(),
            date: None,
            ctc: Some(12.0),
        }],
        companies: vec![CompanyRecord {
            cid: "A".to_string(),
            company: "Acme".to_string(),
        }],
    }
}

#[test]
fn two_student_cohort_end_to_end() {
    let output = pipeline::run(&two_student_cohort(), &FilterSet::default()).unwrap();

    let overall: Vec<(PlacementStatus, usize, f64)> = output
        .overall
        .rows()
        .iter()
        .map(|share| (share.status, share.count, share.percent))
        .collect();
    assert_eq!(
        overall,
        vec![
            (PlacementStatus::FailedFirstRound, 1, 50.0),
            (PlacementStatus::Placed, 1, 50.0),
        ]
    );

    let progressed: Vec<(CgpaBucket, usize)> = output
        .cgpa
        .progressed
        .rows()
        .iter()
        .map(|bucket| (bucket.bucket, bucket.students))
        .collect();
    assert_eq!(progressed, vec![(CgpaBucket::From9To10, 1)]);

    let salaries = output.salaries.rows();
    assert_eq!(salaries.len(), 1);
    assert_eq!(salaries[0].company, "Acme");
    assert_eq!(
        (salaries[0].highest, salaries[0].lowest, salaries[0].average),
        (12.0, 12.0, 12.0)
    );

    let conversion = output.conversion.rows();
    assert_eq!(conversion.len(), 1);
    assert_eq!(conversion[0].rate, 50);

    assert_eq!(
        output.pivot.header(),
        vec!["usn", "name", "dept", "batch", "cgpa", "Acme"]
    );
    assert_eq!(output.pivot.rows().len(), 2);
    assert_eq!(output.pivot.cell("S1", "Acme"), Some(PlacementStatus::Placed));
    assert_eq!(
        output.pivot.cell("S2", "Acme"),
        Some(PlacementStatus::FailedFirstRound)
    );
}

#[test]
fn student_without_attempts_counts_only_in_totals() {
    let mut relations = two_student_cohort();
    relations.students.push(student("S3", 7.0));

    let output = pipeline::run(&relations, &FilterSet::default()).unwrap();
    assert_eq!(output.summary.total_students, 3);
    let counted: usize = output.overall.rows().iter().map(|share| share.count).sum();
    assert_eq!(counted, 2);
    assert_eq!(output.pivot.rows().len(), 2);
    assert_eq!(output.records.len(), 3);
}

#[test]
fn empty_selection_is_not_an_error() {
    let filter = FilterSet {
        company: Selection::Only("Initech".to_string()),
        ..FilterSet::default()
    };
    let output = pipeline::run(&two_student_cohort(), &filter).unwrap();
    assert!(output.records.is_empty());
    assert_eq!(output.overall, Aggregate::Empty);
    assert!(output.pivot.is_empty());
    assert_eq!(output.summary.total_students, 2);
    assert_eq!(output.summary.placement_rate, 0.0);
}

#[test]
fn malformed_keys_abort_the_run() {
    let mut relations = two_student_cohort();
    relations.companies.push(CompanyRecord {
        cid: "A".to_string(),
        company: "Acme Again".to_string(),
    });
    assert!(matches!(
        pipeline::run(&relations, &FilterSet::default()),
        Err(JoinKeyError::DuplicateKey { .. })
    ));
}

#[test]
fn repeated_runs_are_identical() {
    let relations = two_student_cohort();
    let first = pipeline::run(&relations, &FilterSet::default()).unwrap();
    let second = pipeline::run(&relations, &FilterSet::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn aggregates_run_on_a_selected_view() {
    let view = pipeline::select(&two_student_cohort(), &FilterSet::default()).unwrap();
    let recruiters = aggregate::top_recruiters(&view);
    assert_eq!(recruiters.rows()[0].company, "Acme");
    assert_eq!(recruiters.rows()[0].students, 1);
}
