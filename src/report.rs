use std::fmt::Write;

use crate::aggregate::{Aggregate, CgpaBucketCount};
use crate::filter::{BatchSelection, FilterSet, Selection};
use crate::models::GroupStatusShare;
use crate::pipeline::PipelineOutput;

const NO_DATA: &str = "No data for this selection.";

pub fn describe_filter(filter: &FilterSet) -> String {
    let selection = |value: &Selection| match value {
        Selection::All => "all".to_string(),
        Selection::Only(value) => value.clone(),
    };
    let batch = match &filter.batch {
        BatchSelection::All => "all".to_string(),
        BatchSelection::Only(batch) => batch.clone(),
        BatchSelection::Recent(count) => format!("last {count} batches"),
    };
    format!(
        "department {}, batch {}, company {}",
        selection(&filter.department),
        batch,
        selection(&filter.company)
    )
}

pub fn build_report(filter: &FilterSet, output: &PipelineOutput) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Placement Analysis Report");
    let _ = writeln!(out, "Generated for {}", describe_filter(filter));
    let _ = writeln!(out);
    let _ = writeln!(out, "## Key Placement Metrics");
    let summary = &output.summary;
    let _ = writeln!(out, "- Total students: {}", summary.total_students);
    let _ = writeln!(out, "- Placed students: {}", summary.placed);
    let _ = writeln!(out, "- Shortlisted: {}", summary.shortlisted);
    let _ = writeln!(out, "- Not placed: {}", summary.not_placed);
    let _ = writeln!(out, "- Placement rate: {:.2}%", summary.placement_rate);

    let _ = writeln!(out);
    let _ = writeln!(out, "## Overall Placement Status");
    match &output.overall {
        Aggregate::Empty => {
            let _ = writeln!(out, "{NO_DATA}");
        }
        Aggregate::Rows(rows) => {
            for share in rows {
                let _ = writeln!(
                    out,
                    "- {}: {} students ({:.1}%)",
                    share.status, share.count, share.percent
                );
            }
        }
    }

    write_grouped(&mut out, "Branch-wise Placement Status", &output.by_department);
    write_grouped(&mut out, "Batch-wise Placement Status", &output.by_batch);

    let _ = writeln!(out);
    let _ = writeln!(out, "## Top Recruiters");
    match &output.top_recruiters {
        Aggregate::Empty => {
            let _ = writeln!(out, "{NO_DATA}");
        }
        Aggregate::Rows(rows) => {
            for recruiter in rows.iter().take(10) {
                let _ = writeln!(out, "- {}: {} students", recruiter.company, recruiter.students);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Salary by Company");
    match &output.salaries {
        Aggregate::Empty => {
            let _ = writeln!(out, "{NO_DATA}");
        }
        Aggregate::Rows(rows) => {
            let _ = writeln!(out, "| Company | Highest | Lowest | Average |");
            let _ = writeln!(out, "| --- | --- | --- | --- |");
            for stats in rows {
                let _ = writeln!(
                    out,
                    "| {} | {:.2} | {:.2} | {:.2} |",
                    stats.company, stats.highest, stats.lowest, stats.average
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Interview-to-Offer Conversion");
    match &output.conversion {
        Aggregate::Empty => {
            let _ = writeln!(out, "{NO_DATA}");
        }
        Aggregate::Rows(rows) => {
            for rate in rows {
                let _ = writeln!(
                    out,
                    "- {}: {}% ({} of {} interviewed)",
                    rate.company, rate.rate, rate.placed, rate.interviewed
                );
            }
        }
    }

    write_cgpa(&mut out, "CGPA Distribution (All Students)", &output.cgpa.all);
    write_cgpa(
        &mut out,
        "CGPA Distribution (Placed + Shortlisted)",
        &output.cgpa.progressed,
    );

    out
}

fn write_grouped(out: &mut String, title: &str, shares: &Aggregate<GroupStatusShare>) {
    let _ = writeln!(out);
    let _ = writeln!(out, "## {title}");
    let rows = match shares {
        Aggregate::Empty => {
            let _ = writeln!(out, "{NO_DATA}");
            return;
        }
        Aggregate::Rows(rows) => rows,
    };

    let mut current: Option<&str> = None;
    for share in rows {
        if current != Some(share.group.as_str()) {
            let _ = writeln!(out, "### {}", share.group);
            current = Some(share.group.as_str());
        }
        let _ = writeln!(
            out,
            "- {}: {} ({:.1}%)",
            share.status, share.count, share.percent
        );
    }
}

fn write_cgpa(out: &mut String, title: &str, buckets: &Aggregate<CgpaBucketCount>) {
    let _ = writeln!(out);
    let _ = writeln!(out, "## {title}");
    if buckets.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
        return;
    }
    for bucket in buckets.rows() {
        let _ = writeln!(out, "- {}: {} students", bucket.bucket, bucket.students);
    }
}
