use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{self, Aggregate, CgpaDistribution, GroupBy};
use crate::error::JoinKeyError;
use crate::filter::{self, FilterSet, FilteredView};
use crate::join;
use crate::models::{
    ConversionRate, GroupStatusShare, PlacementSummary, RecruiterCount, Relations, SalaryStats,
    StatusShare,
};
use crate::pivot::{self, PivotMatrix};

/// Every derived table for one filter selection over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub summary: PlacementSummary,
    pub overall: Aggregate<StatusShare>,
    pub by_department: Aggregate<GroupStatusShare>,
    pub by_batch: Aggregate<GroupStatusShare>,
    pub top_recruiters: Aggregate<RecruiterCount>,
    pub cgpa: CgpaDistribution,
    pub salaries: Aggregate<SalaryStats>,
    pub conversion: Aggregate<ConversionRate>,
    pub pivot: PivotMatrix,
    pub records: FilteredView,
}

/// Joins and filters the relations, returning the view the aggregates run on.
pub fn select(relations: &Relations, filter: &FilterSet) -> Result<FilteredView, JoinKeyError> {
    let records = join::join_relations(relations)?;
    Ok(filter::apply_filters(&records, &relations.students, filter))
}

/// Runs `join → filter → {aggregate, pivot}` against one snapshot.
pub fn run(relations: &Relations, filter: &FilterSet) -> Result<PipelineOutput, JoinKeyError> {
    let view = select(relations, filter)?;
    if view.is_empty() {
        info!(?filter, "no records for this selection");
    }

    let output = PipelineOutput {
        summary: aggregate::placement_summary(&view, &relations.students),
        overall: aggregate::overall_distribution(&view),
        by_department: aggregate::grouped_distribution(&view, GroupBy::Department),
        by_batch: aggregate::grouped_distribution(&view, GroupBy::Batch),
        top_recruiters: aggregate::top_recruiters(&view),
        cgpa: aggregate::cgpa_distribution(&view),
        salaries: aggregate::salary_stats(&view),
        conversion: aggregate::conversion_rates(&view),
        pivot: pivot::build_pivot(&view),
        records: view,
    };
    debug!(
        rows = output.records.len(),
        pivot_rows = output.pivot.rows().len(),
        "pipeline complete"
    );

    Ok(output)
}
