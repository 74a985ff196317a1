use std::collections::{BTreeSet, HashMap};
use std::io;

use serde::Serialize;

use crate::filter::FilteredView;
use crate::status::PlacementStatus;

pub const KEY_COLUMNS: [&str; 5] = ["usn", "name", "dept", "batch", "cgpa"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub usn: String,
    pub name: String,
    pub dept: String,
    pub batch: String,
    pub cgpa: Option<f64>,
    /// One entry per company column; `None` where the student never
    /// interviewed with that company.
    pub cells: Vec<Option<PlacementStatus>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PivotMatrix {
    companies: Vec<String>,
    rows: Vec<PivotRow>,
}

impl PivotMatrix {
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Vec<String> {
        KEY_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(self.companies.iter().cloned())
            .collect()
    }

    pub fn cell(&self, usn: &str, company: &str) -> Option<PlacementStatus> {
        let column = self.companies.iter().position(|name| name == company)?;
        self.rows
            .iter()
            .find(|row| row.usn == usn)
            .and_then(|row| row.cells[column])
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.header())?;

        for row in &self.rows {
            let mut record = vec![
                row.usn.clone(),
                row.name.clone(),
                row.dept.clone(),
                row.batch.clone(),
                row.cgpa.map(|cgpa| cgpa.to_string()).unwrap_or_default(),
            ];
            record.extend(
                row.cells
                    .iter()
                    .map(|cell| cell.map(|status| status.label().to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Columns are sorted company names; for a repeated (student, company) pair
/// the first row wins.
pub fn build_pivot(view: &FilteredView) -> PivotMatrix {
    let companies: Vec<String> = view
        .iter()
        .filter_map(|record| record.company.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: HashMap<&str, usize> = companies
        .iter()
        .enumerate()
        .map(|(index, company)| (company.as_str(), index))
        .collect();

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<PivotRow> = Vec::new();

    for record in view.iter() {
        let Some(column) = record.company.as_deref().and_then(|c| columns.get(c)) else {
            continue;
        };
        let position = *positions.entry(record.usn.as_str()).or_insert_with(|| {
            rows.push(PivotRow {
                usn: record.usn.clone(),
                name: record.name.clone(),
                dept: record.dept.clone(),
                batch: record.batch.clone(),
                cgpa: record.cgpa,
                cells: vec![None; companies.len()],
            });
            rows.len() - 1
        });

        let cell = &mut rows[position].cells[*column];
        if cell.is_none() {
            *cell = Some(record.status);
        }
    }

    PivotMatrix { companies, rows }
}
