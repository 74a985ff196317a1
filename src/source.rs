use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{JoinKeyError, RelationName};
use crate::models::Relations;

pub const STUDENTS_FILE: &str = "students.csv";
pub const PERFORMANCE_FILE: &str = "performance.csv";
pub const HIRING_FILE: &str = "hiring.csv";
pub const COMPANIES_FILE: &str = "companies.csv";

/// Loads the four relations from CSV files in `dir`.
pub fn load_relations(dir: &Path) -> anyhow::Result<Relations> {
    Ok(Relations {
        students: read_relation(&dir.join(STUDENTS_FILE), RelationName::Student, &["usn"])?,
        performance: read_relation(
            &dir.join(PERFORMANCE_FILE),
            RelationName::Performance,
            &["usn", "cid"],
        )?,
        hiring: read_relation(&dir.join(HIRING_FILE), RelationName::Hiring, &["cid"])?,
        companies: read_relation(&dir.join(COMPANIES_FILE), RelationName::Company, &["cid"])?,
    })
}

fn read_relation<T: DeserializeOwned>(
    path: &Path,
    relation: RelationName,
    keys: &[&'static str],
) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    for &column in keys {
        if !headers.iter().any(|header| header == column) {
            return Err(JoinKeyError::MissingColumn {
                relation,
                column,
            }
            .into());
        }
    }

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = result
            .with_context(|| format!("invalid row {} in {}", index + 1, path.display()))?;
        rows.push(row);
    }

    info!(%relation, rows = rows.len(), path = %path.display(), "loaded relation");
    Ok(rows)
}
