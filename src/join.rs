use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{JoinKeyError, RelationName};
use crate::models::{
    CompanyRecord, DenormalizedRecord, HiringRecord, PerformanceRecord, Relations, StudentRecord,
};
use crate::status::PlacementStatus;

/// Left-joins student ⟕ performance ⟕ hiring ⟕ company.
///
/// Every student yields at least one row. A student with several performance
/// rows yields one row per attempt, and each attempt fans out again across the
/// hiring rows of its company. Company names are looked up by the attempt's
/// company id, so an attempt keeps its company even without a hiring row.
pub fn join_relations(relations: &Relations) -> Result<Vec<DenormalizedRecord>, JoinKeyError> {
    validate_keys(relations)?;

    if relations.students.is_empty() {
        return Ok(Vec::new());
    }

    let mut attempts: HashMap<&str, Vec<&PerformanceRecord>> = HashMap::new();
    for row in &relations.performance {
        attempts.entry(row.usn.as_str()).or_default().push(row);
    }

    let mut hires: HashMap<&str, Vec<&HiringRecord>> = HashMap::new();
    for row in &relations.hiring {
        hires.entry(row.cid.as_str()).or_default().push(row);
    }

    let companies: HashMap<&str, &CompanyRecord> = relations
        .companies
        .iter()
        .map(|company| (company.cid.as_str(), company))
        .collect();

    let mut records = Vec::with_capacity(relations.students.len().max(relations.performance.len()));
    for student in &relations.students {
        let Some(student_attempts) = attempts.get(student.usn.as_str()) else {
            records.push(denormalize(student, None, None, None));
            continue;
        };

        for &attempt in student_attempts {
            let company = companies.get(attempt.cid.as_str()).copied();
            match hires.get(attempt.cid.as_str()) {
                Some(company_hires) => {
                    for &hire in company_hires {
                        records.push(denormalize(student, Some(attempt), Some(hire), company));
                    }
                }
                None => records.push(denormalize(student, Some(attempt), None, company)),
            }
        }
    }

    let unmapped = records
        .iter()
        .filter(|record| record.raw_status_code.is_some() && !record.status.is_known())
        .count();
    if unmapped > 0 {
        warn!(unmapped, "outcome codes outside the status catalog mapped to Unknown");
    }
    debug!(
        students = relations.students.len(),
        rows = records.len(),
        "joined source relations"
    );

    Ok(records)
}

fn denormalize(
    student: &StudentRecord,
    attempt: Option<&PerformanceRecord>,
    hire: Option<&HiringRecord>,
    company: Option<&CompanyRecord>,
) -> DenormalizedRecord {
    let raw_status_code = attempt.and_then(|row| row.status);
    DenormalizedRecord {
        usn: student.usn.clone(),
        name: student.name.clone(),
        dept: student.dept.clone(),
        batch: student.batch.clone(),
        cgpa: student.cgpa,
        cid: attempt.map(|row| row.cid.clone()),
        company: company.map(|row| row.company.clone()),
        hiring_date: hire.and_then(|row| row.date),
        ctc: hire.and_then(|row| row.ctc),
        raw_status_code,
        status: PlacementStatus::from_code(raw_status_code),
    }
}

fn validate_keys(relations: &Relations) -> Result<(), JoinKeyError> {
    let mut usns = HashSet::new();
    for (index, student) in relations.students.iter().enumerate() {
        require_key(&student.usn, RelationName::Student, index, "usn")?;
        if !usns.insert(student.usn.as_str()) {
            return Err(JoinKeyError::DuplicateKey {
                relation: RelationName::Student,
                key: student.usn.clone(),
            });
        }
    }

    for (index, attempt) in relations.performance.iter().enumerate() {
        require_key(&attempt.usn, RelationName::Performance, index, "usn")?;
        require_key(&attempt.cid, RelationName::Performance, index, "cid")?;
    }

    for (index, hire) in relations.hiring.iter().enumerate() {
        require_key(&hire.cid, RelationName::Hiring, index, "cid")?;
    }

    let mut cids = HashSet::new();
    for (index, company) in relations.companies.iter().enumerate() {
        require_key(&company.cid, RelationName::Company, index, "cid")?;
        if !cids.insert(company.cid.as_str()) {
            return Err(JoinKeyError::DuplicateKey {
                relation: RelationName::Company,
                key: company.cid.clone(),
            });
        }
    }

    Ok(())
}

fn require_key(
    value: &str,
    relation: RelationName,
    index: usize,
    column: &'static str,
) -> Result<(), JoinKeyError> {
    if value.trim().is_empty() {
        return Err(JoinKeyError::BlankKey {
            relation,
            row: index + 1,
            column,
        });
    }
    Ok(())
}
