use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::status::PlacementStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub usn: String,
    pub name: String,
    pub dept: String,
    pub batch: String,
    pub cgpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub cid: String,
    pub company: String,
}

/// One interview pipeline instance of a student at a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub usn: String,
    pub cid: String,
    pub status: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiringRecord {
    pub cid: String,
    pub date: Option<NaiveDate>,
    pub ctc: Option<f64>,
}

/// The four source relations as fetched from one consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    pub students: Vec<StudentRecord>,
    pub performance: Vec<PerformanceRecord>,
    pub hiring: Vec<HiringRecord>,
    pub companies: Vec<CompanyRecord>,
}

/// One joined student × performance × hiring × company row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenormalizedRecord {
    pub usn: String,
    pub name: String,
    pub dept: String,
    pub batch: String,
    pub cgpa: Option<f64>,
    pub cid: Option<String>,
    pub company: Option<String>,
    pub hiring_date: Option<NaiveDate>,
    pub ctc: Option<f64>,
    pub raw_status_code: Option<i32>,
    pub status: PlacementStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: PlacementStatus,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatusShare {
    pub group: String,
    pub status: PlacementStatus,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecruiterCount {
    pub company: String,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryStats {
    pub company: String,
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRate {
    pub company: String,
    pub placed: usize,
    pub interviewed: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementSummary {
    pub total_students: usize,
    pub placed: usize,
    pub shortlisted: usize,
    pub not_placed: usize,
    pub placement_rate: f64,
}
