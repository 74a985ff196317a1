use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{CompanyRecord, HiringRecord, PerformanceRecord, Relations, StudentRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        ("1CS20001", "Avery Lee", "CS", "2022", Some(9.1)),
        ("1CS21014", "Jules Moreno", "CS", "2023", Some(7.4)),
        ("1EC21007", "Kiara Patel", "EC", "2023", Some(8.2)),
        ("1EC22003", "Rohan Iyer", "EC", "2024", Some(5.8)),
        ("1ME22011", "Mina Chowdhury", "ME", "2024", None),
        ("1ME23002", "Tomas Silva", "ME", "2025", Some(6.6)),
    ];

    for (usn, name, dept, batch, cgpa) in students {
        sqlx::query(
            r#"
            INSERT INTO placement.student (usn, name, dept, batch, cgpa)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (usn) DO UPDATE
            SET name = EXCLUDED.name, dept = EXCLUDED.dept,
                batch = EXCLUDED.batch, cgpa = EXCLUDED.cgpa
            "#,
        )
        .bind(usn)
        .bind(name)
        .bind(dept)
        .bind(batch)
        .bind(cgpa)
        .execute(pool)
        .await?;
    }

    let companies = vec![
        ("C01", "Northwind Systems"),
        ("C02", "Bluepeak Analytics"),
        ("C03", "Helix Robotics"),
    ];

    for (cid, company) in companies {
        sqlx::query(
            r#"
            INSERT INTO placement.company (cid, company)
            VALUES ($1, $2)
            ON CONFLICT (cid) DO UPDATE SET company = EXCLUDED.company
            "#,
        )
        .bind(cid)
        .bind(company)
        .execute(pool)
        .await?;
    }

    let attempts = vec![
        ("seed-p-001", "1CS20001", "C01", 10),
        ("seed-p-002", "1CS20001", "C02", 9),
        ("seed-p-003", "1CS21014", "C01", 3),
        ("seed-p-004", "1CS21014", "C02", 10),
        ("seed-p-005", "1EC21007", "C03", 4),
        ("seed-p-006", "1EC22003", "C01", 0),
        ("seed-p-007", "1EC22003", "C03", 2),
        ("seed-p-008", "1ME23002", "C03", 1),
    ];

    for (source_key, usn, cid, status) in attempts {
        sqlx::query(
            r#"
            INSERT INTO placement.performance (usn, cid, status, source_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(usn)
        .bind(cid)
        .bind(status)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let hires = vec![
        (
            "seed-h-001",
            "C01",
            NaiveDate::from_ymd_opt(2026, 1, 12).context("invalid date")?,
            12.0,
        ),
        (
            "seed-h-002",
            "C02",
            NaiveDate::from_ymd_opt(2026, 2, 3).context("invalid date")?,
            9.5,
        ),
        (
            "seed-h-003",
            "C03",
            NaiveDate::from_ymd_opt(2026, 2, 20).context("invalid date")?,
            7.8,
        ),
    ];

    for (source_key, cid, date, ctc) in hires {
        sqlx::query(
            r#"
            INSERT INTO placement.hiring (cid, date, ctc, source_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(cid)
        .bind(date)
        .bind(ctc)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Reads all four relations inside one repeatable-read transaction so the
/// pipeline sees a single consistent snapshot.
pub async fn fetch_relations(pool: &PgPool) -> anyhow::Result<Relations> {
    let mut tx = pool.begin().await.context("failed to open snapshot")?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .execute(&mut *tx)
        .await?;

    let students = sqlx::query(
        "SELECT usn, name, dept, batch, cgpa FROM placement.student ORDER BY usn",
    )
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|row| StudentRecord {
        usn: row.get("usn"),
        name: row.get("name"),
        dept: row.get("dept"),
        batch: row.get("batch"),
        cgpa: row.get("cgpa"),
    })
    .collect::<Vec<_>>();

    let performance = sqlx::query("SELECT usn, cid, status FROM placement.performance ORDER BY id")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| PerformanceRecord {
            usn: row.get("usn"),
            cid: row.get("cid"),
            status: row.get("status"),
        })
        .collect::<Vec<_>>();

    let hiring = sqlx::query("SELECT cid, date, ctc FROM placement.hiring ORDER BY id")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| HiringRecord {
            cid: row.get("cid"),
            date: row.get("date"),
            ctc: row.get("ctc"),
        })
        .collect::<Vec<_>>();

    let companies = sqlx::query("SELECT cid, company FROM placement.company ORDER BY cid")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| CompanyRecord {
            cid: row.get("cid"),
            company: row.get("company"),
        })
        .collect::<Vec<_>>();

    tx.commit().await?;

    info!(
        students = students.len(),
        performance = performance.len(),
        hiring = hiring.len(),
        companies = companies.len(),
        "fetched relations"
    );

    Ok(Relations {
        students,
        performance,
        hiring,
        companies,
    })
}
