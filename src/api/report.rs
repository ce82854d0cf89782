use crate::auth::auth::AuthUser;
use crate::engine::summary::Summary;
use crate::model::status::AttendanceStatus;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::attendance::month_bounds;

/// Attendance row joined with the owning profile, as shown in manager views
/// and exported reports.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ReportRow {
    pub id: u64,
    pub user_id: u64,

    #[schema(example = "2026-08-07", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    pub status: Option<AttendanceStatus>,

    #[schema(example = 8.75, nullable = true)]
    pub total_hours: Option<f64>,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "EMP-0001")]
    pub employee_code: String,

    #[schema(example = "Engineering")]
    pub department: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub start: Option<NaiveDate>,
    #[schema(example = "2026-08-31", value_type = String, format = "date")]
    pub end: Option<NaiveDate>,
    pub user_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub records: Vec<ReportRow>,
    pub summary: Summary,
}

async fn fetch_report_rows(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
    user_id: Option<u64>,
) -> Result<Vec<ReportRow>, sqlx::Error> {
    let mut sql = String::from(
        r#"
        SELECT a.id, a.user_id, a.date, a.check_in_time, a.check_out_time,
               a.status, a.total_hours, p.name, p.employee_code, p.department
        FROM attendance a
        JOIN profiles p ON p.user_id = a.user_id
        WHERE a.date BETWEEN ? AND ?
        "#,
    );
    if user_id.is_some() {
        sql.push_str(" AND a.user_id = ?");
    }
    sql.push_str(" ORDER BY a.date DESC, p.name ASC");

    let mut query = sqlx::query_as::<_, ReportRow>(&sql).bind(start).bind(end);
    if let Some(user_id) = user_id {
        query = query.bind(user_id);
    }

    query.fetch_all(pool).await
}

fn default_range(query: &ReportQuery) -> (NaiveDate, NaiveDate) {
    let today = Local::now().date_naive();
    // month_bounds is total for real dates
    let (month_start, month_end) =
        month_bounds(today.year(), today.month()).unwrap_or((today, today));
    (
        query.start.unwrap_or(month_start),
        query.end.unwrap_or(month_end),
    )
}

/// Range report (manager only)
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(
        ("start", Query, description = "Range start date (default start of month)"),
        ("end", Query, description = "Range end date (default end of month)"),
        ("user_id", Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "Records and summary for the range", body = ReportResponse),
        (status = 403, description = "Forbidden"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let (start, end) = default_range(&query);

    let records = fetch_report_rows(pool.get_ref(), start, end, query.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch report rows");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let mut summary = Summary::default();
    for row in &records {
        summary.add(row.status, row.total_hours);
    }

    Ok(HttpResponse::Ok().json(ReportResponse { records, summary }))
}

fn format_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%-I:%M %p").to_string()).unwrap_or_default()
}

/// Serialize report rows to CSV with the fixed export column order.
pub(crate) fn render_csv(records: &[ReportRow]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([
        "Date",
        "Employee",
        "Employee ID",
        "Department",
        "Check In",
        "Check Out",
        "Hours",
        "Status",
    ])?;

    for r in records {
        wtr.write_record([
            r.date.to_string(),
            r.name.clone(),
            r.employee_code.clone(),
            r.department.clone(),
            format_time(r.check_in_time),
            format_time(r.check_out_time),
            r.total_hours.map(|h| format!("{h:.1}")).unwrap_or_default(),
            r.status.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// CSV export of the range report (manager only)
#[utoipa::path(
    get,
    path = "/api/v1/reports/export",
    params(
        ("start", Query, description = "Range start date (default start of month)"),
        ("end", Query, description = "Range end date (default end of month)"),
        ("user_id", Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 403, description = "Forbidden"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_csv(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let (start, end) = default_range(&query);

    let records = fetch_report_rows(pool.get_ref(), start, end, query.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch report rows");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let body = render_csv(&records).map_err(|e| {
        error!(error = %e, "Failed to render CSV");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"attendance-report-{start}-to-{end}.csv\""),
        ))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        date: (i32, u32, u32),
        check_in: Option<(u32, u32)>,
        check_out: Option<(u32, u32)>,
        status: Option<AttendanceStatus>,
        total_hours: Option<f64>,
    ) -> ReportRow {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        let at = |(h, m): (u32, u32)| date.and_hms_opt(h, m, 0).unwrap();
        ReportRow {
            id: 1,
            user_id: 1,
            date,
            check_in_time: check_in.map(at),
            check_out_time: check_out.map(at),
            status,
            total_hours,
            name: "John Doe".to_string(),
            employee_code: "EMP-0001".to_string(),
            department: "Engineering".to_string(),
        }
    }

    #[test]
    fn csv_has_fixed_header_and_formatting() {
        let rows = vec![row(
            (2026, 8, 7),
            Some((8, 45)),
            Some((17, 30)),
            Some(AttendanceStatus::Present),
            Some(8.75),
        )];

        let out = render_csv(&rows).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Employee,Employee ID,Department,Check In,Check Out,Hours,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2026-08-07,John Doe,EMP-0001,Engineering,8:45 AM,5:30 PM,8.8,present"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_leaves_blanks_for_missing_values() {
        let rows = vec![row((2026, 8, 7), None, None, None, None)];

        let out = render_csv(&rows).unwrap();
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "2026-08-07,John Doe,EMP-0001,Engineering,,,,"
        );
    }

    #[test]
    fn csv_renders_half_day_status_kebab_case() {
        let rows = vec![row(
            (2026, 8, 7),
            Some((9, 30)),
            Some((10, 0)),
            Some(AttendanceStatus::HalfDay),
            Some(0.5),
        )];

        let out = render_csv(&rows).unwrap();
        assert!(out.lines().nth(1).unwrap().ends_with(",0.5,half-day"));
    }
}
