use std::collections::HashSet;

use crate::api::report::ReportRow;
use crate::auth::auth::AuthUser;
use crate::engine::summary::{Summary, derive_absentees};
use crate::model::profile::Profile;
use crate::model::status::AttendanceStatus;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct RecentCheckIn {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "EMP-0001")]
    pub employee_code: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,
    pub status: Option<AttendanceStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct TodayOverview {
    #[schema(example = 42)]
    pub total_employees: i64,
    /// Everyone with an attendance row today that counts as attending
    /// (present, late or half-day).
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    /// First few absentees for the dashboard list.
    pub absent_today: Vec<Profile>,
    pub recent_activity: Vec<RecentCheckIn>,
}

/// Manager dashboard: today's headline numbers plus absentee and
/// recent-check-in lists.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/today",
    responses(
        (status = 200, description = "Today's attendance overview", body = TodayOverview),
        (status = 403, description = "Forbidden"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn today_overview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let today = Local::now().date_naive();

    let total_employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let rows = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT a.id, a.user_id, a.date, a.check_in_time, a.check_out_time,
               a.status, a.total_hours, p.name, p.employee_code, p.department
        FROM attendance a
        JOIN profiles p ON p.user_id = a.user_id
        WHERE a.date = ?
        "#,
    )
    .bind(today)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch today's attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut summary = Summary::default();
    for row in &rows {
        summary.add(row.status, row.total_hours);
    }

    let checked_in: HashSet<u64> = rows.iter().map(|r| r.user_id).collect();

    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT user_id, name, employee_code, department, email, role FROM profiles ORDER BY name ASC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch profiles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let absentees = derive_absentees(profiles, &checked_in);
    let absent = absentees.len() as u32;

    let mut recent: Vec<(NaiveDateTime, &ReportRow)> = rows
        .iter()
        .filter_map(|r| r.check_in_time.map(|t| (t, r)))
        .collect();
    recent.sort_by(|a, b| b.0.cmp(&a.0));
    let recent_activity = recent
        .into_iter()
        .take(5)
        .map(|(check_in_time, r)| RecentCheckIn {
            name: r.name.clone(),
            employee_code: r.employee_code.clone(),
            check_in_time,
            status: r.status,
        })
        .collect();

    Ok(HttpResponse::Ok().json(TodayOverview {
        total_employees,
        present: summary.present + summary.late + summary.half_day,
        late: summary.late,
        absent,
        absent_today: absentees.into_iter().take(5).collect(),
        recent_activity,
    }))
}
