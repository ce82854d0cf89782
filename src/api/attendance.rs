use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::classify::{AttendanceError, classify_check_in, classify_check_out};
use crate::engine::summary::{DaysSummary, Summary, summarize, summarize_attendance_days};
use crate::model::attendance::AttendanceRecord;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

/// First and last day of a calendar month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "present"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let now = Local::now().naive_local();
    let policy = config.policy();
    let status = classify_check_in(now, policy.late_cutoff);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, check_in_time, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(now.date())
    .bind(now)
    .bind(status)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully",
            "status": status
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": AttendanceError::DuplicateDayRecord.to_string()
                    })));
                }
            }

            tracing::error!(error = %e, user_id = auth.user_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "status": "present",
            "total_hours": 8.75
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let now = Local::now().naive_local();

    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status, total_hours
        FROM attendance
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(auth.user_id)
    .bind(now.date())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let record = match record {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": AttendanceError::MissingCheckInOnCheckout.to_string()
            })));
        }
    };

    let check_in_time = match record.check_in_time {
        Some(t) => t,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": AttendanceError::MissingCheckInOnCheckout.to_string()
            })));
        }
    };

    if record.check_out_time.is_some() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already checked out today"
        })));
    }

    let policy = config.policy();

    // Status was derived at check-in; re-derive if the row predates that rule.
    let prior = record
        .status
        .unwrap_or_else(|| classify_check_in(check_in_time, policy.late_cutoff));

    let out = match classify_check_out(check_in_time, now, prior, policy.min_full_day_hours) {
        Ok(out) => out,
        Err(e) => {
            // InvalidTimeOrdering; reject without persisting
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": e.to_string()
            })));
        }
    };

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_time = ?, status = ?, total_hours = ?
        WHERE user_id = ? AND date = ? AND check_out_time IS NULL
        "#,
    )
    .bind(now)
    .bind(out.status)
    .bind(out.hours_worked)
    .bind(auth.user_id)
    .bind(now.date())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        // Raced with another check-out for the same day
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already checked out today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "status": out.status,
        "total_hours": out.hours_worked
    })))
}

/// Today's record for the caller, or null before first check-in.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Today's attendance record (null if none)", body = AttendanceRecord),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();

    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status, total_hours
        FROM attendance
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch today's attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(record))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    #[schema(example = "2026-05-01", value_type = String, format = "date")]
    pub start: Option<NaiveDate>,
    #[schema(example = "2026-08-07", value_type = String, format = "date")]
    pub end: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub records: Vec<AttendanceRecord>,
    pub summary: Summary,
}

/// Caller's attendance records over a date range, newest first, with a summary.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    params(
        ("start", Query, description = "Range start date (default 90 days ago)"),
        ("end", Query, description = "Range end date (default today)")
    ),
    responses(
        (status = 200, description = "Records and summary for the range", body = HistoryResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let end = query.end.unwrap_or_else(|| Local::now().date_naive());
    let start = query.start.unwrap_or_else(|| end - chrono::Duration::days(90));

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status, total_hours
        FROM attendance
        WHERE user_id = ? AND date BETWEEN ? AND ?
        ORDER BY date DESC
        "#,
    )
    .bind(auth.user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let summary = summarize(&records);

    Ok(HttpResponse::Ok().json(HistoryResponse { records, summary }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthQuery {
    /// "YYYY-MM"; defaults to the current month
    pub month: Option<String>,
}

/// Monthly "days present" rollup for the caller's dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(
        ("month", Query, description = "Month as YYYY-MM (default current month)")
    ),
    responses(
        (status = 200, description = "Days-present summary for the month", body = DaysSummary),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn month_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();

    let bounds = match &query.month {
        Some(month) => NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .ok()
            .and_then(|d| month_bounds(d.year(), d.month())),
        None => month_bounds(today.year(), today.month()),
    };

    let (start, end) = match bounds {
        Some(b) => b,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Month must be YYYY-MM"
            })));
        }
    };

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status, total_hours
        FROM attendance
        WHERE user_id = ? AND date BETWEEN ? AND ?
        "#,
    )
    .bind(auth.user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch monthly attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(summarize_attendance_days(&records)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_handles_year_end_and_leap_years() {
        assert_eq!(
            month_bounds(2026, 12),
            Some((
                NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
            ))
        );
        assert_eq!(
            month_bounds(2024, 2),
            Some((
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
            ))
        );
        assert_eq!(month_bounds(2026, 13), None);
    }
}
