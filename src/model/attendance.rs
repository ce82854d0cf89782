use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::AttendanceStatus;

/// One row of the `attendance` table. At most one row exists per
/// `(user_id, date)`; the unique key enforces it. `status` and `total_hours`
/// are written only from the classification engine's outputs.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,

    #[schema(example = "2026-08-07", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-08-07T08:45:00", value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(example = "2026-08-07T17:30:00", value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    pub status: Option<AttendanceStatus>,

    #[schema(example = 8.75, nullable = true)]
    pub total_hours: Option<f64>,
}
