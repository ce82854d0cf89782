use crate::api::attendance::{HistoryQuery, HistoryResponse, MonthQuery};
use crate::api::dashboard::{RecentCheckIn, TodayOverview};
use crate::api::profile::{ProfileListResponse, ProfileQuery};
use crate::api::report::{ReportQuery, ReportResponse, ReportRow};
use crate::engine::summary::{DaysSummary, Summary};
use crate::model::attendance::AttendanceRecord;
use crate::model::profile::Profile;
use crate::model::status::AttendanceStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracking API",
        version = "1.0.0",
        description = r#"
## Attendance Tracking System

This API powers a role-based **attendance tracking** system for employees and managers.

### Key Features
- **Check-in / Check-out**
  - Daily check-in and check-out with automatic status derivation
    (present, late, half-day)
- **History**
  - Per-user attendance history with range summaries and monthly rollups
- **Manager Dashboard**
  - Today's headcount, late arrivals, absentees and recent check-ins
- **Reports**
  - Date-range reports across employees with CSV export

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Dashboard, report and profile-directory endpoints require the **manager** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for the profile directory

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::history,
        crate::api::attendance::month_summary,

        crate::api::profile::my_profile,
        crate::api::profile::update_my_profile,
        crate::api::profile::list_profiles,
        crate::api::profile::get_profile,

        crate::api::dashboard::today_overview,

        crate::api::report::attendance_report,
        crate::api::report::export_csv
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            Profile,
            Summary,
            DaysSummary,
            HistoryQuery,
            HistoryResponse,
            MonthQuery,
            ProfileQuery,
            ProfileListResponse,
            ReportQuery,
            ReportResponse,
            ReportRow,
            TodayOverview,
            RecentCheckIn
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance check-in/out and history APIs"),
        (name = "Profile", description = "Profile APIs"),
        (name = "Dashboard", description = "Manager dashboard APIs"),
        (name = "Report", description = "Manager reporting and export APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
