use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;
use crate::model::profile::Profile;
use crate::model::status::AttendanceStatus;

/// Aggregate counts over a set of attendance records. Each classified record
/// increments exactly one counter; unclassified records increment none but
/// still contribute their hours. The fold has no order dependency, so partial
/// summaries may be computed per page and combined with [`Summary::merge`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    #[schema(example = 42.5)]
    pub total_hours: f64,
}

impl Summary {
    pub fn add(&mut self, status: Option<AttendanceStatus>, hours: Option<f64>) {
        match status {
            Some(AttendanceStatus::Present) => self.present += 1,
            Some(AttendanceStatus::Absent) => self.absent += 1,
            Some(AttendanceStatus::Late) => self.late += 1,
            Some(AttendanceStatus::HalfDay) => self.half_day += 1,
            None => {}
        }
        self.total_hours += hours.unwrap_or(0.0);
    }

    pub fn merge(self, other: Summary) -> Summary {
        Summary {
            present: self.present + other.present,
            absent: self.absent + other.absent,
            late: self.late + other.late,
            half_day: self.half_day + other.half_day,
            total_hours: self.total_hours + other.total_hours,
        }
    }
}

pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut summary = Summary::default();
    for record in records {
        summary.add(record.status, record.total_hours);
    }
    summary
}

/// "Days present" rollup used by the monthly dashboard figures. A late day
/// counts as both late and present, and a half-day contributes 0.5 of a
/// present day; the resulting double counting drives the displayed
/// attendance percentages and is kept exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DaysSummary {
    #[schema(example = 18.5)]
    pub days_present: f64,
    pub absent: u32,
    pub late: u32,
    #[schema(example = 152.0)]
    pub total_hours: f64,
}

pub fn summarize_attendance_days<'a, I>(records: I) -> DaysSummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut days = DaysSummary::default();
    for record in records {
        match record.status {
            Some(AttendanceStatus::Present) => days.days_present += 1.0,
            Some(AttendanceStatus::Late) => {
                days.late += 1;
                days.days_present += 1.0;
            }
            Some(AttendanceStatus::HalfDay) => days.days_present += 0.5,
            Some(AttendanceStatus::Absent) => days.absent += 1,
            None => {}
        }
        days.total_hours += record.total_hours.unwrap_or(0.0);
    }
    days
}

/// Profiles with no attendance row today. Input order is preserved; callers
/// sort if they need a stable display order.
pub fn derive_absentees(profiles: Vec<Profile>, present_user_ids: &HashSet<u64>) -> Vec<Profile> {
    profiles
        .into_iter()
        .filter(|p| !present_user_ids.contains(&p.user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(status: Option<AttendanceStatus>, total_hours: Option<f64>) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            check_in_time: None,
            check_out_time: None,
            status,
            total_hours,
        }
    }

    fn profile(user_id: u64, name: &str) -> Profile {
        Profile {
            user_id,
            name: name.to_string(),
            employee_code: format!("EMP-{user_id:04}"),
            department: "Engineering".to_string(),
            email: format!("{name}@company.com"),
            role: "employee".to_string(),
        }
    }

    #[test]
    fn empty_input_yields_all_zeroes() {
        let records: Vec<AttendanceRecord> = Vec::new();
        assert_eq!(summarize(&records), Summary::default());
        assert_eq!(summarize_attendance_days(&records), DaysSummary::default());
    }

    #[test]
    fn each_record_increments_exactly_one_counter() {
        let mut records = Vec::new();
        records.extend((0..6).map(|_| record(Some(AttendanceStatus::Present), Some(8.0))));
        records.extend((0..2).map(|_| record(Some(AttendanceStatus::Late), Some(7.0))));
        records.push(record(Some(AttendanceStatus::Absent), None));
        records.push(record(Some(AttendanceStatus::HalfDay), Some(3.0)));

        let summary = summarize(&records);
        assert_eq!(summary.present, 6);
        assert_eq!(summary.late, 2);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.half_day, 1);
        assert!((summary.total_hours - 65.0).abs() < 1e-9);
    }

    #[test]
    fn summarize_is_order_independent() {
        let mut records = vec![
            record(Some(AttendanceStatus::Late), Some(7.5)),
            record(Some(AttendanceStatus::Present), Some(8.0)),
            record(None, Some(2.0)),
            record(Some(AttendanceStatus::HalfDay), Some(3.5)),
            record(Some(AttendanceStatus::Absent), None),
        ];

        let forward = summarize(&records);
        records.reverse();
        assert_eq!(summarize(&records), forward);
        records.rotate_left(2);
        assert_eq!(summarize(&records), forward);
    }

    #[test]
    fn unclassified_records_still_contribute_hours() {
        let records = vec![record(None, Some(5.0)), record(None, None)];
        let summary = summarize(&records);
        assert_eq!(
            (summary.present, summary.absent, summary.late, summary.half_day),
            (0, 0, 0, 0)
        );
        assert!((summary.total_hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn merge_is_elementwise_sum() {
        let records = vec![
            record(Some(AttendanceStatus::Present), Some(8.0)),
            record(Some(AttendanceStatus::Late), Some(6.0)),
            record(Some(AttendanceStatus::HalfDay), Some(2.0)),
        ];

        let whole = summarize(&records);
        let paged = summarize(&records[..1]).merge(summarize(&records[1..]));
        assert_eq!(paged, whole);
    }

    #[test]
    fn days_summary_double_counts_late_and_halves_half_days() {
        let records = vec![
            record(Some(AttendanceStatus::Present), Some(8.0)),
            record(Some(AttendanceStatus::Late), Some(7.0)),
            record(Some(AttendanceStatus::HalfDay), Some(3.0)),
            record(Some(AttendanceStatus::Absent), None),
        ];

        let days = summarize_attendance_days(&records);
        assert!((days.days_present - 2.5).abs() < 1e-9);
        assert_eq!(days.late, 1);
        assert_eq!(days.absent, 1);
        assert!((days.total_hours - 18.0).abs() < 1e-9);
    }

    #[test]
    fn absentees_are_profiles_without_attendance() {
        let profiles = vec![
            profile(1, "alice"),
            profile(2, "bob"),
            profile(3, "carol"),
            profile(4, "dave"),
        ];
        let present: HashSet<u64> = [2, 4].into_iter().collect();

        let absent = derive_absentees(profiles, &present);
        assert_eq!(absent.len(), 2);
        assert!(absent.iter().all(|p| !present.contains(&p.user_id)));
        // input order preserved
        assert_eq!(absent[0].name, "alice");
        assert_eq!(absent[1].name, "carol");
    }

    #[test]
    fn no_absentees_when_everyone_checked_in() {
        let profiles = vec![profile(1, "alice"), profile(2, "bob")];
        let present: HashSet<u64> = [1, 2].into_iter().collect();
        assert!(derive_absentees(profiles, &present).is_empty());
    }
}
