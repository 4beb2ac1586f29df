//! Dose status calculation.
//!
//! Classifies a single scheduled dose-time against the current instant using
//! a configurable pending window, plus pure folds over lists of schedules
//! (status lists, missed predicate, summary counts).
//!
//! Everything here is a deterministic pure function of its inputs. Callers
//! sample the clock once per batch and pass the instant in, so one rendering
//! pass classifies every dose against the same wall-clock snapshot. All
//! date/times are naive civil values; the caller decides which timezone they
//! were sampled in.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::timeparse::parse_hhmm;
use crate::{DoseStatus, MedicineSchedule, StatusConfig, StatusSummary};

/// Classify one scheduled dose-time.
///
/// A set `taken_at` short-circuits everything to `Taken`, no matter how far
/// it deviates from the scheduled time. Otherwise the target day decides:
/// a future calendar day is `Upcoming`, a past one is `Missed`, and the
/// current day falls into window math around the scheduled instant. Both
/// window endpoints are inclusive ends of the `Pending` state.
pub fn classify(
    schedule: &MedicineSchedule,
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> DoseStatus {
    if schedule.taken_at.is_some() {
        return DoseStatus::Taken;
    }

    // Calendar-day identity, not a rolling 24-hour window: 23:59 compared
    // against 00:01 the next day takes the cross-day branch.
    let today = now.date();
    if target_date != today {
        return if target_date > today {
            DoseStatus::Upcoming
        } else {
            DoseStatus::Missed
        };
    }

    let (hour, minute) = parse_hhmm(&schedule.time);
    let time_of_day = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let scheduled = target_date.and_time(time_of_day);

    let delta = (now - scheduled).num_minutes();
    if delta < -(config.pending_window_before as i64) {
        DoseStatus::Upcoming
    } else if delta <= config.pending_window_after as i64 {
        DoseStatus::Pending
    } else {
        DoseStatus::Missed
    }
}

/// Classify every schedule in a list for one date, preserving input order
pub fn statuses_for(
    schedules: &[MedicineSchedule],
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> Vec<DoseStatus> {
    schedules
        .iter()
        .map(|s| classify(s, target_date, now, config))
        .collect()
}

/// True iff any schedule in the list classifies as missed for the given date
pub fn has_missed(
    schedules: &[MedicineSchedule],
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> bool {
    schedules
        .iter()
        .any(|s| classify(s, target_date, now, config) == DoseStatus::Missed)
}

/// Per-status counts over a list of schedules for one date
pub fn summarize(
    schedules: &[MedicineSchedule],
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> StatusSummary {
    let mut summary = StatusSummary {
        total: schedules.len(),
        ..StatusSummary::default()
    };

    for schedule in schedules {
        match classify(schedule, target_date, now, config) {
            DoseStatus::Taken => summary.taken += 1,
            DoseStatus::Missed => summary.missed += 1,
            DoseStatus::Pending => summary.pending += 1,
            DoseStatus::Upcoming => summary.upcoming += 1,
        }
    }

    summary
}

/// Truncate an instant to the start of its calendar day
pub fn start_of_day(instant: NaiveDateTime) -> NaiveDateTime {
    instant.date().and_time(NaiveTime::MIN)
}

/// Calendar-day equality, ignoring time of day
pub fn same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_STATUS_CONFIG;
    use chrono::{Duration, TimeZone, Utc};

    fn schedule(time: &str) -> MedicineSchedule {
        MedicineSchedule {
            id: "aspirin".into(),
            name: "Aspirin".into(),
            time: time.into(),
            dosage: "100mg".into(),
            period: None,
            taken_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_taken_short_circuits_everything() {
        let mut sched = schedule("09:00");
        sched.taken_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        // Past day, future day, and every window position all yield Taken
        let now = at(2024, 1, 15, 12, 0);
        for target in [
            date(2024, 1, 10),
            date(2024, 1, 15),
            date(2024, 1, 20),
            date(1999, 6, 1),
        ] {
            assert_eq!(
                classify(&sched, target, now, &DEFAULT_STATUS_CONFIG),
                DoseStatus::Taken
            );
        }
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let sched = schedule("12:00");
        let target = date(2024, 1, 15);
        let scheduled = at(2024, 1, 15, 12, 0);
        let config = DEFAULT_STATUS_CONFIG;

        let cases = [
            (scheduled - Duration::minutes(31), DoseStatus::Upcoming),
            (scheduled - Duration::minutes(30), DoseStatus::Pending),
            (scheduled, DoseStatus::Pending),
            (scheduled + Duration::minutes(120), DoseStatus::Pending),
            (scheduled + Duration::minutes(121), DoseStatus::Missed),
        ];

        for (now, expected) in cases {
            assert_eq!(
                classify(&sched, target, now, &config),
                expected,
                "at {}",
                now
            );
        }
    }

    #[test]
    fn test_future_day_is_upcoming_regardless_of_time() {
        let sched = schedule("00:01");
        let now = at(2024, 1, 15, 23, 59);

        assert_eq!(
            classify(&sched, date(2024, 1, 16), now, &DEFAULT_STATUS_CONFIG),
            DoseStatus::Upcoming
        );
    }

    #[test]
    fn test_past_day_is_missed_regardless_of_time() {
        // 23:59 yesterday vs 00:01 today: only two minutes elapsed, but the
        // calendar day differs, so it classifies as missed.
        let sched = schedule("23:59");
        let now = at(2024, 1, 16, 0, 1);

        assert_eq!(
            classify(&sched, date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG),
            DoseStatus::Missed
        );
    }

    #[test]
    fn test_custom_window_config() {
        let sched = schedule("10:00");
        let target = date(2024, 3, 1);
        let config = StatusConfig {
            pending_window_before: 0,
            pending_window_after: 10,
        };

        assert_eq!(
            classify(&sched, target, at(2024, 3, 1, 9, 59), &config),
            DoseStatus::Upcoming
        );
        assert_eq!(
            classify(&sched, target, at(2024, 3, 1, 10, 0), &config),
            DoseStatus::Pending
        );
        assert_eq!(
            classify(&sched, target, at(2024, 3, 1, 10, 10), &config),
            DoseStatus::Pending
        );
        assert_eq!(
            classify(&sched, target, at(2024, 3, 1, 10, 11), &config),
            DoseStatus::Missed
        );
    }

    #[test]
    fn test_malformed_time_degrades_to_midnight() {
        let sched = schedule("not a time");
        let target = date(2024, 1, 15);

        // Treated as 00:00: well past the window by noon
        assert_eq!(
            classify(&sched, target, at(2024, 1, 15, 12, 0), &DEFAULT_STATUS_CONFIG),
            DoseStatus::Missed
        );
        // And pending right at midnight
        assert_eq!(
            classify(&sched, target, at(2024, 1, 15, 0, 0), &DEFAULT_STATUS_CONFIG),
            DoseStatus::Pending
        );
    }

    #[test]
    fn test_statuses_for_preserves_order() {
        let schedules = vec![schedule("08:00"), schedule("20:00"), schedule("12:00")];
        let now = at(2024, 1, 15, 8, 0);

        let statuses = statuses_for(&schedules, date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG);

        assert_eq!(
            statuses,
            vec![DoseStatus::Pending, DoseStatus::Upcoming, DoseStatus::Upcoming]
        );
    }

    #[test]
    fn test_has_missed() {
        let schedules = vec![schedule("06:00"), schedule("20:00")];
        let target = date(2024, 1, 15);

        assert!(has_missed(
            &schedules,
            target,
            at(2024, 1, 15, 12, 0),
            &DEFAULT_STATUS_CONFIG
        ));
        assert!(!has_missed(
            &schedules,
            target,
            at(2024, 1, 15, 6, 30),
            &DEFAULT_STATUS_CONFIG
        ));
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let mut taken = schedule("06:00");
        taken.taken_at = Some(Utc::now());

        let schedules = vec![
            taken,
            schedule("05:00"), // missed by noon
            schedule("12:30"), // pending at noon
            schedule("20:00"), // upcoming at noon
        ];

        let summary = summarize(
            &schedules,
            date(2024, 1, 15),
            at(2024, 1, 15, 12, 0),
            &DEFAULT_STATUS_CONFIG,
        );

        assert_eq!(summary.total, 4);
        assert_eq!(summary.taken, 1);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.upcoming, 1);
        assert_eq!(
            summary.taken + summary.missed + summary.pending + summary.upcoming,
            summary.total
        );
    }

    #[test]
    fn test_day_utilities() {
        let morning = at(2024, 1, 15, 8, 30);
        let night = at(2024, 1, 15, 23, 59);
        let next = at(2024, 1, 16, 0, 0);

        assert_eq!(start_of_day(night), at(2024, 1, 15, 0, 0));
        assert!(same_day(morning, night));
        assert!(!same_day(night, next));
    }
}
