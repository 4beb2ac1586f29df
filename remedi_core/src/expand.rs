//! Dose expansion.
//!
//! Turns a heterogeneous list of medicines (single-dose, multi-dose, or
//! as-needed) into a flat list of per-dose-time entries with computed status,
//! ready for a chronological or grouped display. Each medicine is evaluated
//! independently; output preserves medicine order and, within a medicine,
//! the order of its `times` array.

use chrono::{NaiveDate, NaiveDateTime};

use crate::status::classify;
use crate::timeparse::minutes_since_midnight;
use crate::{DoseEntry, DoseLabel, Medicine, MedicineSchedule, StatusConfig};

/// Time string carried by as-needed entries.
///
/// Deliberately unparseable so the minutes sentinel sorts these first.
const AS_NEEDED_TIME: &str = "as needed";

/// Expand medicines into one entry per scheduled dose-time.
///
/// As-needed medicines emit exactly one entry whose status is binary (taken
/// or as-needed) and never consult the window calculator. Scheduled
/// medicines emit one entry per dose-time, each classified independently.
///
/// All dose-times of one medicine share the medicine's `taken_at`, so
/// marking any dose taken marks every dose-time of that medicine taken for
/// the invocation.
pub fn expand_doses(
    medicines: &[Medicine],
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> Vec<DoseEntry> {
    let mut entries = Vec::new();

    for medicine in medicines {
        if medicine.as_needed {
            let status = if medicine.taken_at.is_some() {
                DoseLabel::Taken
            } else {
                DoseLabel::AsNeeded
            };
            entries.push(entry_for(medicine, AS_NEEDED_TIME, 0, 1, status));
            continue;
        }

        if medicine.times.len() > 1 {
            let total = medicine.times.len();
            for (index, time) in medicine.times.iter().enumerate() {
                let schedule = medicine.schedule_for(time);
                let status = classify(&schedule, target_date, now, config);
                entries.push(entry_for(medicine, time, index, total, status.into()));
            }
            continue;
        }

        let resolved = medicine
            .times
            .first()
            .cloned()
            .or_else(|| medicine.time.clone())
            .unwrap_or_default();
        let schedule = medicine.schedule_for(&resolved);
        let status = classify(&schedule, target_date, now, config);
        entries.push(entry_for(medicine, &resolved, 0, 1, status.into()));
    }

    entries
}

/// Build the schedule entries for every fixed dose-time in a medicine list.
///
/// As-needed medicines are skipped: they have no scheduled time to classify.
/// Used by callers that want the batch folds (summary, missed predicate)
/// rather than display entries.
pub fn flatten_schedules(medicines: &[Medicine]) -> Vec<MedicineSchedule> {
    let mut schedules = Vec::new();

    for medicine in medicines {
        if medicine.as_needed {
            continue;
        }

        if medicine.times.is_empty() {
            let time = medicine.time.clone().unwrap_or_default();
            schedules.push(medicine.schedule_for(&time));
        } else {
            for time in &medicine.times {
                schedules.push(medicine.schedule_for(time));
            }
        }
    }

    schedules
}

/// Rename `Missed` to `Overdue` for the "today" display context.
///
/// Cosmetic relabeling only; the underlying classification is unchanged.
pub fn relabel_missed_as_overdue(entries: &mut [DoseEntry]) {
    for entry in entries {
        if entry.status == DoseLabel::Missed {
            entry.status = DoseLabel::Overdue;
        }
    }
}

/// Sort entries by time of day, stable.
///
/// As-needed entries sort first via the `-1` minutes sentinel; entries with
/// equal times keep their relative order.
pub fn sort_chronological(entries: &mut [DoseEntry]) {
    entries.sort_by_key(|e| minutes_since_midnight(&e.time));
}

fn entry_for(
    medicine: &Medicine,
    time: &str,
    dose_index: usize,
    total_doses: usize,
    status: DoseLabel,
) -> DoseEntry {
    DoseEntry {
        original_id: medicine.id.clone(),
        name: medicine.name.clone(),
        dosage: medicine.dosage.clone(),
        period: medicine.period,
        time: time.to_string(),
        dose_index,
        total_doses,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_STATUS_CONFIG;
    use chrono::{NaiveDate, Utc};

    fn medicine(id: &str) -> Medicine {
        Medicine {
            id: id.into(),
            name: format!("med {}", id),
            dosage: "1 tablet".into(),
            period: None,
            as_needed: false,
            time: None,
            times: vec![],
            taken_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_as_needed_expands_to_single_binary_entry() {
        let mut med = medicine("prn");
        med.as_needed = true;

        let now = date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let entries = expand_doses(
            std::slice::from_ref(&med),
            date(2024, 1, 15),
            now,
            &DEFAULT_STATUS_CONFIG,
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, DoseLabel::AsNeeded);
        assert_eq!(entries[0].total_doses, 1);

        med.taken_at = Some(Utc::now());
        let entries = expand_doses(&[med], date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, DoseLabel::Taken);
    }

    #[test]
    fn test_multi_dose_fan_out() {
        let mut med = medicine("aspirin");
        med.times = vec!["08:00 AM".into(), "08:00 PM".into()];

        let now = date(2024, 1, 15).and_hms_opt(8, 0, 0).unwrap();
        let entries = expand_doses(&[med], date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].dose_index, 0);
        assert_eq!(entries[0].status, DoseLabel::Pending);
        assert_eq!(entries[1].dose_index, 1);
        assert_eq!(entries[1].status, DoseLabel::Upcoming);
        assert!(entries.iter().all(|e| e.total_doses == 2));
    }

    #[test]
    fn test_shared_taken_at_marks_every_dose_time() {
        let mut med = medicine("aspirin");
        med.times = vec!["08:00 AM".into(), "08:00 PM".into()];
        med.taken_at = Some(Utc::now());

        let now = date(2024, 1, 15).and_hms_opt(8, 0, 0).unwrap();
        let entries = expand_doses(&[med], date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG);

        assert!(entries.iter().all(|e| e.status == DoseLabel::Taken));
    }

    #[test]
    fn test_single_time_resolution_prefers_times_array() {
        let mut from_array = medicine("a");
        from_array.times = vec!["09:00 AM".into()];
        from_array.time = Some("03:00 PM".into());

        let mut from_field = medicine("b");
        from_field.time = Some("03:00 PM".into());

        let mut bare = medicine("c");
        bare.time = None;

        let now = date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let entries = expand_doses(
            &[from_array, from_field, bare],
            date(2024, 1, 15),
            now,
            &DEFAULT_STATUS_CONFIG,
        );

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].time, "09:00 AM");
        assert_eq!(entries[1].time, "03:00 PM");
        // No time at all degrades to the midnight sentinel, missed by noon
        assert_eq!(entries[2].time, "");
        assert_eq!(entries[2].status, DoseLabel::Missed);
        assert!(entries.iter().all(|e| e.dose_index == 0 && e.total_doses == 1));
    }

    #[test]
    fn test_overdue_relabel_is_cosmetic() {
        let mut med = medicine("late");
        med.times = vec!["06:00 AM".into()];

        let now = date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let mut entries = expand_doses(&[med], date(2024, 1, 15), now, &DEFAULT_STATUS_CONFIG);
        assert_eq!(entries[0].status, DoseLabel::Missed);

        relabel_missed_as_overdue(&mut entries);
        assert_eq!(entries[0].status, DoseLabel::Overdue);
    }

    #[test]
    fn test_sort_puts_as_needed_first() {
        let mut evening = medicine("evening");
        evening.times = vec!["08:00 PM".into()];
        let mut prn = medicine("prn");
        prn.as_needed = true;
        let mut morning = medicine("morning");
        morning.times = vec!["08:00 AM".into()];

        let now = date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let mut entries = expand_doses(
            &[evening, prn, morning],
            date(2024, 1, 15),
            now,
            &DEFAULT_STATUS_CONFIG,
        );

        // Expander itself preserves input order
        assert_eq!(entries[0].original_id, "evening");

        sort_chronological(&mut entries);
        assert_eq!(entries[0].original_id, "prn");
        assert_eq!(entries[1].original_id, "morning");
        assert_eq!(entries[2].original_id, "evening");
    }

    #[test]
    fn test_flatten_schedules_skips_as_needed() {
        let mut multi = medicine("multi");
        multi.times = vec!["08:00 AM".into(), "08:00 PM".into()];
        let mut prn = medicine("prn");
        prn.as_needed = true;
        let mut single = medicine("single");
        single.time = Some("12:00 PM".into());

        let schedules = flatten_schedules(&[multi, prn, single]);

        assert_eq!(schedules.len(), 3);
        assert_eq!(schedules[0].time, "08:00");
        assert_eq!(schedules[1].time, "20:00");
        assert_eq!(schedules[2].time, "12:00");
    }
}
