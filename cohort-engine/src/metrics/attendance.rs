//! Attendance risk overview.

use super::Metrics;
use crate::records::AttendanceRecord;
use std::collections::{BTreeMap, HashMap};

const UNKNOWN_STATUS: &str = "Unknown";

impl<'a> Metrics<'a> {
    /// Attendance status distribution counting each student once, by their
    /// most recent record.
    pub fn attendance_risk_overview(&self) -> BTreeMap<String, usize> {
        let mut latest: HashMap<&str, &AttendanceRecord> = HashMap::new();
        for record in &self.view.attendance {
            let record: &AttendanceRecord = record;
            latest
                .entry(record.student_id.as_str())
                .and_modify(|current| {
                    if record.is_later_than(current) {
                        *current = record;
                    }
                })
                .or_insert(record);
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in latest.values() {
            let status = if record.status.is_empty() {
                UNKNOWN_STATUS
            } else {
                record.status.as_str()
            };
            *counts.entry(status.to_string()).or_default() += 1;
        }
        counts
    }
}
