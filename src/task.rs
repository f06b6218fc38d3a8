use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    #[value(alias = "doing")]
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub status: Status,
    #[serde(rename = "created-at", with = "stamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "updated-at", with = "stamp")]
    pub updated_at: NaiveDateTime,
}

impl Task {
    pub fn new(id: u32, description: String, at: NaiveDateTime) -> Self {
        Self {
            id,
            description,
            status: Status::Todo,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Current local time truncated to the minute, the precision timestamps are stored at.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local().trunc_subsecs(0);
    now - TimeDelta::seconds(i64::from(now.second()))
}

/// Timestamps are stored as `YYYY/M/D hh:mm` with no padding on month and day.
pub(crate) mod stamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const STORAGE_FORMAT: &str = "%Y/%-m/%-d %H:%M";
    pub const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M";

    pub fn serialize<S>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&at.format(STORAGE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, STORAGE_FORMAT)
            .map_err(|err| de::Error::custom(format!("invalid timestamp '{raw}': {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn serializes_with_original_field_names() {
        let task = Task::new(1, "buy milk".to_string(), at(2024, 3, 5, 9, 7));
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["description"], "buy milk");
        assert_eq!(value["status"], "todo");
        assert_eq!(value["created-at"], "2024/3/5 09:07");
        assert_eq!(value["updated-at"], "2024/3/5 09:07");
    }

    #[test]
    fn in_progress_uses_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(Status::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn parses_padded_and_unpadded_timestamps() {
        let json = r#"{"id":3,"description":"x","status":"done",
            "created-at":"2024/11/25 23:59","updated-at":"2024/01/02 00:00"}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.created_at, at(2024, 11, 25, 23, 59));
        assert_eq!(task.updated_at, at(2024, 1, 2, 0, 0));
        assert_eq!(task.status, Status::Done);
    }

    #[test]
    fn rejects_unknown_status() {
        let json = r#"{"id":1,"description":"x","status":"blocked",
            "created-at":"2024/1/2 10:00","updated-at":"2024/1/2 10:00"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let json = r#"{"id":1,"description":"x","status":"todo",
            "created-at":"yesterday","updated-at":"2024/1/2 10:00"}"#;
        let err = serde_json::from_str::<Task>(json).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp 'yesterday'"));
    }

    #[test]
    fn display_format_reads_back_to_same_instant() {
        let original = at(2025, 7, 4, 18, 30);
        let shown = original.format(stamp::DISPLAY_FORMAT).to_string();

        assert_eq!(shown, "2025/07/04 18:30");
        assert_eq!(
            NaiveDateTime::parse_from_str(&shown, stamp::DISPLAY_FORMAT).unwrap(),
            original
        );
    }

    #[test]
    fn now_has_minute_precision() {
        let stamp = now();
        assert_eq!(stamp.second(), 0);
        assert_eq!(stamp.nanosecond(), 0);
    }
}
