use crate::errors::AppError;
use crate::utils::date::db_format;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `is_holiday` column: paid vacation day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HolidayFlag {
    #[default]
    No,
    Yes,
}

/// `is_sick` column. `Zus` is a sick day paid by social insurance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SickFlag {
    #[default]
    No,
    Yes,
    Zus,
}

impl HolidayFlag {
    /// Convert enum → DB string
    pub fn to_db_str(self) -> &'static str {
        match self {
            HolidayFlag::No => "nie",
            HolidayFlag::Yes => "tak",
        }
    }

    /// Lenient parse of client and legacy values.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tak" | "true" | "urlop" | "1" | "yes" => HolidayFlag::Yes,
            _ => HolidayFlag::No,
        }
    }

    pub fn is_set(self) -> bool {
        self == HolidayFlag::Yes
    }
}

impl SickFlag {
    /// Convert enum → DB string
    pub fn to_db_str(self) -> &'static str {
        match self {
            SickFlag::No => "nie",
            SickFlag::Yes => "tak",
            SickFlag::Zus => "zus",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tak" | "true" | "chorobowe" | "1" | "yes" => SickFlag::Yes,
            "zus" => SickFlag::Zus,
            _ => SickFlag::No,
        }
    }

    pub fn is_set(self) -> bool {
        self != SickFlag::No
    }
}

/// Clients send flags either as JSON booleans or as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagInput {
    Bool(bool),
    Text(String),
}

impl FlagInput {
    fn as_text(&self) -> &str {
        match self {
            FlagInput::Bool(true) => "true",
            FlagInput::Bool(false) => "false",
            FlagInput::Text(s) => s,
        }
    }
}

impl Serialize for HolidayFlag {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.to_db_str())
    }
}

impl<'de> Deserialize<'de> for HolidayFlag {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(HolidayFlag::parse(FlagInput::deserialize(d)?.as_text()))
    }
}

impl Serialize for SickFlag {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.to_db_str())
    }
}

impl<'de> Deserialize<'de> for SickFlag {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(SickFlag::parse(FlagInput::deserialize(d)?.as_text()))
    }
}

/// One clock-in/clock-out period (`attendance_logs` row).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shift {
    pub id: i64,
    pub worker_id: String,
    #[serde(serialize_with = "db_format::serialize")]
    pub start_time: NaiveDateTime,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    #[serde(serialize_with = "db_format::serialize_opt")]
    pub stop_time: Option<NaiveDateTime>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub duration_min: Option<i64>,
    pub is_holiday: HolidayFlag,
    pub is_sick: SickFlag,
    pub emergency_end: bool,
    pub notes: String,
}

impl Shift {
    pub fn is_open(&self) -> bool {
        self.stop_time.is_none()
    }

    /// Worked seconds of a closed shift, 0 while open.
    pub fn worked_seconds(&self) -> i64 {
        self.stop_time
            .map(|stop| (stop - self.start_time).num_seconds().max(0))
            .unwrap_or(0)
    }

    /// Vacation or any kind of sick leave.
    pub fn is_leave(&self) -> bool {
        self.is_holiday.is_set() || self.is_sick.is_set()
    }
}

/// Minutes between two instants, rounded to the nearest minute.
pub fn rounded_minutes(start: NaiveDateTime, stop: NaiveDateTime) -> i64 {
    ((stop - start).num_seconds() as f64 / 60.0).round() as i64
}

/// Insert payload for `attendance_logs`.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub worker_id: String,
    pub start_time: NaiveDateTime,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    pub stop_time: Option<NaiveDateTime>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub is_holiday: HolidayFlag,
    pub is_sick: SickFlag,
}

impl NewShift {
    pub fn open(worker_id: &str, start: NaiveDateTime, lat: Option<f64>, lon: Option<f64>) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            start_time: start,
            start_lat: lat,
            start_lon: lon,
            stop_time: None,
            stop_lat: None,
            stop_lon: None,
            is_holiday: HolidayFlag::No,
            is_sick: SickFlag::No,
        }
    }

    /// Closed shifts must end after they start.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.stop_time {
            Some(stop) if stop <= self.start_time => Err(AppError::BadRequest(
                "Czas zakończenia musi być późniejszy niż czas rozpoczęcia".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_bools_and_legacy_words() {
        let h: HolidayFlag = serde_json::from_str("true").unwrap();
        assert_eq!(h, HolidayFlag::Yes);
        let h: HolidayFlag = serde_json::from_str("\"urlop\"").unwrap();
        assert_eq!(h, HolidayFlag::Yes);
        let h: HolidayFlag = serde_json::from_str("\"nie\"").unwrap();
        assert_eq!(h, HolidayFlag::No);

        let s: SickFlag = serde_json::from_str("\"ZUS\"").unwrap();
        assert_eq!(s, SickFlag::Zus);
        let s: SickFlag = serde_json::from_str("\"chorobowe\"").unwrap();
        assert_eq!(s, SickFlag::Yes);
        let s: SickFlag = serde_json::from_str("false").unwrap();
        assert_eq!(s, SickFlag::No);
    }

    #[test]
    fn flags_serialize_to_storage_words() {
        assert_eq!(serde_json::to_string(&SickFlag::Zus).unwrap(), "\"zus\"");
        assert_eq!(serde_json::to_string(&HolidayFlag::Yes).unwrap(), "\"tak\"");
    }

    #[test]
    fn duration_rounds_to_nearest_minute() {
        let start = crate::utils::date::parse_datetime("2025-01-02 08:00:00").unwrap();
        let stop = crate::utils::date::parse_datetime("2025-01-02 16:00:31").unwrap();
        assert_eq!(rounded_minutes(start, stop), 481);
    }
}
