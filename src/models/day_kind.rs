use serde::Serialize;

/// How a shift is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayKind {
    #[serde(rename = "zwykly")]
    Regular,
    #[serde(rename = "sobota")]
    Saturday,
    #[serde(rename = "niedziela")]
    Sunday,
    #[serde(rename = "swieto")]
    PublicHoliday,
    #[serde(rename = "urlop")]
    Vacation,
    #[serde(rename = "chorobowe")]
    Sick,
    #[serde(rename = "chorobowe_zus")]
    SickZus,
}

impl DayKind {
    pub fn code(&self) -> &'static str {
        match self {
            DayKind::Regular => "zwykly",
            DayKind::Saturday => "sobota",
            DayKind::Sunday => "niedziela",
            DayKind::PublicHoliday => "swieto",
            DayKind::Vacation => "urlop",
            DayKind::Sick => "chorobowe",
            DayKind::SickZus => "chorobowe_zus",
        }
    }

    pub fn is_leave(&self) -> bool {
        matches!(self, DayKind::Vacation | DayKind::Sick | DayKind::SickZus)
    }
}
