use super::payroll::{PayrollCalculator, ShiftPay};
use crate::models::{DayKind, Employee, HolidayFlag, Shift, SickFlag};
use crate::utils::date::{DATE_FMT, hhmm};
use crate::utils::formatting::{duration_text, round2};
use serde::Serialize;

/// Totals over a set of priced shifts.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AttendanceSummary {
    pub dni: u32,
    pub godziny: f64,
    pub soboty: u32,
    pub niedziele: u32,
    pub swieta: u32,
    pub kwota: f64,
    pub kwota_soboty: f64,
    pub kwota_niedziele: f64,
    pub kwota_swieta: f64,
    pub kwota_zwykle: f64,
    pub urlop_dni: u32,
    pub urlop_kwota: f64,
    pub chorobowe_dni: u32,
    pub chorobowe_kwota: f64,
    pub godziny_nocne: f64,
    pub godziny_nadliczbowe: f64,
}

impl AttendanceSummary {
    pub fn add(&mut self, pay: &ShiftPay) {
        match pay.kind {
            DayKind::Vacation => {
                self.urlop_dni += 1;
                self.urlop_kwota += pay.amount;
                return;
            }
            DayKind::Sick | DayKind::SickZus => {
                self.chorobowe_dni += 1;
                self.chorobowe_kwota += pay.amount;
                return;
            }
            DayKind::PublicHoliday => {
                self.swieta += 1;
                self.kwota_swieta += pay.amount;
            }
            DayKind::Sunday => {
                self.niedziele += 1;
                self.kwota_niedziele += pay.amount;
            }
            DayKind::Saturday => {
                self.soboty += 1;
                self.kwota_soboty += pay.amount;
            }
            DayKind::Regular => self.kwota_zwykle += pay.amount,
        }

        self.dni += 1;
        self.godziny += pay.hours;
        self.kwota += pay.amount;
        self.godziny_nocne += pay.night_hours;
        self.godziny_nadliczbowe += pay.overtime_hours;
    }

    /// Round the accumulated floats for output.
    pub fn finish(mut self) -> Self {
        for v in [
            &mut self.godziny,
            &mut self.kwota,
            &mut self.kwota_soboty,
            &mut self.kwota_niedziele,
            &mut self.kwota_swieta,
            &mut self.kwota_zwykle,
            &mut self.urlop_kwota,
            &mut self.chorobowe_kwota,
            &mut self.godziny_nocne,
            &mut self.godziny_nadliczbowe,
        ] {
            *v = round2(*v);
        }
        self
    }
}

/// One priced shift as shown in the attendance details report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailItem {
    pub log_id: i64,
    pub name: String,
    pub date: String,
    pub start: String,
    pub stop: String,
    pub duration: String,
    pub is_holiday: HolidayFlag,
    pub is_sick: SickFlag,
    pub kwota: f64,
    pub typ: DayKind,
    pub night_hours: f64,
    pub overtime_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AttendanceDetails {
    pub logs: Vec<DetailItem>,
    pub summary: AttendanceSummary,
}

/// Price `shifts` (closed, ordered) of one employee.
/// `history` is every closed shift of that employee.
pub fn build_details(
    calc: &PayrollCalculator<'_>,
    emp: &Employee,
    shifts: &[Shift],
    history: &[Shift],
) -> AttendanceDetails {
    let name = emp.display_name();
    let mut summary = AttendanceSummary::default();
    let mut logs = Vec::with_capacity(shifts.len());

    for s in shifts.iter().filter(|s| !s.is_open()) {
        let pay = calc.shift_pay(s, emp, history);
        summary.add(&pay);

        logs.push(DetailItem {
            log_id: s.id,
            name: name.clone(),
            date: s.start_time.format(DATE_FMT).to_string(),
            start: hhmm(&s.start_time),
            stop: s.stop_time.as_ref().map(hhmm).unwrap_or_else(|| "-".into()),
            duration: duration_text(s.worked_seconds()),
            is_holiday: s.is_holiday,
            is_sick: s.is_sick,
            kwota: pay.amount,
            typ: pay.kind,
            night_hours: pay.night_hours,
            overtime_hours: pay.overtime_hours,
        });
    }

    AttendanceDetails {
        logs,
        summary: summary.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayrollConfig;
    use crate::utils::date::parse_datetime;

    fn emp() -> Employee {
        Employee {
            id: "1".into(),
            name: "Anna Nowak".into(),
            hourly_rate: 25.0,
            rate_saturday: 0.0,
            rate_sunday: 40.0,
            rate_night: 0.0,
            rate_overtime: 0.0,
            is_admin: false,
            has_pin: false,
            created_at: None,
        }
    }

    fn shift(id: i64, start: &str, stop: &str, holiday: HolidayFlag, sick: SickFlag) -> Shift {
        Shift {
            id,
            worker_id: "1".into(),
            start_time: parse_datetime(start).unwrap(),
            start_lat: None,
            start_lon: None,
            stop_time: Some(parse_datetime(stop).unwrap()),
            stop_lat: None,
            stop_lon: None,
            duration_min: None,
            is_holiday: holiday,
            is_sick: sick,
            emergency_end: false,
            notes: String::new(),
        }
    }

    #[test]
    fn leave_days_do_not_count_as_worked() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let shifts = vec![
            shift(1, "2025-03-10 08:00", "2025-03-10 16:30", HolidayFlag::No, SickFlag::No),
            shift(2, "2025-03-16 09:00", "2025-03-16 13:00", HolidayFlag::No, SickFlag::No),
            shift(3, "2025-03-17 08:00", "2025-03-17 16:00", HolidayFlag::Yes, SickFlag::No),
            shift(4, "2025-03-18 08:00", "2025-03-18 16:00", HolidayFlag::No, SickFlag::Zus),
        ];

        let d = build_details(&calc, &emp(), &shifts, &shifts);
        let s = &d.summary;

        assert_eq!(s.dni, 2);
        assert_eq!(s.godziny, 12.5);
        assert_eq!(s.niedziele, 1);
        assert_eq!(s.kwota_niedziele, 160.0);
        assert_eq!(s.kwota_zwykle, 212.5);
        assert_eq!(s.kwota, 372.5);
        assert_eq!(s.urlop_dni, 1);
        assert_eq!(s.urlop_kwota, 200.0);
        assert_eq!(s.chorobowe_dni, 1);
        assert_eq!(s.chorobowe_kwota, 0.0);

        assert_eq!(d.logs[0].duration, "8h 30min");
        assert_eq!(d.logs[0].name, "Anna Nowak");
        assert_eq!(d.logs[1].typ, DayKind::Sunday);
        assert_eq!(d.logs[3].typ, DayKind::SickZus);
    }

    #[test]
    fn empty_input_gives_zero_summary() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let d = build_details(&calc, &emp(), &[], &[]);
        assert!(d.logs.is_empty());
        assert_eq!(d.summary, AttendanceSummary::default());
    }
}
