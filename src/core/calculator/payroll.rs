//! Per-shift pay: day classification, night/overtime premiums and paid
//! leave averaged over the worker's recent history.

use super::holidays::is_public_holiday;
use crate::config::PayrollConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{DayKind, Employee, HolidayFlag, Shift, SickFlag};
use crate::utils::formatting::{hours, round2};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};

/// Result of pricing one closed shift.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftPay {
    pub kind: DayKind,
    /// Clock hours between start and stop.
    pub hours: f64,
    pub amount: f64,
    pub night_hours: f64,
    pub overtime_hours: f64,
}

/// Day type of a shift and the base hourly rate that applies to it.
/// Leave days carry a rate of 0, their amount comes from averaging.
pub fn classify(shift: &Shift, emp: &Employee) -> (DayKind, f64) {
    if shift.is_holiday == HolidayFlag::Yes {
        return (DayKind::Vacation, 0.0);
    }
    match shift.is_sick {
        SickFlag::Yes => return (DayKind::Sick, 0.0),
        SickFlag::Zus => return (DayKind::SickZus, 0.0),
        SickFlag::No => {}
    }

    let day = shift.start_time.date();
    if is_public_holiday(day) {
        (DayKind::PublicHoliday, emp.sunday_rate())
    } else {
        match day.weekday() {
            Weekday::Sun => (DayKind::Sunday, emp.sunday_rate()),
            Weekday::Sat => (DayKind::Saturday, emp.saturday_rate()),
            _ => (DayKind::Regular, emp.hourly_rate),
        }
    }
}

fn parse_clock(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
        AppError::Config(format!("payroll: invalid clock time '{raw}', expected HH:MM"))
    })
}

pub struct PayrollCalculator<'a> {
    cfg: &'a PayrollConfig,
    night_start: NaiveTime,
    night_end: NaiveTime,
    overtime_after: Duration,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(cfg: &'a PayrollConfig) -> AppResult<Self> {
        Ok(Self {
            cfg,
            night_start: parse_clock(&cfg.night_start)?,
            night_end: parse_clock(&cfg.night_end)?,
            overtime_after: Duration::seconds((cfg.overtime_after_hours * 3600.0).round() as i64),
        })
    }

    fn is_night(&self, t: NaiveTime) -> bool {
        if self.night_start == self.night_end {
            return false;
        }
        if self.night_start < self.night_end {
            t >= self.night_start && t < self.night_end
        } else {
            t >= self.night_start || t < self.night_end
        }
    }

    /// First overtime instant of a shift started at `start`, if representable.
    fn overtime_from(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        start.checked_add_signed(self.overtime_after)
    }

    /// Instants where the pay rate may change inside `[start, stop)`.
    fn boundaries(&self, start: NaiveDateTime, stop: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut points = vec![start, stop];

        let mut day = start.date().pred_opt().unwrap_or(start.date());
        while day <= stop.date() {
            for t in [self.night_start, self.night_end] {
                let p = day.and_time(t);
                if p > start && p < stop {
                    points.push(p);
                }
            }
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }

        if let Some(ot) = self.overtime_from(start)
            && ot > start
            && ot < stop
        {
            points.push(ot);
        }

        points.sort();
        points.dedup();
        points
    }

    /// Amount of a worked (non leave) shift at `base` per hour.
    fn worked_pay(&self, shift: &Shift, emp: &Employee, kind: DayKind, base: f64) -> ShiftPay {
        let Some(stop) = shift.stop_time else {
            return ShiftPay {
                kind,
                hours: 0.0,
                amount: 0.0,
                night_hours: 0.0,
                overtime_hours: 0.0,
            };
        };
        let start = shift.start_time;
        let total = hours(shift.worked_seconds());

        let overtime_from = self.overtime_from(start).unwrap_or(NaiveDateTime::MAX);
        let mut premium = 0.0;
        let mut night_hours = 0.0;
        let mut overtime_hours = 0.0;

        for pair in self.boundaries(start, stop).windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let h = hours((b - a).num_seconds());
            let night = self.is_night(a.time());
            let overtime = a >= overtime_from;

            let mut rate = base;
            if night {
                night_hours += h;
                if emp.rate_night > 0.0 {
                    rate = rate.max(emp.rate_night);
                }
            }
            if overtime {
                overtime_hours += h;
                if emp.rate_overtime > 0.0 {
                    rate = rate.max(emp.rate_overtime);
                }
            }
            premium += (rate - base) * h;
        }

        ShiftPay {
            kind,
            hours: total,
            amount: round2(base * total + premium),
            night_hours: round2(night_hours),
            overtime_hours: round2(overtime_hours),
        }
    }

    /// Hourly average of worked shifts in `[at - window_days, at]`.
    fn average_rate(&self, history: &[Shift], emp: &Employee, at: NaiveDateTime, window_days: i64) -> f64 {
        let from = at
            .checked_sub_signed(Duration::days(window_days))
            .unwrap_or(NaiveDateTime::MIN);
        let (sum, total_hours) = history
            .iter()
            .filter(|s| !s.is_open() && !s.is_leave())
            .filter(|s| s.start_time >= from && s.start_time <= at)
            .fold((0.0, 0.0), |(sum, h), s| {
                let sh = hours(s.worked_seconds());
                (sum + sh * emp.hourly_rate, h + sh)
            });

        if total_hours > 0.0 {
            sum / total_hours
        } else {
            emp.hourly_rate
        }
    }

    /// Price one closed shift. `history` holds the worker's closed shifts
    /// and is only consulted for leave days.
    pub fn shift_pay(&self, shift: &Shift, emp: &Employee, history: &[Shift]) -> ShiftPay {
        let (kind, base) = classify(shift, emp);
        let leave = |amount: f64| ShiftPay {
            kind,
            hours: hours(shift.worked_seconds()),
            amount,
            night_hours: 0.0,
            overtime_hours: 0.0,
        };

        match kind {
            DayKind::Vacation => {
                let avg = self.average_rate(history, emp, shift.start_time, self.cfg.vacation_window_days);
                leave(round2(avg * self.cfg.paid_leave_hours))
            }
            DayKind::Sick => {
                let avg = self.average_rate(history, emp, shift.start_time, self.cfg.sick_window_days);
                leave(round2(avg * self.cfg.sick_pay_ratio * self.cfg.paid_leave_hours))
            }
            DayKind::SickZus => leave(0.0),
            _ => self.worked_pay(shift, emp, kind, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_datetime;

    fn emp() -> Employee {
        Employee {
            id: "7".into(),
            name: "Jan Kowalski".into(),
            hourly_rate: 30.0,
            rate_saturday: 40.0,
            rate_sunday: 50.0,
            rate_night: 0.0,
            rate_overtime: 0.0,
            is_admin: false,
            has_pin: true,
            created_at: None,
        }
    }

    fn shift(id: i64, start: &str, stop: &str) -> Shift {
        Shift {
            id,
            worker_id: "7".into(),
            start_time: parse_datetime(start).unwrap(),
            start_lat: None,
            start_lon: None,
            stop_time: Some(parse_datetime(stop).unwrap()),
            stop_lat: None,
            stop_lon: None,
            duration_min: None,
            is_holiday: HolidayFlag::No,
            is_sick: SickFlag::No,
            emergency_end: false,
            notes: String::new(),
        }
    }

    #[test]
    fn weekday_weekend_and_holiday_rates() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let e = emp();

        // Monday
        let p = calc.shift_pay(&shift(1, "2025-03-10 08:00", "2025-03-10 16:00"), &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::Regular, 240.0));
        // Saturday
        let p = calc.shift_pay(&shift(2, "2025-03-15 08:00", "2025-03-15 12:00"), &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::Saturday, 160.0));
        // Sunday
        let p = calc.shift_pay(&shift(3, "2025-03-16 08:00", "2025-03-16 12:00"), &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::Sunday, 200.0));
        // Labour Day on a Thursday pays the Sunday rate
        let p = calc.shift_pay(&shift(4, "2025-05-01 08:00", "2025-05-01 10:00"), &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::PublicHoliday, 100.0));
    }

    #[test]
    fn unset_saturday_rate_uses_hourly() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let mut e = emp();
        e.rate_saturday = 0.0;

        let p = calc.shift_pay(&shift(1, "2025-03-15 08:00", "2025-03-15 10:00"), &e, &[]);
        assert_eq!(p.amount, 60.0);
    }

    #[test]
    fn night_and_overtime_premiums_use_the_higher_rate() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let mut e = emp();
        e.rate_night = 36.0;
        e.rate_overtime = 45.0;

        // 14:00 -> 00:00 on a Monday, the last two hours are both night and overtime
        let s = shift(1, "2025-03-10 14:00", "2025-03-11 00:00");
        let p = calc.shift_pay(&s, &e, &[]);
        assert_eq!(p.night_hours, 2.0);
        assert_eq!(p.overtime_hours, 2.0);
        // 10h * 30, plus (45 - 30) * 2h
        assert_eq!(p.amount, 330.0);
    }

    #[test]
    fn last_representable_day_is_priced() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let mut e = emp();
        e.rate_night = 36.0;

        let mut s = shift(1, "2025-03-10 08:00", "2025-03-10 09:00");
        s.start_time = chrono::NaiveDate::MAX.and_hms_opt(20, 0, 0).unwrap();
        s.stop_time = chrono::NaiveDate::MAX.and_hms_opt(23, 0, 0);
        let p = calc.shift_pay(&s, &e, &[]);
        assert_eq!(p.hours, 3.0);
        assert_eq!(p.night_hours, 1.0);
        assert_eq!(p.overtime_hours, 0.0);

        s.is_holiday = HolidayFlag::Yes;
        let p = calc.shift_pay(&s, &e, &[]);
        assert_eq!(p.kind, DayKind::Vacation);
    }

    #[test]
    fn zero_premium_rates_keep_plain_amount() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let s = shift(1, "2025-03-10 20:00", "2025-03-11 07:30");
        let p = calc.shift_pay(&s, &emp(), &[]);
        assert_eq!(p.amount, 345.0);
        assert_eq!(p.night_hours, 8.0);
        assert_eq!(p.overtime_hours, 3.5);
    }

    #[test]
    fn vacation_averages_recent_work() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let e = emp();

        let history = vec![
            shift(1, "2025-03-03 08:00", "2025-03-03 16:00"),
            shift(2, "2025-03-04 08:00", "2025-03-04 12:00"),
        ];
        let mut v = shift(3, "2025-03-05 08:00", "2025-03-05 16:00");
        v.is_holiday = HolidayFlag::Yes;

        let p = calc.shift_pay(&v, &e, &history);
        assert_eq!(p.kind, DayKind::Vacation);
        assert_eq!(p.amount, 240.0);
    }

    #[test]
    fn sick_pay_is_eighty_percent_and_zus_is_unpaid() {
        let cfg = PayrollConfig::default();
        let calc = PayrollCalculator::new(&cfg).unwrap();
        let e = emp();

        let mut s = shift(1, "2025-03-05 08:00", "2025-03-05 16:00");
        s.is_sick = SickFlag::Yes;
        let p = calc.shift_pay(&s, &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::Sick, 192.0));

        s.is_sick = SickFlag::Zus;
        let p = calc.shift_pay(&s, &e, &[]);
        assert_eq!((p.kind, p.amount), (DayKind::SickZus, 0.0));
    }

    #[test]
    fn vacation_flag_wins_over_sick() {
        let mut s = shift(1, "2025-03-05 08:00", "2025-03-05 16:00");
        s.is_holiday = HolidayFlag::Yes;
        s.is_sick = SickFlag::Yes;
        assert_eq!(classify(&s, &emp()).0, DayKind::Vacation);
    }

    #[test]
    fn bad_night_window_is_a_config_error() {
        let cfg = PayrollConfig {
            night_start: "late".into(),
            ..PayrollConfig::default()
        };
        assert!(matches!(
            PayrollCalculator::new(&cfg),
            Err(AppError::Config(_))
        ));
    }
}
