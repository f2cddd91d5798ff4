use serde::{Deserialize, Serialize};

/// Row of the `employees` table, without credential hashes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub hourly_rate: f64,
    pub rate_saturday: f64,
    pub rate_sunday: f64,
    pub rate_night: f64,
    pub rate_overtime: f64,
    pub is_admin: bool,
    pub has_pin: bool,
    pub created_at: Option<String>,
}

impl Employee {
    /// Everything before the first space.
    pub fn first_name(&self) -> &str {
        self.name
            .split_once(' ')
            .map(|(first, _)| first)
            .unwrap_or(&self.name)
    }

    /// Everything after the first space, possibly empty.
    pub fn last_name(&self) -> &str {
        self.name
            .split_once(' ')
            .map(|(_, last)| last)
            .unwrap_or("")
    }

    pub fn display_name(&self) -> String {
        self.name.trim().to_string()
    }

    /// Saturday rate, falling back to the hourly rate when unset.
    pub fn saturday_rate(&self) -> f64 {
        non_zero_or(self.rate_saturday, self.hourly_rate)
    }

    /// Sunday and public holiday rate.
    pub fn sunday_rate(&self) -> f64 {
        non_zero_or(self.rate_sunday, self.hourly_rate)
    }
}

fn non_zero_or(v: f64, fallback: f64) -> f64 {
    if v != 0.0 { v } else { fallback }
}

/// Join first and last name the way they are stored.
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// Pay rates, as accepted on create/update.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Rates {
    pub hourly_rate: f64,
    #[serde(default)]
    pub rate_saturday: f64,
    #[serde(default)]
    pub rate_sunday: f64,
    #[serde(default)]
    pub rate_night: f64,
    #[serde(default)]
    pub rate_overtime: f64,
}

/// Everything needed to insert a new employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub id: String,
    pub name: String,
    pub rates: Rates,
    pub pin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(name: &str) -> Employee {
        Employee {
            id: "1".into(),
            name: name.into(),
            hourly_rate: 30.0,
            rate_saturday: 0.0,
            rate_sunday: 45.0,
            rate_night: 0.0,
            rate_overtime: 0.0,
            is_admin: false,
            has_pin: false,
            created_at: None,
        }
    }

    #[test]
    fn name_splits_on_first_space() {
        let e = emp("Anna Maria Nowak");
        assert_eq!(e.first_name(), "Anna");
        assert_eq!(e.last_name(), "Maria Nowak");

        let single = emp("Cher");
        assert_eq!(single.first_name(), "Cher");
        assert_eq!(single.last_name(), "");
    }

    #[test]
    fn unset_weekend_rates_fall_back_to_hourly() {
        let e = emp("Jan Kowalski");
        assert_eq!(e.saturday_rate(), 30.0);
        assert_eq!(e.sunday_rate(), 45.0);
    }

    #[test]
    fn full_name_trims_empty_parts() {
        assert_eq!(full_name("Jan", ""), "Jan");
        assert_eq!(full_name(" Jan ", "Kowalski"), "Jan Kowalski");
    }
}
