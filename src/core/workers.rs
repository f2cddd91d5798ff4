//! Employee administration shared by the HTTP API and the CLI.

use crate::core::auth::{hash_secret, validate_pin};
use crate::db::{employees, log::ttlog};
use crate::errors::{AppError, AppResult};
use crate::models::employee::full_name;
use crate::models::{Employee, NewEmployee, Rates};
use rusqlite::Connection;
use serde::Serialize;

/// Employee as listed by the API.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerView {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub hourly_rate: f64,
    pub rate_saturday: f64,
    pub rate_sunday: f64,
    pub rate_night: f64,
    pub rate_overtime: f64,
    pub is_admin: bool,
    pub has_pin: bool,
}

impl From<Employee> for WorkerView {
    fn from(e: Employee) -> Self {
        Self {
            first_name: e.first_name().to_string(),
            last_name: e.last_name().to_string(),
            id: e.id,
            name: e.name,
            hourly_rate: e.hourly_rate,
            rate_saturday: e.rate_saturday,
            rate_sunday: e.rate_sunday,
            rate_night: e.rate_night,
            rate_overtime: e.rate_overtime,
            is_admin: e.is_admin,
            has_pin: e.has_pin,
        }
    }
}

/// Edit form of a single worker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerDetail {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub hourly_rate: f64,
    pub rate_saturday: f64,
    pub rate_sunday: f64,
    pub rate_night: f64,
    pub rate_overtime: f64,
}

/// Changes accepted by `PUT /worker/{id}`. Unset rates keep their value.
#[derive(Debug, Clone, Default)]
pub struct WorkerUpdate {
    pub first_name: String,
    pub last_name: String,
    pub rate: f64,
    pub rate_saturday: Option<f64>,
    pub rate_sunday: Option<f64>,
    pub rate_night: Option<f64>,
    pub rate_overtime: Option<f64>,
    pub pin: Option<String>,
    pub new_id: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Worker not found".into())
}

pub struct WorkerLogic;

impl WorkerLogic {
    pub fn list(conn: &Connection) -> AppResult<Vec<WorkerView>> {
        Ok(employees::list_employees(conn)?
            .into_iter()
            .map(WorkerView::from)
            .collect())
    }

    pub fn get(conn: &Connection, id: &str) -> AppResult<WorkerView> {
        employees::find_employee(conn, id)?
            .map(WorkerView::from)
            .ok_or_else(not_found)
    }

    pub fn detail(conn: &Connection, id: &str) -> AppResult<WorkerDetail> {
        let e = employees::find_employee(conn, id)?.ok_or_else(not_found)?;
        Ok(WorkerDetail {
            id: e.id.clone(),
            first_name: e.first_name().to_string(),
            last_name: e.last_name().to_string(),
            hourly_rate: e.hourly_rate,
            rate_saturday: e.rate_saturday,
            rate_sunday: e.rate_sunday,
            rate_night: e.rate_night,
            rate_overtime: e.rate_overtime,
        })
    }

    pub fn create(conn: &Connection, new: &NewEmployee, iterations: u32) -> AppResult<WorkerView> {
        let id = new.id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("ID pracownika nie może być puste".into()));
        }
        if employees::employee_exists(conn, id)? {
            return Err(AppError::Conflict("Pracownik o tym ID już istnieje".into()));
        }

        let pin_hash = match new.pin.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(pin) => {
                validate_pin(pin)?;
                Some(hash_secret(pin, iterations))
            }
            None => None,
        };

        employees::insert_employee(conn, id, new.name.trim(), &new.rates, pin_hash.as_deref())?;
        ttlog(conn, "add", id, &format!("Employee '{}' created", new.name.trim()))?;

        Self::get(conn, id)
    }

    pub fn update(conn: &Connection, id: &str, upd: &WorkerUpdate, iterations: u32) -> AppResult<()> {
        let current = employees::find_employee(conn, id)?.ok_or_else(not_found)?;

        let rates = Rates {
            hourly_rate: upd.rate,
            rate_saturday: upd.rate_saturday.unwrap_or(current.rate_saturday),
            rate_sunday: upd.rate_sunday.unwrap_or(current.rate_sunday),
            rate_night: upd.rate_night.unwrap_or(current.rate_night),
            rate_overtime: upd.rate_overtime.unwrap_or(current.rate_overtime),
        };
        let name = full_name(&upd.first_name, &upd.last_name);

        let pin_hash = match upd.pin.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(pin) => {
                validate_pin(pin)?;
                Some(hash_secret(pin, iterations))
            }
            None => None,
        };

        let target = match upd.new_id.as_deref().map(str::trim) {
            Some(new_id) if !new_id.is_empty() && new_id != id => {
                if employees::employee_exists(conn, new_id)? {
                    return Err(AppError::Conflict("Pracownik o tym ID już istnieje".into()));
                }
                new_id
            }
            _ => id,
        };

        let tx = conn.unchecked_transaction()?;
        employees::update_employee(&tx, id, &name, &rates)?;
        if let Some(hash) = &pin_hash {
            employees::set_pin_hash(&tx, id, hash)?;
        }
        if target != id {
            employees::rename_employee(&tx, id, target)?;
        }
        ttlog(&tx, "edit", target, &format!("Employee '{name}' updated"))?;
        tx.commit()?;

        Ok(())
    }

    /// Name and hourly rate only.
    pub fn update_basic(conn: &Connection, id: &str, first: &str, last: &str, rate: f64) -> AppResult<()> {
        let name = full_name(first, last);
        if !employees::update_name_and_rate(conn, id, &name, rate)? {
            return Err(not_found());
        }
        ttlog(conn, "edit", id, &format!("Employee '{name}' updated"))?;
        Ok(())
    }

    /// Remove an employee. Attendance history stays in place.
    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        if !employees::delete_employee(conn, id)? {
            return Err(AppError::NotFound("Pracownik nie istnieje".into()));
        }
        ttlog(conn, "del", id, "Employee deleted")?;
        Ok(())
    }

    pub fn set_pin(conn: &Connection, id: &str, pin: &str, iterations: u32) -> AppResult<()> {
        validate_pin(pin.trim())?;
        if !employees::set_pin_hash(conn, id, &hash_secret(pin.trim(), iterations))? {
            return Err(not_found());
        }
        ttlog(conn, "edit", id, "PIN changed")?;
        Ok(())
    }

    /// Create an administrator account or reset its password.
    pub fn upsert_admin(conn: &Connection, id: &str, name: &str, password: &str, iterations: u32) -> AppResult<()> {
        if id.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Administrator id and password must not be empty".into(),
            ));
        }
        employees::upsert_admin(conn, id.trim(), name.trim(), &hash_secret(password, iterations))?;
        ttlog(conn, "admin", id.trim(), "Administrator account saved")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        c
    }

    fn new(id: &str, pin: Option<&str>) -> NewEmployee {
        NewEmployee {
            id: id.into(),
            name: "Jan Kowalski".into(),
            rates: Rates {
                hourly_rate: 30.0,
                ..Rates::default()
            },
            pin: pin.map(String::from),
        }
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let c = conn();
        WorkerLogic::create(&c, &new("10", Some("1234")), 1).unwrap();
        let err = WorkerLogic::create(&c, &new("10", None), 1).unwrap_err();
        assert_eq!(err.to_string(), "Pracownik o tym ID już istnieje");
    }

    #[test]
    fn bad_pin_is_rejected() {
        let c = conn();
        assert!(matches!(
            WorkerLogic::create(&c, &new("10", Some("12")), 1),
            Err(AppError::InvalidPin)
        ));
    }

    #[test]
    fn rename_moves_attendance() {
        let c = conn();
        WorkerLogic::create(&c, &new("10", None), 1).unwrap();
        crate::db::shifts::insert_shift(
            &c,
            &crate::models::NewShift::open("10", crate::utils::date::now(), None, None),
        )
        .unwrap();

        let upd = WorkerUpdate {
            first_name: "Jan".into(),
            last_name: "Nowak".into(),
            rate: 35.0,
            rate_sunday: Some(50.0),
            new_id: Some("11".into()),
            ..WorkerUpdate::default()
        };
        WorkerLogic::update(&c, "10", &upd, 1).unwrap();

        let w = WorkerLogic::detail(&c, "11").unwrap();
        assert_eq!(w.last_name, "Nowak");
        assert_eq!(w.hourly_rate, 35.0);
        assert_eq!(w.rate_sunday, 50.0);
        assert!(WorkerLogic::get(&c, "10").is_err());
        assert!(crate::db::shifts::open_shift_for(&c, "11").unwrap().is_some());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let c = conn();
        assert!(matches!(
            WorkerLogic::delete(&c, "nope"),
            Err(AppError::NotFound(_))
        ));
    }
}
