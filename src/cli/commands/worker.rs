use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::workers::WorkerLogic;
use crate::db::pool::DbPool;
use crate::db::shifts::open_shift_for;
use crate::errors::AppResult;
use crate::models::{NewEmployee, Rates};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Worker {
        list,
        add,
        name,
        rate,
        pin,
        del,
        set_pin,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;
        let conn = &pool.conn;
        let iterations = cfg.security.password_iterations;

        if let Some(id) = add {
            let new = NewEmployee {
                id: id.clone(),
                name: name.clone().unwrap_or_default(),
                rates: Rates {
                    hourly_rate: rate.unwrap_or_default(),
                    ..Rates::default()
                },
                pin: pin.clone(),
            };
            let w = WorkerLogic::create(conn, &new, iterations)?;
            success(format!("Worker {} ({}) added.", w.id, w.name));
        }

        if let Some(id) = set_pin {
            WorkerLogic::set_pin(conn, id, pin.as_deref().unwrap_or_default(), iterations)?;
            success(format!("PIN of worker {id} changed."));
        }

        if let Some(id) = del {
            WorkerLogic::delete(conn, id)?;
            success(format!("Worker {id} deleted."));
        }

        if *list {
            let workers = WorkerLogic::list(conn)?;
            if workers.is_empty() {
                warning("No workers found.");
                return Ok(());
            }

            header("Workers");
            let mut table = Table::new(&["ID", "Name", "Rate", "Sat", "Sun", "PIN", "Status"]);
            for w in &workers {
                let online = open_shift_for(conn, &w.id)?.is_some();
                table.add_row(vec![
                    w.id.clone(),
                    w.name.clone(),
                    format!("{:.2}", w.hourly_rate),
                    format!("{:.2}", w.rate_saturday),
                    format!("{:.2}", w.rate_sunday),
                    if w.has_pin { "yes" } else { "no" }.to_string(),
                    format!(
                        "{}{}{}",
                        color_for_status(online),
                        if online { "on shift" } else { "off" },
                        RESET
                    ),
                ]);
            }
            print!("{}", table.render());
            info(format!("{} worker(s)", workers.len()));
        }
    }

    Ok(())
}
