use crate::export::{ExportFormat, ReportKind};
use clap::{Parser, Subcommand};

/// Command-line interface definition for rAttendance
/// Attendance server for mobile clients plus admin tooling on SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Employee attendance server: shifts, payroll reports and admin tooling on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Start the HTTP API server
    Serve {
        #[arg(long, help = "Address to bind (default from config: server.host)")]
        host: Option<String>,

        #[arg(long, help = "Port to listen on (default from config: server.port)")]
        port: Option<u16>,
    },

    /// Manage the configuration file (view, check, migrate or edit)
    Config {
        /// Print the current configuration file to stdout
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "List keys missing from the configuration file")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing keys with their default values")]
        migrate: bool,

        /// Edit the configuration file with your preferred editor
        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        /// Specify the editor to use (overrides $EDITOR/$VISUAL).
        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal operation log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, help = "Show only the N most recent rows")]
        limit: Option<i64>,
    },

    /// Create, list, restore or prune database backups
    Backup {
        #[arg(
            long,
            value_name = "FILE",
            help = "Backup destination (default: backups/ under the config directory)"
        )]
        file: Option<String>,

        #[arg(long, help = "Gzip the backup copy")]
        compress: bool,

        #[arg(long, help = "List backups in the backup directory")]
        list: bool,

        #[arg(long, value_name = "FILE", help = "Replace the database with this backup")]
        restore: Option<String>,

        #[arg(long, help = "Remove old backups from the backup directory")]
        cleanup: bool,

        #[arg(long = "keep-days", default_value_t = 30, help = "Cleanup: keep backups newer than N days")]
        keep_days: i64,

        #[arg(long = "keep-count", default_value_t = 10, help = "Cleanup: always keep the N newest backups")]
        keep_count: usize,

        #[arg(long, short = 'f', help = "Overwrite without asking")]
        force: bool,
    },

    /// Export a report to a file
    Export {
        #[arg(long, value_enum, default_value = "summary")]
        report: ReportKind,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Output file (default: generated report name)")]
        file: Option<String>,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Period: YYYY, YYYY-MM, YYYY-MM-DD or start:end (default: current month)"
        )]
        range: Option<String>,

        #[arg(long, value_name = "ID", help = "Worker id (required for the details report)")]
        worker: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Manage workers
    Worker {
        #[arg(long, help = "List workers")]
        list: bool,

        #[arg(long, value_name = "ID", requires_all = ["name", "rate"], help = "Add a worker with this id")]
        add: Option<String>,

        #[arg(long, help = "Full name of the new worker")]
        name: Option<String>,

        #[arg(long, help = "Hourly rate of the new worker")]
        rate: Option<f64>,

        #[arg(long, help = "PIN (4 to 6 digits) for --add or --set-pin")]
        pin: Option<String>,

        #[arg(long = "del", value_name = "ID", help = "Delete a worker, keeping their attendance history")]
        del: Option<String>,

        #[arg(long = "set-pin", value_name = "ID", requires = "pin", help = "Change the PIN of a worker")]
        set_pin: Option<String>,
    },

    /// Create an administrator account or reset its password
    Admin {
        #[arg(long, default_value = "admin")]
        id: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "Administrator")]
        name: String,
    },
}
