//! `holiday` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, load config, open the store and dispatch to core
//!   services.
//! - Keep every business rule inside `holiday_core`; this binary only
//!   formats results.

mod render;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use holiday_core::{
    default_log_level, init_logging, month_window, open_db, quarter_window, year_window,
    CoreConfig, DateRange, DirectoryService, EmployeeDraft, RangeEdit, RangeRequest,
    SqliteDirectoryRepository, SqliteVacationRepository, TeamScope, Vacation, VacationKind,
    VacationService,
};
use log::info;
use render::Render;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "holiday.toml";

#[derive(Parser)]
#[command(name = "holiday", version)]
#[command(about = "Plan and review team vacation days")]
struct Cli {
    /// Config file (TOML); defaults to `holiday.toml` when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides `database_path` from config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },
    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeCommand,
    },
    /// Flip one day on or off for an employee
    Toggle { employee: i64, date: NaiveDate },
    /// Manage explicit vacation ranges
    Range {
        #[command(subcommand)]
        action: RangeCommand,
    },
    /// Replace an employee's vacation days wholesale
    Days {
        #[command(subcommand)]
        action: DaysCommand,
    },
    /// Show who is away in a calendar window
    Calendar {
        /// Only this team (by id)
        #[arg(long)]
        team: Option<i64>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Print JSON instead of a day grid
        #[arg(long)]
        json: bool,
    },
    /// Count vacation days of an employee in a year
    Total {
        employee: i64,

        #[arg(long)]
        year: i32,

        /// Count Monday to Friday only
        #[arg(long)]
        weekdays: bool,
    },
}

#[derive(Subcommand)]
enum TeamCommand {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    /// Remove a team with its employees and their vacations
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    Add {
        team: i64,
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    List {
        #[arg(long)]
        team: Option<i64>,
    },
    /// Remove an employee with its vacations
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum RangeCommand {
    Add {
        employee: i64,
        start: NaiveDate,
        end: NaiveDate,
        #[command(flatten)]
        label: LabelArgs,
    },
    /// Change dates; type and notes stay unless given
    Edit {
        id: i64,
        start: NaiveDate,
        end: NaiveDate,
        #[command(flatten)]
        label: EditLabelArgs,
    },
    Remove {
        id: i64,
    },
    List {
        employee: i64,
    },
}

#[derive(Subcommand)]
enum DaysCommand {
    /// Store exactly these days; no dates clears the employee
    Set {
        employee: i64,
        dates: Vec<NaiveDate>,
        #[command(flatten)]
        label: LabelArgs,
    },
}

#[derive(Args)]
struct LabelArgs {
    /// vacation, sick, personal or other
    #[arg(long = "type", value_parser = parse_kind, default_value = "vacation")]
    kind: VacationKind,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args)]
struct EditLabelArgs {
    /// vacation, sick, personal or other
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<VacationKind>,

    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,

    /// Drop the range's notes
    #[arg(long)]
    clear_notes: bool,
}

#[derive(Args)]
struct PeriodArgs {
    /// Month as YYYY-MM
    #[arg(long, conflicts_with_all = ["quarter", "year", "from", "to"])]
    month: Option<String>,

    /// Quarter as YYYY-Q1..YYYY-Q4
    #[arg(long, conflicts_with_all = ["year", "from", "to"])]
    quarter: Option<String>,

    #[arg(long, conflicts_with_all = ["from", "to"])]
    year: Option<i32>,

    /// First day (YYYY-MM-DD), used with --to
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD), used with --from
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("loading config `{}`", path.display()))?,
        None => CoreConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };
    if let Some(dir) = config.logging.dir.as_deref() {
        let level = config
            .logging
            .level
            .as_deref()
            .unwrap_or(default_log_level());
        init_logging(level, dir)?;
    }

    let db_path = cli.db.unwrap_or_else(|| config.database_path.clone());
    ensure_parent_dir(&db_path)?;
    let mut conn = open_db(&db_path)
        .with_context(|| format!("opening database `{}`", db_path.display()))?;
    info!(
        "event=cli_command module=cli status=start db={}",
        db_path.display()
    );

    match cli.command {
        Commands::Team { action } => run_team(&conn, action),
        Commands::Employee { action } => run_employee(&conn, action),
        Commands::Toggle { employee, date } => {
            let mut service = vacation_service(&mut conn, &config)?;
            let outcome = service.toggle_day(employee, date)?;
            println!("{} {date} for employee {employee}", outcome.action.render());
            print_rows(&outcome.ranges);
            Ok(())
        }
        Commands::Range { action } => run_range(&mut conn, &config, action),
        Commands::Days {
            action:
                DaysCommand::Set {
                    employee,
                    dates,
                    label,
                },
        } => {
            let mut service = vacation_service(&mut conn, &config)?;
            let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
            let rows = service.replace_days(employee, &days, label.kind, label.notes.as_deref())?;
            print_rows(&rows);
            Ok(())
        }
        Commands::Calendar { team, period, json } => {
            let window = resolve_window(&period)?;
            let scope = team.map_or(TeamScope::All, TeamScope::Team);
            let service = vacation_service(&mut conn, &config)?;
            let calendar = service.calendar(scope, &window)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&calendar)?);
            } else {
                print!("{}", render::calendar_grid(&calendar, &window));
            }
            Ok(())
        }
        Commands::Total {
            employee,
            year,
            weekdays,
        } => {
            let window = year_window(year)?;
            let service = vacation_service(&mut conn, &config)?;
            let count = if weekdays {
                service.vacation_weekdays(employee, &window)?
            } else {
                service.vacation_days(employee, &window)?
            };
            println!("{count}");
            Ok(())
        }
    }
}

fn run_team(conn: &Connection, action: TeamCommand) -> Result<()> {
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(conn)?);
    match action {
        TeamCommand::Add { name, description } => {
            let team = service.create_team(&name, description.as_deref())?;
            println!("{}", team.render());
        }
        TeamCommand::List => {
            for team in service.list_teams()? {
                println!("{}", team.render());
            }
        }
        TeamCommand::Remove { id } => {
            service.delete_team(id)?;
            println!("removed team {id}");
        }
    }
    Ok(())
}

fn run_employee(conn: &Connection, action: EmployeeCommand) -> Result<()> {
    let service = DirectoryService::new(SqliteDirectoryRepository::try_new(conn)?);
    match action {
        EmployeeCommand::Add {
            team,
            name,
            email,
            role,
        } => {
            let employee = service.create_employee(&EmployeeDraft {
                team_id: team,
                name,
                email,
                role,
            })?;
            println!("{}", employee.render());
        }
        EmployeeCommand::List { team } => {
            let scope = team.map_or(TeamScope::All, TeamScope::Team);
            for employee in service.list_employees(scope)? {
                println!("{}", employee.render());
            }
        }
        EmployeeCommand::Remove { id } => {
            service.delete_employee(id)?;
            println!("removed employee {id}");
        }
    }
    Ok(())
}

fn run_range(conn: &mut Connection, config: &CoreConfig, action: RangeCommand) -> Result<()> {
    let mut service = vacation_service(conn, config)?;
    match action {
        RangeCommand::Add {
            employee,
            start,
            end,
            label,
        } => {
            let created = service.create_range(&RangeRequest {
                employee_id: employee,
                start_date: start,
                end_date: end,
                kind: label.kind,
                notes: label.notes,
            })?;
            println!("{}", created.render());
        }
        RangeCommand::Edit {
            id,
            start,
            end,
            label,
        } => {
            let current = service.get_range(id)?;
            let updated = service.edit_range(id, &range_edit(&current, start, end, label))?;
            println!("{}", updated.render());
        }
        RangeCommand::Remove { id } => {
            service.delete_range(id)?;
            println!("removed vacation {id}");
        }
        RangeCommand::List { employee } => print_rows(&service.ranges(employee)?),
    }
    Ok(())
}

fn range_edit(
    current: &Vacation,
    start: NaiveDate,
    end: NaiveDate,
    label: EditLabelArgs,
) -> RangeEdit {
    let notes = if label.clear_notes {
        None
    } else {
        label.notes.or_else(|| current.notes.clone())
    };
    RangeEdit {
        start_date: start,
        end_date: end,
        kind: label.kind.unwrap_or(current.kind),
        notes,
    }
}

fn vacation_service<'conn>(
    conn: &'conn mut Connection,
    config: &CoreConfig,
) -> Result<VacationService<SqliteVacationRepository<'conn>>> {
    let repo = SqliteVacationRepository::try_new(conn)?;
    Ok(VacationService::new(repo).with_toggle_kind(config.toggle.default_kind))
}

fn print_rows(rows: &[Vacation]) {
    if rows.is_empty() {
        println!("(no vacations)");
    }
    for row in rows {
        println!("{}", row.render());
    }
}

fn resolve_window(period: &PeriodArgs) -> Result<DateRange> {
    if let Some(month) = period.month.as_deref() {
        let (year, month) = split_period(month, "")?;
        return Ok(month_window(year, month)?);
    }
    if let Some(quarter) = period.quarter.as_deref() {
        let (year, quarter) = split_period(quarter, "Q")?;
        return Ok(quarter_window(year, quarter)?);
    }
    if let Some(year) = period.year {
        return Ok(year_window(year)?);
    }
    match (period.from, period.to) {
        (Some(from), Some(to)) => Ok(DateRange::new(from, to)?),
        _ => bail!("choose a window: --month, --quarter, --year or --from/--to"),
    }
}

/// Splits `YYYY-<prefix>N` into `(year, N)`.
fn split_period(value: &str, prefix: &str) -> Result<(i32, u32)> {
    let Some((year, rest)) = value.trim().split_once('-') else {
        bail!("expected YYYY-{prefix}N, got `{value}`");
    };
    let number = rest
        .strip_prefix(prefix)
        .or_else(|| rest.strip_prefix(&prefix.to_ascii_lowercase()))
        .unwrap_or(rest);
    let year: i32 = year
        .parse()
        .with_context(|| format!("invalid year in `{value}`"))?;
    let number: u32 = number
        .parse()
        .with_context(|| format!("invalid period in `{value}`"))?;
    Ok((year, number))
}

fn parse_kind(value: &str) -> std::result::Result<VacationKind, String> {
    VacationKind::parse(value)
        .ok_or_else(|| format!("unknown type `{value}`; expected vacation|sick|personal|other"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating `{}`", parent.display()))?;
    }
    Ok(())
}
