//! # iFinance
//!
//! Terminal admin console for the iFinance organisation records: departments,
//! roles, users, teams, tasks, task submissions and contacts.
//!
//! ## Usage
//!
//! ```bash
//! ifinance login admin@example.com secret
//! ifinance departments list --parent Development
//! ifinance departments add --name QA --parent Development
//! ifinance departments rename Development Engineering --cascade-references
//! ifinance tasks add --title "Quarterly report" --deadline today --then save-and-continue
//! ifinance users delete 2 --yes
//! ifinance ui
//! ```
//!
//! ## Data Storage
//!
//! Each collection is a JSON file in the local data directory:
//! *   Linux: `~/.local/share/ifinance/`
//! *   macOS: `~/Library/Application Support/ifinance/`
//! *   Windows: `%APPDATA%\ifinance\`
//!
//! Override it with `--data-dir` or the `IFINANCE_DATA` environment variable.
//! Collections missing on disk are seeded with default records on first use.
//!
//! ## Logging
//!
//! Diagnostics go to stderr. Set the filter with `--log-level` or
//! `IFINANCE_LOG` (for example `debug` or `ifinance=info`); the default is `warn`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ifinance::commands::*;
use ifinance::config::Config;
use ifinance::error::AppError;
use ifinance::forms::SaveMode;
use ifinance::models::{Contact, Department, Entity, Priority, Role, Task, TaskStatus, TaskSubmission, Team, User};
use ifinance::pages::{DateWindow, MultiSelect, SubmissionFilters, UserFilters};
use ifinance::session;
use ifinance::storage::{FileStore, KeyValueStore};
use ifinance::tui::run_tui;

#[derive(Parser)]
#[command(name = "ifinance")]
#[command(about = "iFinance admin console", long_about = None)]
struct Cli {
    /// Directory holding the collection files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `ifinance=info`
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in; any non-empty email and password are accepted
    Login {
        email: String,
        password: String,
    },
    /// Sign out
    Logout,
    /// Manage departments
    Departments {
        #[command(subcommand)]
        command: DepartmentCommands,
    },
    /// Manage roles
    Roles {
        #[command(subcommand)]
        command: SimpleCommands<RoleArgs>,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage teams
    Teams {
        #[command(subcommand)]
        command: SimpleCommands<TeamArgs>,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage task submissions
    Submissions {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
    /// Manage contacts
    Contacts {
        #[command(subcommand)]
        command: SimpleCommands<ContactArgs>,
    },
    /// Delete all stored data, sequences and session included
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

/// Add, edit and delete, shared by every collection.
#[derive(Subcommand)]
enum RecordCommands<A: clap::Args> {
    /// Create a record
    Add {
        #[command(flatten)]
        fields: A,
        /// Where to go after saving
        #[arg(long, value_enum, default_value_t = SaveMode::SaveAndList)]
        then: SaveMode,
    },
    /// Change a record; unset flags keep their value
    Edit {
        id: u64,
        #[command(flatten)]
        fields: A,
        #[arg(long, value_enum, default_value_t = SaveMode::SaveAndList)]
        then: SaveMode,
    },
    /// Delete a record
    Delete {
        id: u64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Collections whose list has no filters beyond search.
#[derive(Subcommand)]
enum SimpleCommands<A: clap::Args> {
    /// List records
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    #[command(flatten)]
    Records(RecordCommands<A>),
}

#[derive(Subcommand)]
enum DepartmentCommands {
    /// List departments
    List {
        /// Only departments under this parent (`-` for top-level); repeatable
        #[arg(long)]
        parent: Vec<String>,
        /// Print the available filter values
        #[arg(long)]
        show_filters: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Rename a department and every reference to it
    Rename {
        old: String,
        new: String,
        /// Also update users and teams in that department
        #[arg(long)]
        cascade_references: bool,
    },
    /// Create a top-level department by name
    QuickAdd {
        name: String,
    },
    /// Show the parent of a department
    Parent {
        id: u64,
    },
    #[command(flatten)]
    Records(RecordCommands<DepartmentArgs>),
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        #[arg(long)]
        role: Vec<String>,
        #[arg(long)]
        department: Vec<String>,
        /// `Yes` or `No`
        #[arg(long)]
        staff: Vec<String>,
        #[arg(long)]
        show_filters: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    #[command(flatten)]
    Records(RecordCommands<UserArgs>),
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        #[arg(long, value_enum)]
        status: Vec<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Vec<Priority>,
        #[arg(long, value_enum, default_value_t = DateWindow::AnyDate)]
        deadline: DateWindow,
        #[arg(long)]
        show_filters: bool,
        #[command(flatten)]
        list: ListArgs,
    },
    #[command(flatten)]
    Records(RecordCommands<TaskArgs>),
}

#[derive(Subcommand)]
enum SubmissionCommands {
    /// List task submissions
    List {
        #[arg(long, value_enum, default_value_t = DateWindow::AnyDate)]
        created: DateWindow,
        /// Priority of the submitted task; repeatable
        #[arg(long, value_enum)]
        priority: Vec<Priority>,
        #[command(flatten)]
        list: ListArgs,
    },
    #[command(flatten)]
    Records(RecordCommands<SubmissionArgs>),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Runs add, edit or delete. `save` performs add and edit.
fn run_records<E, A, S>(store: &dyn KeyValueStore, command: RecordCommands<A>, save: S) -> Result<(), AppError>
where
    E: Entity,
    A: clap::Args,
    S: FnOnce(Option<u64>, &A, SaveMode) -> Result<E, AppError>,
{
    match command {
        RecordCommands::Add { fields, then } => save(None, &fields, then).map(|_| ()),
        RecordCommands::Edit { id, fields, then } => save(Some(id), &fields, then).map(|_| ()),
        RecordCommands::Delete { id, yes } => cmd_delete::<E>(store, id, yes, false).map(|_| ()),
    }
}

fn run(cli: Cli, config: &Config) -> Result<(), AppError> {
    let store = FileStore::open(&config.data_dir)?;
    let store: &dyn KeyValueStore = &store;

    let command = cli.command.unwrap_or(Commands::Ui);
    if !matches!(command, Commands::Login { .. } | Commands::Logout | Commands::Reset { .. } | Commands::Completions { .. }) {
        session::require_auth(store)?;
    }

    match command {
        Commands::Login { email, password } => cmd_login(store, &email, &password, false),
        Commands::Logout => cmd_logout(store, false),
        Commands::Departments { command } => match command {
            DepartmentCommands::List { parent, show_filters, list } => cmd_department_list(store, &parent, show_filters, &list),
            DepartmentCommands::Rename { old, new, cascade_references } => cmd_department_rename(store, &old, &new, cascade_references, false),
            DepartmentCommands::QuickAdd { name } => cmd_department_quick_add(store, &name, false).map(|_| ()),
            DepartmentCommands::Parent { id } => cmd_department_parent(store, id, false).map(|_| ()),
            DepartmentCommands::Records(records) => run_records::<Department, _, _>(store, records, |id, a, then| {
                cmd_department_save(store, id, a, then, false)
            }),
        },
        Commands::Roles { command } => match command {
            SimpleCommands::List { list } => cmd_role_list(store, &list),
            SimpleCommands::Records(records) => run_records::<Role, _, _>(store, records, |id, a, then| {
                cmd_role_save(store, id, a, then, false)
            }),
        },
        Commands::Users { command } => match command {
            UserCommands::List { role, department, staff, show_filters, list } => {
                let filters = UserFilters {
                    roles: MultiSelect::of(&role),
                    departments: MultiSelect::of(&department),
                    staff_status: MultiSelect::of(&staff),
                };
                cmd_user_list(store, &filters, show_filters, &list)
            }
            UserCommands::Records(records) => run_records::<User, _, _>(store, records, |id, a, then| {
                cmd_user_save(store, id, a, then, false)
            }),
        },
        Commands::Teams { command } => match command {
            SimpleCommands::List { list } => cmd_team_list(store, &list),
            SimpleCommands::Records(records) => run_records::<Team, _, _>(store, records, |id, a, then| {
                cmd_team_save(store, id, a, then, false)
            }),
        },
        Commands::Tasks { command } => match command {
            TaskCommands::List { status, priority, deadline, show_filters, list } => {
                cmd_task_list(store, &task_filters(&status, &priority, deadline), show_filters, &list)
            }
            TaskCommands::Records(records) => run_records::<Task, _, _>(store, records, |id, a, then| {
                cmd_task_save(store, id, a, then, false)
            }),
        },
        Commands::Submissions { command } => match command {
            SubmissionCommands::List { created, priority, list } => {
                let filters = SubmissionFilters {
                    created_at: created,
                    priority: MultiSelect::of(priority.iter().map(|p| p.to_string())),
                };
                cmd_submission_list(store, &filters, &list)
            }
            SubmissionCommands::Records(records) => run_records::<TaskSubmission, _, _>(store, records, |id, a, then| {
                cmd_submission_save(store, id, a, then, false)
            }),
        },
        Commands::Contacts { command } => match command {
            SimpleCommands::List { list } => cmd_contact_list(store, &list),
            SimpleCommands::Records(records) => run_records::<Contact, _, _>(store, records, |id, a, then| {
                cmd_contact_save(store, id, a, then, false)
            }),
        },
        Commands::Reset { force } => cmd_reset(store, force, false).map(|_| ()),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ifinance", &mut io::stdout());
            Ok(())
        }
        Commands::Ui => {
            if let Err(e) = run_tui(store) {
                eprintln!("Error running TUI: {}", e);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir.clone(), cli.log_level.clone());
    init_logging(&config.log_level);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
