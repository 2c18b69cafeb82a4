use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod conversation;

use config::{LogFormat, Overrides, Settings};

#[derive(Parser)]
#[command(name = "recovery")]
#[command(about = "Recovery protocol schedules and conversational check-in forms")]
struct Cli {
    /// Data directory (overrides config file)
    #[arg(long, global = true, env = "RECOVERY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log output format (overrides config file)
    #[arg(long, global = true, value_enum, env = "RECOVERY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective settings
    Config {
        /// Write them to the config file for later runs
        #[arg(long)]
        save: bool,
    },
    /// Store a protocol or form definition from a JSON file
    Import {
        #[arg(value_enum)]
        kind: commands::DocumentKind,
        path: PathBuf,
    },
    /// List stored protocols and available forms
    List,
    /// Show a patient's tasks for one protocol day
    Today {
        patient_id: String,
        protocol_id: String,
        /// Protocol day; defaults to today's day when --surgery-date is given
        #[arg(long, allow_hyphen_values = true)]
        day: Option<i32>,
        /// Calendar date of day 0 (YYYY-MM-DD)
        #[arg(long)]
        surgery_date: Option<jiff::civil::Date>,
        #[arg(long)]
        json: bool,
    },
    /// Print every protocol day that has tasks
    Days {
        protocol_id: String,
        /// Only the days this task is active on
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        surgery_date: Option<jiff::civil::Date>,
    },
    /// Mark a protocol task as done for a patient
    Complete {
        patient_id: String,
        protocol_id: String,
        task_id: String,
    },
    /// Fill in a form one question at a time over stdin
    Form {
        patient_id: String,
        form_id: String,
        /// Resume an existing instance instead of starting a new one
        #[arg(long)]
        instance: Option<String>,
        /// Patient's first name, used to personalize prompts
        #[arg(long)]
        name: Option<String>,
        /// Record completion of this protocol task when the form completes
        #[arg(long, requires = "task")]
        protocol: Option<String>,
        #[arg(long, requires = "protocol")]
        task: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = config::config_path()?;
    let overrides = Overrides {
        data_dir: cli.data_dir,
        log_format: cli.log_format,
    };
    let settings = Settings::resolve(
        &config::load(&config_path)?,
        &overrides,
        config::default_data_dir,
    )?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
    }

    tracing::debug!(data_dir = %settings.data_dir.display(), "using data directory");
    let store = recovery_storage::FileStore::new(&settings.data_dir);

    match cli.command {
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if save {
                config::save(&config_path, &settings)?;
            }
            Ok(())
        }
        Command::Import { kind, path } => commands::import(&store, kind, &path),
        Command::List => commands::list(&store),
        Command::Today {
            patient_id,
            protocol_id,
            day,
            surgery_date,
            json,
        } => {
            let day = commands::resolve_day(day, surgery_date)?;
            commands::today(&store, &patient_id, &protocol_id, day, json)
        }
        Command::Days {
            protocol_id,
            task,
            surgery_date,
        } => commands::days(&store, &protocol_id, task.as_deref(), surgery_date),
        Command::Complete {
            patient_id,
            protocol_id,
            task_id,
        } => commands::complete(&store, &patient_id, &protocol_id, &task_id),
        Command::Form {
            patient_id,
            form_id,
            instance,
            name,
            protocol,
            task,
        } => {
            let instance = instance.unwrap_or_else(|| format!("{form_id}-{}", uuid::Uuid::new_v4()));
            let link = protocol.zip(task);
            commands::run_form(&store, &patient_id, &form_id, &instance, name.as_deref(), link)
        }
    }
}
