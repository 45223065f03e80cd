use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use att_cli::commands::{Disposition, action, admin, history, recompute, scan, status};
use att_cli::{Cli, Commands, Config, OrgAction, StaffAction, SystemAction};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Exit code for a request rejected with a structured failure.
const REJECTED: u8 = 2;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(att_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = att_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?
        .with_reference_zone(config.reference_offset);
    Ok((db, config))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries JSON results, so logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let disposition = match command {
        Commands::Scan(args) => scan::run(&mut out, &db, args)?,
        Commands::Action(args) => action::run(&mut out, &mut db, args, &config.event_source)?,
        Commands::Org(OrgAction::Create { name, id }) => {
            admin::create_org(&mut out, &mut db, name, id.as_deref())?
        }
        Commands::Org(OrgAction::List) => {
            admin::list_orgs(&mut out, &db)?;
            Disposition::Accepted
        }
        Commands::System(SystemAction::Register { org, label }) => {
            admin::register_system(&mut out, &mut db, org, label.as_deref())?
        }
        Commands::Staff(StaffAction::Add {
            org,
            name,
            code,
            email,
        }) => admin::add_staff(
            &mut out,
            &mut db,
            org,
            name,
            code.as_deref(),
            email.as_deref(),
        )?,
        Commands::Staff(StaffAction::Deactivate { staff_id }) => {
            admin::set_badge(&mut out, &mut db, staff_id, false)?
        }
        Commands::Staff(StaffAction::Activate { staff_id }) => {
            admin::set_badge(&mut out, &mut db, staff_id, true)?
        }
        Commands::Sessions {
            staff_id,
            limit,
            json,
        } => {
            history::sessions(&mut out, &db, staff_id, *limit, *json)?;
            Disposition::Accepted
        }
        Commands::Events { session_id, json } => {
            history::events(&mut out, &db, session_id, *json)?;
            Disposition::Accepted
        }
        Commands::Recompute { org, apply } => {
            recompute::run(&mut out, &mut db, org.as_deref(), *apply)?;
            Disposition::Accepted
        }
        Commands::Status => {
            let today = config
                .reference_offset
                .day_of(&chrono::Utc::now());
            status::run(&mut out, &db, &config, today)?;
            Disposition::Accepted
        }
    };
    out.flush()?;

    Ok(match disposition {
        Disposition::Accepted => ExitCode::SUCCESS,
        Disposition::Rejected => ExitCode::from(REJECTED),
    })
}
