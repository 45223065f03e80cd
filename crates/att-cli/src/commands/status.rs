//! Status command for showing database contents at a glance.

use std::io::Write;

use anyhow::{Context, Result};
use att_db::Database;
use chrono::NaiveDate;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config, today: NaiveDate) -> Result<()> {
    let stats = db.stats(today).context("failed to read database stats")?;

    writeln!(writer, "Attendance status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Reference offset: {}", db.reference_zone())?;
    writeln!(writer, "Organizations: {}", stats.organizations)?;
    writeln!(writer, "Staff: {}", stats.staff)?;
    writeln!(
        writer,
        "Open sessions: {} ({} from earlier days)",
        stats.open_sessions, stats.stale_open_sessions
    )?;
    writeln!(writer, "Events: {}", stats.events)?;

    Ok(())
}
