//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-tenant attendance tracking.
///
/// Resolves a staff member's attendance state from a badge scan and records
/// punch-in, break and punch-out transitions against their daily session.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a staff member's attendance state and the actions allowed next.
    Scan(crate::commands::scan::ScanArgs),

    /// Perform an attendance action for a staff member.
    Action(crate::commands::action::ActionArgs),

    /// Manage organizations.
    #[command(subcommand)]
    Org(OrgAction),

    /// Manage system identities (scanner credentials).
    #[command(subcommand)]
    System(SystemAction),

    /// Manage staff members.
    #[command(subcommand)]
    Staff(StaffAction),

    /// List a staff member's sessions, most recent first.
    Sessions {
        /// Staff member ID.
        staff_id: String,

        /// Maximum number of sessions to show.
        #[arg(long, default_value_t = 14)]
        limit: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List a session's events in replay order.
    Events {
        /// Session ID.
        session_id: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replay closed sessions' events and report totals that drifted.
    Recompute {
        /// Only check this organization.
        #[arg(long)]
        org: Option<String>,

        /// Write the replayed totals back.
        #[arg(long)]
        apply: bool,
    },

    /// Show database status.
    Status,
}

/// Caller identity and scanned employee, shared by `scan` and `action`.
#[derive(Debug, Clone, Args)]
pub struct CallerArgs {
    /// Organization ID the caller acts for.
    #[arg(long)]
    pub org: String,

    /// System identity ID presented by the caller.
    #[arg(long)]
    pub system: String,

    /// Caller role.
    #[arg(long, default_value = att_core::SYSTEM_ROLE)]
    pub role: String,

    /// Employee code from the badge (preferred over email).
    #[arg(long, required_unless_present = "email")]
    pub code: Option<String>,

    /// Employee email from the badge.
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum OrgAction {
    /// Create an organization.
    Create {
        /// Display name.
        #[arg(long)]
        name: String,

        /// Explicit ID (generated if omitted).
        #[arg(long)]
        id: Option<String>,
    },
    /// List organizations.
    List,
}

#[derive(Debug, Subcommand)]
pub enum SystemAction {
    /// Register a system identity bound to an organization.
    Register {
        /// Organization ID.
        #[arg(long)]
        org: String,

        /// Human-readable label, e.g. the scanner's location.
        #[arg(long)]
        label: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum StaffAction {
    /// Add a staff member.
    Add {
        /// Organization ID.
        #[arg(long)]
        org: String,

        /// Full name.
        #[arg(long)]
        name: String,

        /// Employee code printed on the badge.
        #[arg(long)]
        code: Option<String>,

        /// Email address.
        #[arg(long)]
        email: Option<String>,
    },
    /// Deactivate a staff member's badge.
    Deactivate {
        /// Staff member ID.
        staff_id: String,
    },
    /// Reactivate a staff member's badge.
    Activate {
        /// Staff member ID.
        staff_id: String,
    },
}
