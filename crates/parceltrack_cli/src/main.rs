//! `parceltrack` command-line entry point.
//!
//! # Responsibility
//! - Own connection setup and schema bootstrap for the parcel store.
//! - Map subcommands onto `ParcelService` use-cases and print results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parceltrack_core::db::open_db;
use parceltrack_core::{
    core_version, default_log_level, init_logging, ClientId, Parcel, ParcelNumber,
    ParcelService, ParcelStatus, SqliteParcelRepository,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "parceltrack",
    version = core_version(),
    about = "Track parcels in a SQLite database"
)]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long, env = "PARCELTRACK_DB", default_value = "tracker.db", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "PARCELTRACK_LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "PARCELTRACK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Print records as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new parcel for a client.
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel.
    Show { number: ParcelNumber },
    /// List a client's parcels.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Correct the address of a registered parcel.
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Overwrite the status of a parcel.
    SetStatus {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Advance a parcel along registered -> sent -> delivered.
    NextStatus { number: ParcelNumber },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Show { .. } => "show",
            Self::List { .. } => "list",
            Self::SetAddress { .. } => "set-address",
            Self::SetStatus { .. } => "set-status",
            Self::NextStatus { .. } => "next-status",
            Self::Delete { .. } => "delete",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteParcelRepository::try_new(&conn).context("database is not ready")?;
    let service = ParcelService::new(repo);
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let printer = Printer { json: cli.json };
    match cli.command {
        Command::Register { client, address } => {
            let parcel = service.register(client, address)?;
            printer.parcel(&parcel)?;
        }
        Command::Show { number } => {
            let parcel = service.get(number)?;
            printer.parcel(&parcel)?;
        }
        Command::List { client } => {
            let parcels = service.client_parcels(client)?;
            printer.parcels(&parcels)?;
        }
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            println!("address update requested for parcel {number}");
        }
        Command::SetStatus { number, status } => {
            service.set_status(number, status)?;
            println!("parcel {number} status set to {status}");
        }
        Command::NextStatus { number } => match service.next_status(number)? {
            Some(status) => println!("parcel {number} moved to {status}"),
            None => println!("parcel {number} is already delivered"),
        },
        Command::Delete { number } => {
            service.delete(number)?;
            println!("delete requested for parcel {number}");
        }
    }

    Ok(())
}

struct Printer {
    json: bool,
}

impl Printer {
    fn parcel(&self, parcel: &Parcel) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(parcel)?);
        } else {
            println!("{}", describe(parcel));
        }
        Ok(())
    }

    fn parcels(&self, parcels: &[Parcel]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(parcels)?);
            return Ok(());
        }
        if parcels.is_empty() {
            println!("no parcels");
        }
        for parcel in parcels {
            println!("{}", describe(parcel));
        }
        Ok(())
    }
}

fn describe(parcel: &Parcel) -> String {
    format!(
        "parcel {}: client={} status={} created_at={} address={}",
        parcel.number, parcel.client, parcel.status, parcel.created_at, parcel.address
    )
}
