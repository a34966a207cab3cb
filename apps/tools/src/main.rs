use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::GuestId,
    invite::{invitation_link, invite_code_for},
};
use storage::Storage;
use url::Url;

mod prune;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/invitation.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tables with their row counts.
    Inspect,
    SeedGuests {
        #[arg(required = true)]
        names: Vec<String>,
    },
    InviteLink {
        #[arg(long)]
        public_url: Url,
        guest_id: i64,
    },
    /// Remove immediate subdirectories of `root` that are not kept.
    PruneDirs {
        root: PathBuf,
        #[arg(long = "keep", required = true)]
        keep: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect => {
            let storage = Storage::new(&cli.database_url).await?;
            for table in storage.table_overview().await? {
                println!("{:<16} {}", table.name, table.rows);
            }
        }
        Command::SeedGuests { names } => {
            let storage = Storage::new(&cli.database_url).await?;
            for name in names {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let guest_id = storage.create_guest(name).await?;
                println!("{}\t{}\t{}", guest_id.0, invite_code_for(guest_id), name);
            }
        }
        Command::InviteLink {
            public_url,
            guest_id,
        } => {
            if guest_id <= 0 {
                bail!("guest_id must be positive, got {guest_id}");
            }
            println!("{}", invitation_link(&public_url, GuestId(guest_id)));
        }
        Command::PruneDirs {
            root,
            keep,
            dry_run,
        } => {
            let removed = prune::prune_dirs(&root, &keep, dry_run)
                .with_context(|| format!("failed to prune {}", root.display()))?;
            let verb = if dry_run { "would remove" } else { "removed" };
            for dir in &removed {
                println!("{verb} {}", dir.display());
            }
            if removed.is_empty() {
                println!("nothing to remove under {}", root.display());
            }
        }
    }

    Ok(())
}
