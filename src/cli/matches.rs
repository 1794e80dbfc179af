use std::path::PathBuf;

use bookbridge::{Match, Role, Store, matching};
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "List candidate matches between requests and donations")]
pub struct Matches {
    /// Username (prompted when omitted)
    #[clap(long, short)]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Matches {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let config = super::load_config(&root);
        let store = Store::new(root);
        let session = super::authenticate(&store, self.user, self.password)?;
        super::require_role(&session, Role::Receiver)?;

        let matches = compute(&store, config.match_threshold());

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            }
            OutputFormat::Table => {
                if matches.is_empty() {
                    println!("No matches found yet.");
                } else {
                    render_table(&matches);
                }
            }
        }

        Ok(())
    }
}

/// Recompute matches from the store.
///
/// An unreadable table degrades to an empty match set; the reason is logged
/// rather than aborting the interaction.
pub(super) fn compute(store: &Store, threshold: u8) -> Vec<Match> {
    let requests = match store.requests() {
        Ok(requests) => requests,
        Err(e) => {
            tracing::warn!("Skipping match computation: {e}");
            return Vec::new();
        }
    };
    let donations = match store.donations() {
        Ok(donations) => donations,
        Err(e) => {
            tracing::warn!("Skipping match computation: {e}");
            return Vec::new();
        }
    };

    matching::find_matches(&requests, &donations, threshold)
}

pub(super) fn render_table(matches: &[Match]) {
    println!("Matches found: {}", matches.len());
    println!();
    println!(
        "{:<12} {:<24} {:<16} {:<6} {:<14} {:<24} SCORE",
        "DONOR", "BOOK", "SUBJECT", "GRADE", "CITY", "EMAIL"
    );
    println!("{}", "─".repeat(104).dim());

    for m in matches {
        println!(
            "{:<12} {:<24} {:<16} {:<6} {:<14} {:<24} {}",
            m.donation.owner,
            m.donation.book,
            m.donation.subject,
            m.donation.grade,
            m.donation.city,
            m.donation.email,
            m.score
        );
    }
}
