use std::{collections::BTreeMap, path::PathBuf};

use bookbridge::{BookRequest, Donation, Role, Store, User};
use clap::Parser;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Browse tables and aggregate counts")]
pub struct Admin {
    /// Username (prompted when omitted)
    #[clap(long, short)]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    panel: Panel,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, clap::Subcommand)]
enum Panel {
    /// All donation records
    Donations,

    /// All request records
    Requests,

    /// All accounts (passwords are not shown)
    Users,

    /// Totals and per-subject frequency counts
    Stats,
}

impl Admin {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::new(root);
        let session = super::authenticate(&store, self.user, self.password)?;
        super::require_role(&session, Role::Admin)?;

        match self.panel {
            Panel::Donations => {
                let donations = store.donations()?;
                match self.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&donations)?),
                    OutputFormat::Table => render_donations(&donations),
                }
            }
            Panel::Requests => {
                let requests = store.requests()?;
                match self.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&requests)?),
                    OutputFormat::Table => render_requests(&requests),
                }
            }
            Panel::Users => {
                let users = store.users()?;
                match self.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users_json(&users))?),
                    OutputFormat::Table => render_users(&users),
                }
            }
            Panel::Stats => {
                let donations = store.donations()?;
                let requests = store.requests()?;
                match self.format {
                    OutputFormat::Json => {
                        let output = serde_json::json!({
                            "total_donations": donations.len(),
                            "total_requests": requests.len(),
                            "donation_subjects": subject_counts(donations.iter().map(|d| d.subject.as_str())),
                            "request_subjects": subject_counts(requests.iter().map(|r| r.subject.as_str())),
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Table => render_stats(&donations, &requests),
                }
            }
        }

        Ok(())
    }
}

/// Count occurrences per subject, ordered by subject name.
fn subject_counts<'a>(subjects: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for subject in subjects {
        *counts.entry(subject.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Account rows with the password column dropped.
fn users_json(users: &[User]) -> serde_json::Value {
    let rows: Vec<_> = users
        .iter()
        .map(|user| {
            serde_json::json!({
                "username": user.username,
                "role": user.role,
            })
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn render_donations(donations: &[Donation]) {
    if donations.is_empty() {
        println!("No donations yet.");
        return;
    }

    println!(
        "{:<12} {:<24} {:<16} {:<6} {:<10} {:<14} EMAIL",
        "DONOR", "BOOK", "SUBJECT", "GRADE", "CONDITION", "CITY"
    );
    println!("{}", "─".repeat(96).dim());
    for d in donations {
        println!(
            "{:<12} {:<24} {:<16} {:<6} {:<10} {:<14} {}",
            d.owner,
            d.book,
            d.subject,
            d.grade,
            d.condition.to_string(),
            d.city,
            d.email
        );
    }
    println!();
    println!("Total: {}", donations.len());
}

fn render_requests(requests: &[BookRequest]) {
    if requests.is_empty() {
        println!("No requests yet.");
        return;
    }

    println!(
        "{:<12} {:<16} {:<6} {:<14} {:<8} EMAIL",
        "RECEIVER", "SUBJECT", "GRADE", "CITY", "URGENCY"
    );
    println!("{}", "─".repeat(86).dim());
    for r in requests {
        println!(
            "{:<12} {:<16} {:<6} {:<14} {:<8} {}",
            r.owner,
            r.subject,
            r.grade,
            r.city,
            r.urgency.to_string(),
            r.email
        );
    }
    println!();
    println!("Total: {}", requests.len());
}

fn render_users(users: &[User]) {
    if users.is_empty() {
        println!("No accounts yet.");
        return;
    }

    // Passwords are never displayed.
    println!("{:<16} ROLE", "USERNAME");
    println!("{}", "─".repeat(26).dim());
    for user in users {
        println!("{:<16} {}", user.username, user.role);
    }
    println!();
    println!("Total: {}", users.len());
}

fn render_stats(donations: &[Donation], requests: &[BookRequest]) {
    let narrow = is_narrow();

    println!("Totals");
    println!("{}", "──────".dim());
    println!("Donations: {}", donations.len());
    println!("Requests:  {}", requests.len());

    for (title, counts) in [
        (
            "Donation subjects",
            subject_counts(donations.iter().map(|d| d.subject.as_str())),
        ),
        (
            "Request subjects",
            subject_counts(requests.iter().map(|r| r.subject.as_str())),
        ),
    ] {
        println!();
        println!("{title}");
        println!("{}", "─".repeat(title.len()).dim());

        if counts.is_empty() {
            println!("{}", "(none)".dim());
            continue;
        }

        if narrow {
            for (subject, count) in &counts {
                println!("{subject}: {count}");
            }
        } else {
            println!("{:<24} COUNT", "SUBJECT");
            for (subject, count) in &counts {
                println!("{subject:<24} {count}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bookbridge::auth;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn subject_counts_tallies_and_orders_by_name() {
        let counts = subject_counts(["Maths", "Art", "Maths", "Biology"].into_iter());

        let entries: Vec<_> = counts
            .iter()
            .map(|(subject, count)| (subject.as_str(), *count))
            .collect();
        assert_eq!(entries, [("Art", 1), ("Biology", 1), ("Maths", 2)]);
    }

    #[test]
    fn users_json_never_contains_passwords() {
        let users = vec![User {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            role: Role::Donor,
        }];

        let value = users_json(&users);

        assert_eq!(value[0]["username"], "alice");
        assert_eq!(value[0]["role"], "Donor");
        assert!(value[0].get("password").is_none());
        assert!(!value.to_string().contains("hunter2"));
    }

    #[test]
    fn admin_run_requires_admin_role() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let store = Store::new(root.clone());
        auth::register(&store, "alice", "pw", Role::Donor).unwrap();

        let admin = Admin {
            user: Some("alice".to_string()),
            password: Some("pw".to_string()),
            format: OutputFormat::Table,
            panel: Panel::Stats,
        };
        assert!(admin.run(root).is_err());
    }

    #[test]
    fn admin_run_renders_stats_for_admins() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let store = Store::new(root.clone());
        auth::register(&store, "root", "pw", Role::Admin).unwrap();

        let admin = Admin {
            user: Some("root".to_string()),
            password: Some("pw".to_string()),
            format: OutputFormat::Json,
            panel: Panel::Stats,
        };
        admin.run(root).expect("admin stats should succeed");
    }
}
