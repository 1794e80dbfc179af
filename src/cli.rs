use std::path::{Path, PathBuf};

mod admin;
mod donate;
mod matches;
mod request;
mod terminal;

use bookbridge::{Config, Coordinates, Geocoder, Role, Session, Store};
use clap::ArgAction;
use terminal::Colorize;
use tracing::instrument;

/// Parse a school grade from a string.
///
/// This is a CLI boundary function: grades are stored as free text, but the
/// submission forms only offer 1 through 12.
fn parse_grade(s: &str) -> Result<String, String> {
    let grade: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("grade must be a number between 1 and 12, got '{s}'"))?;
    if (1..=12).contains(&grade) {
        Ok(grade.to_string())
    } else {
        Err(format!("grade must be between 1 and 12, got '{grade}'"))
    }
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the data root
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new data root
    Init,

    /// Register a new account
    Register(Register),

    /// Verify credentials and show the account's role
    Login(Login),

    /// Submit a book donation (Donor role)
    Donate(donate::Donate),

    /// Submit a book request and view matches (Receiver role)
    Request(request::Request),

    /// List candidate matches between requests and donations (Receiver role)
    Matches(matches::Matches),

    /// Browse tables and aggregate counts (Admin role)
    Admin(admin::Admin),

    /// Show or modify configuration settings
    Config(ConfigArgs),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => Init::run(&root)?,
            Self::Register(command) => command.run(root)?,
            Self::Login(command) => command.run(root)?,
            Self::Donate(command) => command.run(root)?,
            Self::Request(command) => command.run(root)?,
            Self::Matches(command) => command.run(root)?,
            Self::Admin(command) => command.run(root)?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(".bookbridge").join("config.toml")
}

/// Load the configuration, falling back to defaults when absent or invalid.
fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        // A missing file is the normal case for an uninitialized root; a
        // present-but-unparseable one is not.
        if path.exists() {
            tracing::warn!("Failed to load config, using defaults: {e}");
        } else {
            tracing::debug!("Failed to load config: {e}");
        }
        Config::default()
    })
}

/// Resolve credentials (prompting for anything not supplied) and log in.
fn authenticate(
    store: &Store,
    user: Option<String>,
    password: Option<String>,
) -> anyhow::Result<Session> {
    let username = match user {
        Some(user) => user,
        None => dialoguer::Input::new()
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?,
    };

    let mut session = Session::default();
    if session.login(store, &username, &password)?.is_none() {
        // Unknown user and wrong password are deliberately indistinguishable.
        anyhow::bail!("Invalid credentials");
    }
    Ok(session)
}

fn require_role(session: &Session, role: Role) -> anyhow::Result<()> {
    if session.role() == Some(role) {
        Ok(())
    } else {
        anyhow::bail!("This command requires the {role} role");
    }
}

/// Geocode a city, coercing every non-success to "no coordinates".
///
/// The submission continues either way; the reason is logged so "no data"
/// and "lookup failed" stay distinguishable in the output.
fn lookup_city(config: &Config, city: &str) -> Option<Coordinates> {
    let geocoder = match Geocoder::from_config(config) {
        Ok(geocoder) => geocoder,
        Err(e) => {
            tracing::warn!("Geocoder unavailable: {e}");
            return None;
        }
    };

    match geocoder.locate(city) {
        Ok(Some(coordinates)) => Some(coordinates),
        Ok(None) => {
            println!(
                "{}",
                format!("No location found for '{city}'; storing without coordinates.").dim()
            );
            None
        }
        Err(e) => {
            tracing::warn!("Geocoding failed for '{city}': {e}");
            println!(
                "{}",
                format!("Could not look up '{city}'; storing without coordinates.").warning()
            );
            None
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        use std::fs;

        let config_dir = root.join(".bookbridge");
        if config_dir.exists() {
            anyhow::bail!("Data root already initialized (found existing .bookbridge directory)");
        }

        fs::create_dir_all(&config_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create .bookbridge directory: {e}"))?;

        let config = Config::default();
        config
            .save(&config_path(root))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        Store::new(root.to_path_buf()).init()?;

        println!("Initialized data root in {}", root.display());
        println!("  Created: .bookbridge/config.toml");
        println!("  Created: users.csv, donations.csv, requests.csv");
        println!("  Created: book_images/");
        println!();
        println!("Next steps:");
        println!("  bookbridge register <username> --role donor");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Register {
    /// The username for the new account
    username: String,

    /// The password for the new account (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,

    /// The role for the new account
    #[clap(long)]
    role: Role,
}

impl Register {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let password = match self.password {
            Some(password) => password,
            None => dialoguer::Password::new()
                .with_prompt("Choose a password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        };

        let store = Store::new(root);
        bookbridge::auth::register(&store, &self.username, &password, self.role)?;

        println!(
            "{}",
            "Registration successful. Log in with 'bookbridge login'.".success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Login {
    /// Username (prompted when omitted)
    #[clap(long, short)]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,
}

impl Login {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::new(root);
        let session = authenticate(&store, self.user, self.password)?;

        let username = session.username().expect("session is authenticated");
        let role = session.role().expect("session is authenticated");
        println!("{}", format!("Welcome, {username} ({role})").success());

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl ConfigArgs {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let path = config_path(root);

        match self.command {
            ConfigCommand::Show => {
                let config = load_config(root);

                println!("Configuration:");
                println!("  geocoder_endpoint: {}", config.geocoder_endpoint());
                println!("  geocoder_user_agent: {}", config.geocoder_user_agent());
                println!("  match_threshold: {}", config.match_threshold());
            }
            ConfigCommand::Set { key, value } => {
                let mut config = load_config(root);

                match key.as_str() {
                    "match_threshold" => {
                        let threshold = value.parse::<u8>().map_err(|_| {
                            anyhow::anyhow!("Value must be a number between 0 and 100")
                        })?;
                        if threshold > 100 {
                            anyhow::bail!("Value must be a number between 0 and 100");
                        }
                        config.set_match_threshold(threshold);
                    }
                    "geocoder_endpoint" => {
                        config.set_geocoder_endpoint(value);
                    }
                    "geocoder_user_agent" => {
                        config.set_geocoder_user_agent(value);
                    }
                    _ => {
                        anyhow::bail!(
                            "Unknown configuration key: '{key}'\nSupported keys: \
                             match_threshold, geocoder_endpoint, geocoder_user_agent"
                        );
                    }
                }

                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                config.save(&path).map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("{}", format!("Updated {key}").success());
            }
        }

        Ok(())
    }
}
