use std::path::PathBuf;

use bookbridge::{BookRequest, Role, Store, Urgency};
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Submit a book request and view matches")]
pub struct Request {
    /// Username (prompted when omitted)
    #[clap(long, short)]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,

    /// Subject needed
    #[clap(long)]
    subject: String,

    /// School grade (1-12)
    #[clap(long, value_parser = super::parse_grade)]
    grade: String,

    /// City where the book is needed
    #[clap(long)]
    city: String,

    /// How urgently the book is needed (low, medium, high)
    #[clap(long)]
    urgency: Urgency,

    /// Contact email
    #[clap(long)]
    email: String,

    /// Skip the geocoding lookup
    #[clap(long)]
    offline: bool,
}

impl Request {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let config = super::load_config(&root);
        let store = Store::new(root);
        let session = super::authenticate(&store, self.user, self.password)?;
        super::require_role(&session, Role::Receiver)?;

        let coordinates = if self.offline {
            None
        } else {
            super::lookup_city(&config, &self.city)
        };

        let request = BookRequest {
            owner: session
                .username()
                .expect("session is authenticated")
                .to_string(),
            subject: self.subject,
            grade: self.grade,
            city: self.city,
            urgency: self.urgency,
            email: self.email,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        };
        store.append_request(&request)?;

        println!("{}", "Request submitted!".success());

        // The receiver sees current matches straight after submitting.
        let matches = super::matches::compute(&store, config.match_threshold());
        if matches.is_empty() {
            println!("No matches found yet.");
        } else {
            println!();
            super::matches::render_table(&matches);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookbridge::auth;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn request_run_appends_a_readable_record() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let store = Store::new(root.clone());
        auth::register(&store, "bob", "pw", Role::Receiver).unwrap();

        let request = Request {
            user: Some("bob".to_string()),
            password: Some("pw".to_string()),
            subject: "History".to_string(),
            grade: "7".to_string(),
            city: "Shelbyville".to_string(),
            urgency: Urgency::High,
            email: "bob@example.com".to_string(),
            offline: true,
        };
        request.run(root.clone()).expect("request should succeed");

        let requests = Store::new(root).requests().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].owner, "bob");
        assert_eq!(requests[0].urgency, Urgency::High);
        assert_eq!(requests[0].latitude, None);
    }

    #[test]
    fn request_run_rejects_non_receiver_roles() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let store = Store::new(root.clone());
        auth::register(&store, "alice", "pw", Role::Donor).unwrap();

        let request = Request {
            user: Some("alice".to_string()),
            password: Some("pw".to_string()),
            subject: "History".to_string(),
            grade: "7".to_string(),
            city: "Shelbyville".to_string(),
            urgency: Urgency::Low,
            email: "alice@example.com".to_string(),
            offline: true,
        };
        assert!(request.run(root).is_err());
    }
}
