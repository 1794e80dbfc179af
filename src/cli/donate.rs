use std::path::PathBuf;

use bookbridge::{Condition, Donation, Role, Store};
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Submit a book donation")]
pub struct Donate {
    /// Username (prompted when omitted)
    #[clap(long, short)]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[clap(long, short)]
    password: Option<String>,

    /// Book title
    #[clap(long)]
    book: String,

    /// Subject the book covers
    #[clap(long)]
    subject: String,

    /// School grade (1-12)
    #[clap(long, value_parser = super::parse_grade)]
    grade: String,

    /// Condition of the book (new, good, worn)
    #[clap(long)]
    condition: Condition,

    /// City where the book is available
    #[clap(long)]
    city: String,

    /// Contact email
    #[clap(long)]
    email: String,

    /// Path to a book image to upload
    #[clap(long)]
    image: Option<PathBuf>,

    /// Skip the geocoding lookup
    #[clap(long)]
    offline: bool,
}

impl Donate {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let config = super::load_config(&root);
        let store = Store::new(root);
        let session = super::authenticate(&store, self.user, self.password)?;
        super::require_role(&session, Role::Donor)?;

        let coordinates = if self.offline {
            None
        } else {
            super::lookup_city(&config, &self.city)
        };

        let image = match &self.image {
            Some(path) => store.save_image(path)?,
            None => String::new(),
        };

        let donation = Donation {
            owner: session
                .username()
                .expect("session is authenticated")
                .to_string(),
            book: self.book,
            subject: self.subject,
            grade: self.grade,
            condition: self.condition,
            city: self.city,
            email: self.email,
            image,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        };
        store.append_donation(&donation)?;

        println!("{}", "Donation submitted!".success());
        if let Some(coordinates) = coordinates {
            println!(
                "{}",
                format!(
                    "Located at {:.4}, {:.4}",
                    coordinates.latitude, coordinates.longitude
                )
                .dim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookbridge::auth;
    use tempfile::tempdir;

    use super::*;

    fn donate_args(root: &std::path::Path, image: Option<PathBuf>) -> Donate {
        let store = Store::new(root.to_path_buf());
        auth::register(&store, "alice", "pw", Role::Donor).unwrap();

        Donate {
            user: Some("alice".to_string()),
            password: Some("pw".to_string()),
            book: "Algebra for Everyone".to_string(),
            subject: "Algebra".to_string(),
            grade: "9".to_string(),
            condition: Condition::Good,
            city: "Springfield".to_string(),
            email: "alice@example.com".to_string(),
            image,
            offline: true,
        }
    }

    #[test]
    fn donate_run_appends_a_readable_record() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        donate_args(&root, None)
            .run(root.clone())
            .expect("donate should succeed");

        let donations = Store::new(root).donations().unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].owner, "alice");
        assert_eq!(donations[0].subject, "Algebra");
        assert_eq!(donations[0].latitude, None);
    }

    #[test]
    fn donate_run_stores_the_uploaded_image() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let source = tmp.path().join("cover.png");
        std::fs::write(&source, b"image bytes").unwrap();

        donate_args(&root, Some(source))
            .run(root.clone())
            .expect("donate should succeed");

        let donations = Store::new(root.clone()).donations().unwrap();
        assert_eq!(donations[0].image, "book_images/cover.png");
        assert!(root.join("book_images/cover.png").exists());
    }

    #[test]
    fn donate_run_rejects_non_donor_roles() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let store = Store::new(root.clone());
        auth::register(&store, "bob", "pw", Role::Receiver).unwrap();

        let donate = Donate {
            user: Some("bob".to_string()),
            password: Some("pw".to_string()),
            book: "Book".to_string(),
            subject: "Subject".to_string(),
            grade: "9".to_string(),
            condition: Condition::New,
            city: "Springfield".to_string(),
            email: "bob@example.com".to_string(),
            image: None,
            offline: true,
        };
        assert!(donate.run(root).is_err());
    }
}
