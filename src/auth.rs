//! Registration, credential checks and session state.
//!
//! Credentials live in the user table as plaintext and are checked by a
//! linear scan; the first row whose username and password both match wins.
//! Registration appends unconditionally, so duplicate usernames are possible.
//! Neither gap is fixed here: password hashing and duplicate prevention are
//! absent from the on-disk format this tool maintains compatibility with.

use crate::{
    domain::{Role, User},
    storage::{Store, StoreError},
};

/// Registers a new account.
///
/// Appends unconditionally: there is no duplicate-username check and no
/// password strength rule. Registration does not log the user in.
///
/// # Errors
///
/// Returns an error if the user row cannot be written.
pub fn register(store: &Store, username: &str, password: &str, role: Role) -> Result<(), StoreError> {
    store.append_user(&User {
        username: username.to_string(),
        password: password.to_string(),
        role,
    })?;
    tracing::info!("Registered user '{username}' as {role}");
    Ok(())
}

/// Checks a username/password pair against the user table.
///
/// Returns the role of the first row that matches both fields exactly, or
/// `None` when no row matches. Callers surface the `None` case as a single
/// invalid-credentials message; unknown user and wrong password are
/// deliberately indistinguishable.
///
/// # Errors
///
/// Returns an error if the user table cannot be read.
pub fn authenticate(
    store: &Store,
    username: &str,
    password: &str,
) -> Result<Option<Role>, StoreError> {
    let users = store.users()?;
    Ok(users
        .into_iter()
        .find(|user| user.username == username && user.password == password)
        .map(|user| user.role))
}

/// Authentication state for the current interaction.
///
/// Lives only for the duration of one interaction and starts over Anonymous.
/// Successful login moves to `Authenticated`; logout moves back. A failed
/// login leaves the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No user is logged in.
    #[default]
    Anonymous,
    /// A user is logged in with the role fixed at registration.
    Authenticated {
        /// The logged-in username.
        username: String,
        /// The logged-in user's role.
        role: Role,
    },
}

impl Session {
    /// Attempts to log in, transitioning to `Authenticated` on success.
    ///
    /// Returns the role on success and `None` on invalid credentials, in
    /// which case the session is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the user table cannot be read.
    pub fn login(
        &mut self,
        store: &Store,
        username: &str,
        password: &str,
    ) -> Result<Option<Role>, StoreError> {
        match authenticate(store, username, password)? {
            Some(role) => {
                *self = Self::Authenticated {
                    username: username.to_string(),
                    role,
                };
                Ok(Some(role))
            }
            None => Ok(None),
        }
    }

    /// Logs out, returning to `Anonymous`.
    pub fn logout(&mut self) {
        *self = Self::Anonymous;
    }

    /// Returns the logged-in role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticated { role, .. } => Some(*role),
            Self::Anonymous => None,
        }
    }

    /// Returns the logged-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { username, .. } => Some(username),
            Self::Anonymous => None,
        }
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
