use crate::db::CredentialStore;
use crate::error::Result;
use crate::models::Role;

/// Login state of an interactive client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn { username: String, role: Role },
}

impl Session {
    pub fn new() -> Self {
        Self::LoggedOut
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn { .. })
    }

    /// Attempt a login. Only a logged-out session with valid credentials moves
    /// to `LoggedIn`; every other case leaves the state untouched.
    pub async fn login(
        &mut self,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        if self.is_logged_in() {
            return Ok(false);
        }

        match store.authenticate(username, password).await? {
            Some(role) => {
                tracing::info!("Session logged in as {} ({})", username, role);
                *self = Session::LoggedIn {
                    username: username.to_string(),
                    role,
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn welcome_message(&self) -> Option<String> {
        match self {
            Session::LoggedOut => None,
            Session::LoggedIn { username, role } => {
                Some(format!("Welcome, {} (Role: {})", username, role.label()))
            }
        }
    }
}
