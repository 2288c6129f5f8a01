use crate::Config;

/// The signed-in identity, as reported by the external auth collaborator.
/// The id is opaque to the pipeline; it only scopes message ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub email: Option<String>,
}

/// Explicitly-injected dependency object replacing ambient global state.
///
/// Initialized once at process start and passed down to whatever needs it;
/// `logout` tears the session down without touching configuration.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    user: Option<UserSession>,
}

impl AppContext {
    pub fn initialize(config: Config) -> Self {
        Self { config, user: None }
    }

    pub fn login(&mut self, user_id: impl Into<String>, email: Option<String>) {
        self.user = Some(UserSession {
            user_id: user_id.into(),
            email,
        });
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    /// Whether the current session belongs to the configured admin account.
    pub fn is_admin(&self) -> bool {
        match (&self.config.admin_email, self.user.as_ref()) {
            (Some(admin), Some(session)) => session.email.as_deref() == Some(admin.as_str()),
            _ => false,
        }
    }
}
