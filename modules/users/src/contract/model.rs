use std::fmt;

/// A stored user. `id` is assigned by the store and never rewritten.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password: String,
}

/// Data for creating a new user; the store assigns the id.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub password: String,
}

impl NewUser {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl User {
    /// Same id, new credentials. This is the shape `update` expects.
    pub fn with_credentials(&self, login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: self.id,
            login: login.into(),
            password: password.into(),
        }
    }
}

// Passwords stay out of Debug output so they can't leak through logs or panics.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}
