use std::fmt;
use std::str::FromStr;

/// An alternate identity, obtained by the caller before any host is contacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication mechanism for the directory query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthType {
    #[default]
    Negotiate,
    Basic,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Negotiate => "Negotiate",
            AuthType::Basic => "Basic",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negotiate" | "0" => Ok(AuthType::Negotiate),
            "basic" | "1" => Ok(AuthType::Basic),
            other => Err(format!("unknown authentication type: {other} (expected negotiate or basic)")),
        }
    }
}
