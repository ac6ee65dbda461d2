use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Service region. Each region has its own asset storage, so an asset uploaded
/// in one region cannot be used by a job submitted to another.
#[derive(Clone, Default, Copy, PartialEq, Eq, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States.
    #[default]
    Us,
    /// European Union.
    Eu,
    /// Local development server.
    Local,
}

impl Region {
    /// Base URL of the service in this region.
    pub fn base_url(&self) -> String {
        match self {
            Region::Us => "https://pdf-services-ue1.adobe.io".to_string(),
            Region::Eu => "https://pdf-services-ew1.adobe.io".to_string(),
            Region::Local => "http://localhost:8080".to_string(),
        }
    }
}

impl FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "local" => Ok(Region::Local),
            _ => Err(()),
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Us => write!(f, "us"),
            Region::Eu => write!(f, "eu"),
            Region::Local => write!(f, "local"),
        }
    }
}

/// API credentials sent with every service request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub access_token: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.access_token.is_empty()
    }
}

// Keep the token out of logs.
impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("access_token", &"***")
            .finish()
    }
}
