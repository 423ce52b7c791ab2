//! Session setup for the drives the CLI knows about.
//!
//! Only the requests that produce an upload URL live here; the bytes always
//! go through [`transfer`](crate::transfer::transfer).

pub mod google;
pub mod onedrive;

use crate::resume::ResumeMethod;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GoogleDrive,
    OneDrive,
    YouTube,
}

impl Provider {
    /// How this provider's sessions report received bytes.
    pub fn resume_method(self) -> ResumeMethod {
        match self {
            Provider::GoogleDrive | Provider::YouTube => ResumeMethod::RangeProbe,
            Provider::OneDrive => ResumeMethod::ExpectedRanges,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GoogleDrive => "google-drive",
            Provider::OneDrive => "onedrive",
            Provider::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google-drive" | "googledrive" | "gdrive" => Ok(Provider::GoogleDrive),
            "onedrive" | "one-drive" => Ok(Provider::OneDrive),
            "youtube" => Ok(Provider::YouTube),
            other => Err(format!(
                "unknown provider '{}' (expected google-drive, onedrive or youtube)",
                other
            )),
        }
    }
}

/// Destination directory with exactly one leading and one trailing `/`.
pub fn normalize_dir(dir: Option<&str>) -> String {
    let trimmed = dir.unwrap_or("").trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
