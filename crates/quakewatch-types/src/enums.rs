//! Enumeration types shared across the monitor.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// State of a host-granted capability (geolocation, notifications).
///
/// `Prompt` covers both the "prompt" state of a permission query and the
/// "default" answer of a dismissed request: the user has not decided yet.
/// `Unknown` means the host has not been asked at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The user allowed the capability.
    Granted,
    /// The user refused the capability.
    Denied,
    /// Not decided yet.
    #[default]
    #[serde(alias = "default")]
    Prompt,
    /// The host has no such capability at all.
    Unsupported,
    /// Not queried yet.
    Unknown,
}

impl Permission {
    /// Whether location-dependent output (ETA annotations, alerts) is
    /// allowed. True for `Granted` and `Prompt`; an unresolved `Unknown`
    /// never allows it.
    pub const fn allows_location(self) -> bool {
        matches!(self, Self::Granted | Self::Prompt)
    }

    /// Lowercase label used in logs and status output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The permission pair the decision and dispatch logic read.
///
/// Starts with both permissions [`Permission::Unknown`] until the host is
/// queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    /// Geolocation permission.
    pub geolocation: Permission,
    /// Notification (push) permission.
    pub notification: Permission,
}

impl Default for PermissionState {
    fn default() -> Self {
        Self {
            geolocation: Permission::Unknown,
            notification: Permission::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, the fallback language.
    #[default]
    En,
    /// Amharic.
    Am,
    /// Afaan Oromo.
    Or,
    /// Tigrinya.
    Ti,
}

impl Language {
    /// Every supported language, fallback first.
    pub const ALL: [Self; 4] = [Self::En, Self::Am, Self::Or, Self::Ti];

    /// ISO 639-1 code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Am => "am",
            Self::Or => "or",
            Self::Ti => "ti",
        }
    }

    /// Look up a language by code (case-insensitive). Unknown codes yield
    /// `None`; callers decide whether to fall back.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl core::fmt::Display for Language {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}
