use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ── Status ───────────────────────────────────────────────────────────

/// Provider-reported lifecycle status of a cloud server.
///
/// This is a closed set: a wire value outside it fails the decode instead
/// of coercing to a default, so API drift surfaces at the call site. The
/// client never computes transitions itself — after a command, the new
/// status becomes visible on the next refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudServerStatus {
    /// The server is up.
    Running,
    /// The server is powered off.
    Stopped,
    /// First install in progress. Can take some minutes.
    Installing,
    /// Reinstall in progress. Can take some minutes.
    Reinstalling,
    /// An up- or downgrade is being processed.
    FlavourChange,
    /// A backup is being restored. Can take some minutes.
    Restoring,
    /// The up- or downgrade failed. Support has been informed.
    ErrorFc,
    /// Deleting the server failed. Support has been informed.
    ErrorDelete,
    /// Installing the server failed. Support has been informed.
    ErrorInstall,
    /// Reinstalling the server failed. Support has been informed.
    ErrorReinstall,
}

impl CloudServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Installing => "installing",
            Self::Reinstalling => "reinstalling",
            Self::FlavourChange => "flavour_change",
            Self::Restoring => "restoring",
            Self::ErrorFc => "error_fc",
            Self::ErrorDelete => "error_delete",
            Self::ErrorInstall => "error_install",
            Self::ErrorReinstall => "error_reinstall",
        }
    }

    /// True for the four error states, where support is already involved.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ErrorFc | Self::ErrorDelete | Self::ErrorInstall | Self::ErrorReinstall
        )
    }
}

impl fmt::Display for CloudServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudServerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "installing" => Ok(Self::Installing),
            "reinstalling" => Ok(Self::Reinstalling),
            "flavour_change" => Ok(Self::FlavourChange),
            "restoring" => Ok(Self::Restoring),
            "error_fc" => Ok(Self::ErrorFc),
            "error_delete" => Ok(Self::ErrorDelete),
            "error_install" => Ok(Self::ErrorInstall),
            "error_reinstall" => Ok(Self::ErrorReinstall),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

// ── Server payload ───────────────────────────────────────────────────

/// The nested `cloud_server` object of the single-resource endpoint.
///
/// Every field is required: a payload missing any of them fails to decode
/// as a whole, which is what makes `refresh` all-or-nothing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudServerDetails {
    pub status: CloudServerStatus,
    pub hostname: String,
    /// Whether the server's resource allocation is dynamically adjustable.
    pub dynamic: bool,
    pub hardware: Hardware,
    pub ips: Vec<Ip>,
    /// The currently installed image.
    pub image: Image,
    /// True if a management daemon instance is reachable on the server.
    pub daemon_available: bool,
    pub password_available: bool,
    pub bandwidth_limited: bool,
}

/// Hardware allocation of a cloud server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Hardware {
    /// Core count.
    pub cpu: u32,
    /// RAM in MB.
    pub ram: u32,
    pub windows: bool,
    /// SSD size in GB.
    pub ssd: u32,
    /// Number of IPv4 addresses.
    pub ipv4: u32,
    /// High speed traffic quota in TB.
    pub traffic: u32,
    /// Backup space in GB.
    pub backup: u32,
}

/// One address assigned to a cloud server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ip {
    /// Textual IPv4 or IPv6 form.
    pub address: String,
    /// The ip version (4 or 6).
    pub version: u8,
    /// Exactly one entry per server should carry this flag; the API owns
    /// that invariant, the client does not enforce it.
    pub main_ip: bool,
    pub mac: String,
    /// Reverse-DNS hostname. Changed server-side via
    /// [`CloudServerHandle::change_ptr_entry`](crate::CloudServerHandle::change_ptr_entry).
    pub ptr: String,
}

/// An installable (or installed) OS image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Image {
    pub id: i64,
    pub name: String,
    #[serde(rename = "is_windows")]
    pub windows: bool,
    /// Whether the management daemon is preinstalled on this image.
    pub daemon: bool,
}

// ── Sub-resources ────────────────────────────────────────────────────

/// A server-side point-in-time snapshot, scoped to one cloud server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Backup {
    pub id: i64,
    /// The API's timestamps carry no UTC offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// A time-bucketed usage series for one metric (cpu, traffic, ...).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub metric: String,
    /// `[unix timestamp, value]` pairs in bucket order.
    pub datapoints: Vec<(i64, f64)>,
}
