//! Typed model of Nitrado cloud servers.
//!
//! Covers the cloud-server resource (status, hardware, addresses, image),
//! its lifecycle commands (boot, reboot, reset, shutdown, reinstall),
//! backups (list, create, restore, delete), and the read-only endpoints
//! for telemetry, console access, and the provisioning password.
//!
//! All HTTP goes through the [`nitrapi_api::RestClient`] primitives; this
//! crate owns path composition and payload decoding, nothing else.

mod types;

pub use types::*;

use std::sync::Arc;

use nitrapi_api::RestClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("api error: {0}")]
    Api(#[from] nitrapi_api::Error),

    #[error("malformed {what} in response: {source}")]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("response is missing the {0} field")]
    MissingField(&'static str),

    #[error("unknown cloud server status: {0}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn decode<T: DeserializeOwned>(what: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| Error::Decode { what, source })
}

/// Id-scoped handle for cloud-server operations.
///
/// Commands, backups, and the read-only endpoints only need the resolved
/// service id, so they live here rather than on the populated
/// [`CloudServer`]. Commands are fire-and-forget: the API acknowledges
/// them immediately while the actual work (a reinstall can take minutes)
/// runs server-side, and the new status is only observable through a
/// subsequent [`CloudServer::refresh`].
#[derive(Clone)]
pub struct CloudServerHandle {
    id: i64,
    client: Arc<dyn RestClient>,
}

impl CloudServerHandle {
    pub fn new(client: Arc<dyn RestClient>, id: i64) -> Self {
        Self { id, client }
    }

    /// The owning service id.
    pub fn id(&self) -> i64 {
        self.id
    }

    fn path(&self, suffix: &str) -> String {
        format!("services/{}/cloud_servers{suffix}", self.id)
    }

    pub(crate) async fn fetch_details(&self) -> Result<CloudServerDetails> {
        let data = self.client.data_get(&self.path(""), &[]).await?;
        let server = data
            .get("cloud_server")
            .cloned()
            .ok_or(Error::MissingField("cloud_server"))?;
        decode("cloud_server", server)
    }

    // ── Lifecycle commands ───────────────────────────────────────────

    pub async fn boot(&self) -> Result<()> {
        self.client.data_post(&self.path("/boot"), &[]).await?;
        info!(server_id = self.id, "cloud server: boot requested");
        Ok(())
    }

    pub async fn reboot(&self) -> Result<()> {
        self.client.data_post(&self.path("/reboot"), &[]).await?;
        info!(server_id = self.id, "cloud server: reboot requested");
        Ok(())
    }

    /// Hard power cut. Can cause data loss or file system corruption;
    /// only for instances that no longer respond to a normal reboot.
    pub async fn reset(&self) -> Result<()> {
        self.client.data_post(&self.path("/reset"), &[]).await?;
        info!(server_id = self.id, "cloud server: hard reset requested");
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.client.data_post(&self.path("/shutdown"), &[]).await?;
        info!(server_id = self.id, "cloud server: shutdown requested");
        Ok(())
    }

    /// Reinstall the server with the given image. The server moves to
    /// `reinstalling` remotely; existing data is lost.
    pub async fn reinstall(&self, image_id: i64) -> Result<()> {
        self.client
            .data_post(&self.path("/reinstall"), &[("image_id", image_id.to_string())])
            .await?;
        info!(server_id = self.id, image_id, "cloud server: reinstall requested");
        Ok(())
    }

    pub async fn change_hostname(&self, hostname: &str) -> Result<()> {
        self.client
            .data_post(&self.path("/hostname"), &[("hostname", hostname.to_string())])
            .await?;
        info!(server_id = self.id, hostname, "cloud server: hostname changed");
        Ok(())
    }

    /// Set the reverse-DNS entry for one of the server's addresses.
    pub async fn change_ptr_entry(&self, ip_address: &str, hostname: &str) -> Result<()> {
        self.client
            .data_post(
                &self.path(&format!("/ptr/{ip_address}")),
                &[("hostname", hostname.to_string())],
            )
            .await?;
        info!(server_id = self.id, ip_address, hostname, "cloud server: ptr entry changed");
        Ok(())
    }

    // ── Backups ──────────────────────────────────────────────────────

    /// List all backups of this server, in the order the API reports them.
    ///
    /// Backups are server-authoritative and slow to produce, so there is
    /// no client-side cache: every call re-fetches.
    pub async fn backups(&self) -> Result<Vec<Backup>> {
        let data = self.client.data_get(&self.path("/backups"), &[]).await?;
        let backups = data
            .get("backups")
            .cloned()
            .ok_or(Error::MissingField("backups"))?;
        decode("backups", backups)
    }

    /// Ask the server to produce a new backup. The snapshot appears in
    /// [`backups`](Self::backups) once the server finishes it.
    pub async fn create_backup(&self) -> Result<()> {
        self.client.data_post(&self.path("/backups"), &[]).await?;
        info!(server_id = self.id, "cloud server: backup requested");
        Ok(())
    }

    /// Restore the backup with the given id. The server moves to
    /// `restoring` remotely.
    pub async fn restore_backup(&self, backup_id: i64) -> Result<()> {
        self.client
            .data_post(&self.path(&format!("/backups/{backup_id}/restore")), &[])
            .await?;
        info!(server_id = self.id, backup_id, "cloud server: backup restore requested");
        Ok(())
    }

    pub async fn delete_backup(&self, backup_id: i64) -> Result<()> {
        self.client
            .data_delete(&self.path(&format!("/backups/{backup_id}")), &[])
            .await?;
        info!(server_id = self.id, backup_id, "cloud server: backup deleted");
        Ok(())
    }

    // ── Telemetry, console, credentials ──────────────────────────────

    /// Usage series over a time window. Valid windows are `1h`, `4h`,
    /// `1d`, and `7d`; the value is passed through as-is and anything
    /// else surfaces as an API error.
    pub async fn resource_usage(&self, time: &str) -> Result<Vec<Resource>> {
        let data = self
            .client
            .data_get(&self.path("/resources"), &[("time", time.to_string())])
            .await?;
        let resources = data
            .get("resources")
            .cloned()
            .ok_or(Error::MissingField("resources"))?;
        decode("resources", resources)
    }

    /// The last `lines` lines of console output, if any.
    pub async fn console_logs(&self, lines: u32) -> Result<Option<String>> {
        let data = self
            .client
            .data_get(&self.path("/console_logs"), &[("lines", lines.to_string())])
            .await?;
        Ok(data
            .get("console_logs")
            .and_then(Value::as_str)
            .map(String::from))
    }

    /// Browser console access URL, if the server currently offers one.
    pub async fn novnc_url(&self) -> Result<Option<String>> {
        let data = self.client.data_get(&self.path("/console"), &[]).await?;
        let console = data
            .get("console")
            .cloned()
            .ok_or(Error::MissingField("console"))?;
        let console: ConsoleInfo = decode("console", console)?;
        Ok(console.url)
    }

    /// The password set at provisioning time. `None` once it has been
    /// retrieved or rotated.
    pub async fn initial_password(&self) -> Result<Option<String>> {
        let data = self.client.data_get(&self.path("/password"), &[]).await?;
        Ok(data.get("password").and_then(Value::as_str).map(String::from))
    }
}

#[derive(serde::Deserialize)]
struct ConsoleInfo {
    url: Option<String>,
}

/// A fetched, fully populated cloud server.
///
/// Instances only come out of [`fetch`](Self::fetch) (or a service
/// listing built on the same payload); there is no bare constructor.
/// [`refresh`](Self::refresh) is the one mutator and swaps every owned
/// field at once, so hardware, addresses, and image are never stale
/// relative to each other. It takes `&mut self`, which rules out
/// concurrent refreshes of one instance at compile time.
pub struct CloudServer {
    handle: CloudServerHandle,
    details: CloudServerDetails,
}

impl CloudServer {
    /// Fetch the server with the given service id.
    pub async fn fetch(client: Arc<dyn RestClient>, id: i64) -> Result<Self> {
        let handle = CloudServerHandle::new(client, id);
        let details = handle.fetch_details().await?;
        Ok(Self { handle, details })
    }

    /// Re-fetch and replace the server's fields. On failure (transport or
    /// a payload that no longer decodes) nothing changes.
    pub async fn refresh(&mut self) -> Result<()> {
        self.details = self.handle.fetch_details().await?;
        Ok(())
    }

    /// The id-scoped operations handle. Cheap to clone and independent of
    /// the fetched state; none of its operations touch this instance.
    pub fn handle(&self) -> &CloudServerHandle {
        &self.handle
    }

    pub fn id(&self) -> i64 {
        self.handle.id()
    }

    pub fn status(&self) -> CloudServerStatus {
        self.details.status
    }

    pub fn hostname(&self) -> &str {
        &self.details.hostname
    }

    /// Whether the resource allocation is dynamically adjustable.
    pub fn dynamic(&self) -> bool {
        self.details.dynamic
    }

    pub fn hardware(&self) -> &Hardware {
        &self.details.hardware
    }

    pub fn ips(&self) -> &[Ip] {
        &self.details.ips
    }

    /// The address flagged as the server's main ip, if the API reported one.
    pub fn main_ip(&self) -> Option<&Ip> {
        self.details.ips.iter().find(|ip| ip.main_ip)
    }

    /// The currently installed image.
    pub fn image(&self) -> &Image {
        &self.details.image
    }

    pub fn daemon_available(&self) -> bool {
        self.details.daemon_available
    }

    pub fn password_available(&self) -> bool {
        self.details.password_available
    }

    pub fn bandwidth_limited(&self) -> bool {
        self.details.bandwidth_limited
    }
}
