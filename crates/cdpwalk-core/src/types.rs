//! Core domain types for the cdpwalk crawler.
//!
//! These model one crawl run: the neighbor tables walked from a device, the
//! joined neighbor rows, the visit queue bookkeeping, and the per-device
//! inventory records that end up in the snapshot.

use std::fmt;

use crate::error::SessionError;

// ── Neighbor tables ───────────────────────────────────────────────

/// The three CDP cache columns walked from one device, each as
/// `(row index, value)` pairs sharing the table's row-index space.
#[derive(Debug, Clone, Default)]
pub struct NeighborTables {
    pub device_ids: Vec<(String, String)>,
    pub addresses: Vec<(String, String)>,
    pub capabilities: Vec<(String, String)>,
}

/// One fully-joined row of a device's CDP cache table.
///
/// `row_index` is unique within a single device's table snapshot, not
/// across devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub row_index: String,
    pub device_name: String,
    pub address: String,
    pub capability: String,
}

// ── Visit bookkeeping ─────────────────────────────────────────────

/// Deduplication key for visited/pending sets. Equality is structural
/// over all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceKey {
    pub org_name: String,
    pub ip: String,
    pub capability: String,
}

/// A discovered neighbor awaiting a visit.
///
/// `name` is the hostname used for connection attempts and `org_name` the
/// advertised CDP device id recorded in the snapshot; at discovery time
/// both carry the advertised id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub name: String,
    pub org_name: String,
    pub ip: String,
    pub capability: String,
}

impl PendingEntry {
    pub fn from_neighbor(neighbor: &NeighborEntry) -> Self {
        Self {
            name: neighbor.device_name.clone(),
            org_name: neighbor.device_name.clone(),
            ip: neighbor.address.clone(),
            capability: neighbor.capability.clone(),
        }
    }

    pub fn key(&self) -> DeviceKey {
        DeviceKey {
            org_name: self.org_name.clone(),
            ip: self.ip.clone(),
            capability: self.capability.clone(),
        }
    }
}

// ── Query outcome ─────────────────────────────────────────────────

/// How the two-step connection attempt for a device concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDisposition {
    /// Reached on the first attempt, by name.
    Direct,
    /// The name attempt could not connect; the IP retry succeeded.
    IpFallback,
    /// Neither the name nor the IP attempt could establish a session.
    Unreachable,
    /// A request exceeded the protocol timeout; never retried.
    TimedOut,
}

impl QueryDisposition {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unreachable | Self::TimedOut)
    }

    /// The note this disposition contributes to the snapshot error column.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            Self::Direct => None,
            Self::IpFallback => Some("Failed to connect by Name"),
            Self::Unreachable => Some("Failed to connect by Name and IP"),
            Self::TimedOut => Some("Timed out"),
        }
    }
}

/// Everything a single probe attempt managed to fetch before it stopped.
///
/// On failure the fields gathered so far are kept, so a device is still
/// recorded with whatever was obtained.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub description: String,
    pub model: String,
    pub tables: NeighborTables,
    pub failure: Option<SessionError>,
}

impl ProbeReport {
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }
}

// ── Inventory records ─────────────────────────────────────────────

/// One row of the run inventory: a device that was contacted (or attempted).
///
/// The structured disposition and DNS note are rendered into the single
/// `error` snapshot column only at the reporting boundary.
#[derive(Debug, Clone)]
pub struct VisitRecord {
    pub name: String,
    pub org_name: String,
    pub ip: String,
    pub capability: String,
    pub model: String,
    pub description: String,
    pub disposition: QueryDisposition,
    pub dns_note: Option<String>,
}

impl VisitRecord {
    /// Render the connection disposition and DNS note as the snapshot's
    /// error column text.
    pub fn error_text(&self) -> Option<String> {
        match (self.disposition.note(), self.dns_note.as_deref()) {
            (Some(conn), Some(dns)) => Some(format!("{conn}; {dns}")),
            (Some(conn), None) => Some(conn.to_string()),
            (None, Some(dns)) => Some(dns.to_string()),
            (None, None) => None,
        }
    }
}

/// A device no session could be established with.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub name: String,
    pub ip: String,
    pub capability: String,
    pub model: String,
    pub description: String,
    pub reason: QueryDisposition,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {}",
            self.name,
            self.ip,
            self.capability,
            self.model,
            self.description,
            self.reason.note().unwrap_or_default()
        )
    }
}
