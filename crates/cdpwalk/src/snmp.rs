//! SNMP session collaborator.
//!
//! Thin wrapper over `snmp2::AsyncSession` (v2c). Every request runs under
//! an explicit timeout; a timed-out or failed table walk degrades to the
//! rows gathered so far instead of failing the device visit.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;

use cdpwalk_core::error::SessionError;
use cdpwalk_core::types::{NeighborTables, ProbeReport};

use crate::query::DeviceProbe;

/// CDP cache table columns (CISCO-CDP-MIB).
pub const OID_CDP_CACHE_DEVICE_ID: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 6];
pub const OID_CDP_CACHE_ADDRESS: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 4];
pub const OID_CDP_CACHE_PLATFORM: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 1, 8];

/// sysDescr.0 (SNMPv2-MIB).
pub const OID_SYS_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
/// chassisModel.0 (CISCO-STACK-MIB).
pub const OID_CHASSIS_MODEL: &[u64] = &[1, 3, 6, 1, 4, 1, 9, 5, 1, 2, 16, 0];

/// One SNMP v2c session to a single device.
pub struct SnmpSession {
    session: AsyncSession,
    timeout: Duration,
}

impl SnmpSession {
    /// Open a v2c session. `target` may be a hostname or an IP literal.
    pub async fn open(
        target: &str,
        port: u16,
        community: &str,
        timeout_dur: Duration,
    ) -> Result<Self, SessionError> {
        let addr = format!("{target}:{port}");
        match timeout(
            timeout_dur,
            AsyncSession::new_v2c(addr.as_str(), community.as_bytes(), 0),
        )
        .await
        {
            Ok(Ok(session)) => Ok(Self {
                session,
                timeout: timeout_dur,
            }),
            Ok(Err(e)) => Err(SessionError::Unreachable(e.to_string())),
            Err(_) => Err(SessionError::Timeout),
        }
    }

    /// Fetch a single scalar as text.
    pub async fn get_scalar(&mut self, oid: &'static [u64]) -> Result<String, SessionError> {
        let oid = Oid::from(oid).map_err(|_| SessionError::Unreachable("invalid OID".into()))?;
        match timeout(self.timeout, self.session.get(&oid)).await {
            Ok(Ok(mut response)) => Ok(response
                .varbinds
                .next()
                .map(|(_, value)| decode_text(&value))
                .unwrap_or_default()),
            Ok(Err(e)) => Err(SessionError::Unreachable(e.to_string())),
            Err(_) => Err(SessionError::Timeout),
        }
    }

    /// Walk one table column with repeated GETNEXT requests.
    ///
    /// Returns `(row index, value)` pairs, where the row index is the OID
    /// suffix beneath `base`. A failed or timed-out request ends the walk;
    /// the rows gathered so far are returned and the failure is logged.
    pub async fn walk_table(
        &mut self,
        base: &'static [u64],
        decode: fn(&Value) -> String,
    ) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        let mut cursor = match Oid::from(base) {
            Ok(oid) => oid.to_owned(),
            Err(_) => return rows,
        };

        loop {
            let pair = match timeout(self.timeout, self.session.getnext(&cursor)).await {
                Ok(Ok(mut response)) => response
                    .varbinds
                    .next()
                    .map(|(oid, value)| (oid.to_owned(), decode(&value))),
                Ok(Err(e)) => {
                    tracing::warn!(oid = ?base, error = %e, "Table walk aborted");
                    break;
                }
                Err(_) => {
                    tracing::warn!(oid = ?base, "Table walk timed out");
                    break;
                }
            };

            let Some((oid, text)) = pair else { break };
            let Some(index) = row_index(base, &oid) else {
                // Left the column subtree: the walk is complete.
                break;
            };
            rows.push((index, text));
            cursor = oid;
        }

        rows
    }
}

/// The OID suffix beneath `base`, dotted, or `None` if `oid` is outside it.
fn row_index(base: &[u64], oid: &Oid<'_>) -> Option<String> {
    let parts: Vec<u64> = oid.iter()?.collect();
    if parts.len() <= base.len() || parts[..base.len()] != *base {
        return None;
    }
    Some(
        parts[base.len()..]
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("."),
    )
}

/// Decode a varbind value as display text.
pub fn decode_text(value: &Value) -> String {
    match value {
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
        Value::Integer(n) => n.to_string(),
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        Value::Counter32(n) | Value::Timeticks(n) | Value::Unsigned32(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Decode a varbind carrying an IPv4 address.
///
/// cdpCacheAddress is a raw 4-octet address on the wire, not text.
pub fn decode_ipv4(value: &Value) -> String {
    match value {
        Value::OctetString(bytes) if bytes.len() == 4 => {
            Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).to_string()
        }
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        other => decode_text(other),
    }
}

/// Normalize a scalar for the delimited snapshot: line separators become a
/// single `;`, commas are stripped, surrounding whitespace trimmed.
pub fn normalize_scalar(raw: &str) -> String {
    raw.replace("\r\n", ";")
        .replace(['\r', '\n'], ";")
        .replace(',', "")
        .trim()
        .to_string()
}

/// Probes devices over SNMP v2c.
#[derive(Debug, Clone)]
pub struct SnmpProbe {
    port: u16,
    community: String,
    timeout: Duration,
}

impl SnmpProbe {
    pub fn new(port: u16, community: &str, timeout: Duration) -> Self {
        Self {
            port,
            community: community.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl DeviceProbe for SnmpProbe {
    /// Open one session and fetch description, model, and the three CDP
    /// cache columns. Stops at the first scalar failure, keeping whatever
    /// was fetched before it.
    async fn probe(&self, target: &str) -> ProbeReport {
        let mut report = ProbeReport::default();

        let mut session =
            match SnmpSession::open(target, self.port, &self.community, self.timeout).await {
                Ok(session) => session,
                Err(e) => {
                    report.failure = Some(e);
                    return report;
                }
            };

        match session.get_scalar(OID_SYS_DESCR).await {
            Ok(value) => report.description = normalize_scalar(&value),
            Err(e) => {
                report.failure = Some(e);
                return report;
            }
        }

        match session.get_scalar(OID_CHASSIS_MODEL).await {
            Ok(value) => report.model = normalize_scalar(&value),
            Err(e) => {
                report.failure = Some(e);
                return report;
            }
        }

        report.tables = NeighborTables {
            device_ids: session.walk_table(OID_CDP_CACHE_DEVICE_ID, decode_text).await,
            addresses: session.walk_table(OID_CDP_CACHE_ADDRESS, decode_ipv4).await,
            capabilities: session.walk_table(OID_CDP_CACHE_PLATFORM, decode_text).await,
        };

        report
    }
}
