//! DNS name-consistency checks.
//!
//! Cross-validates a device's advertised name against forward and reverse
//! DNS. Every resolution error is folded into the returned note; nothing
//! here ever fails a visit.

use std::io;
use std::net::IpAddr;

use dns_lookup::{lookup_addr, lookup_host};

/// What a reverse lookup resolved to.
#[derive(Debug, Clone, Default)]
pub struct ReverseEntry {
    pub canonical_name: String,
    pub aliases: Vec<String>,
    pub addresses: Vec<IpAddr>,
}

/// Forward/reverse resolution seam, so consistency checks run without
/// real DNS in tests.
pub trait DnsResolver: Send + Sync {
    fn reverse(&self, ip: IpAddr) -> io::Result<ReverseEntry>;
    fn forward(&self, name: &str) -> io::Result<IpAddr>;
}

/// System resolver backed by the platform resolver via `dns_lookup`.
pub struct SystemResolver;

impl DnsResolver for SystemResolver {
    fn reverse(&self, ip: IpAddr) -> io::Result<ReverseEntry> {
        let canonical_name = lookup_addr(&ip)?;
        // The canonical address list comes from resolving the PTR name back.
        let addresses = lookup_host(&canonical_name).unwrap_or_else(|_| vec![ip]);
        Ok(ReverseEntry {
            canonical_name,
            aliases: Vec::new(),
            addresses,
        })
    }

    fn forward(&self, name: &str) -> io::Result<IpAddr> {
        lookup_host(name)?
            .into_iter()
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses"))
    }
}

/// Cross-validate a device's advertised name against DNS.
///
/// Returns a `"; "`-joined list of inconsistency notes, or `None` when
/// forward and reverse lookups fully agree. An unparsable `ip` counts as a
/// reverse-lookup failure.
pub fn check_name<R: DnsResolver + ?Sized>(resolver: &R, name: &str, ip: &str) -> Option<String> {
    let mut reverse_not_matching = false;
    let mut reverse_unnamed = false;
    let mut reverse_failed = false;

    match ip.parse::<IpAddr>() {
        Ok(addr) => match resolver.reverse(addr) {
            Ok(entry) => {
                if !entry.addresses.contains(&addr) {
                    reverse_not_matching = true;
                }
                if entry.canonical_name.is_empty() {
                    reverse_unnamed = true;
                }
            }
            Err(_) => reverse_failed = true,
        },
        Err(_) => reverse_failed = true,
    }

    let mut forward_not_matching = false;
    let mut forward_failed = false;

    match resolver.forward(name) {
        Ok(addr) => {
            if addr.to_string() != ip {
                forward_not_matching = true;
            }
        }
        Err(_) => forward_failed = true,
    }

    let notes: Vec<&str> = [
        (reverse_not_matching, "hostname does not match ip in DNS"),
        (reverse_unnamed, "hostname not in DNS"),
        (forward_not_matching, "ip does not match name in DNS"),
        (reverse_failed, "ip does not exist in DNS - exception"),
        (forward_failed, "hostname not in DNS - exception"),
    ]
    .iter()
    .filter(|(triggered, _)| *triggered)
    .map(|(_, note)| *note)
    .collect();

    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}
