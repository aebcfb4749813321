//! Breadth-first traversal over the CDP neighbor graph.
//!
//! Visits one device at a time, FIFO. VisitedSet only grows and PendingSet
//! only admits keys not already seen, so on a finite neighbor graph the
//! queue drains; cycles fall out of the dedup check, there is no explicit
//! cycle detection.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use uuid::Uuid;

use cdpwalk_core::types::{
    DeviceKey, FailureRecord, NeighborTables, PendingEntry, VisitRecord,
};

use crate::dns::{check_name, DnsResolver};
use crate::join::join_tables;
use crate::query::{query_device, DeviceProbe, QueryResult};

/// Everything a crawl run produced.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// One record per visited device, in visit order.
    pub inventory: Vec<VisitRecord>,
    /// Devices no session could be established with.
    pub failures: Vec<FailureRecord>,
    /// Discovered-but-unvisited entries; populated only when follow mode
    /// is off.
    pub pending: Vec<PendingEntry>,
}

/// Drives the breadth-first walk over device neighbor tables.
pub struct TraversalEngine<P, R> {
    probe: P,
    resolver: Arc<R>,
    ignore_list: Vec<String>,
}

impl<P, R> TraversalEngine<P, R>
where
    P: DeviceProbe,
    R: DnsResolver + 'static,
{
    pub fn new(probe: P, resolver: R, ignore_list: Vec<String>) -> Self {
        Self {
            probe,
            resolver: Arc::new(resolver),
            ignore_list,
        }
    }

    /// Crawl outward from `seed`. With `follow` off, only the seed is
    /// queried and the discovered neighbors are returned unvisited.
    pub async fn run(&self, seed: &str, follow: bool) -> CrawlOutcome {
        let crawl_id = Uuid::new_v4();
        let mut visited: HashSet<DeviceKey> = HashSet::new();
        let mut pending_keys: HashSet<DeviceKey> = HashSet::new();
        let mut queue: VecDeque<PendingEntry> = VecDeque::new();
        let mut outcome = CrawlOutcome::default();

        tracing::info!(crawl_id = %crawl_id, seed, follow, "Starting crawl");

        // Seed step: one direct attempt, no IP fallback — there is no
        // known IP to fall back to yet.
        let seed_report = self.probe.probe(seed).await;
        if let Some(error) = &seed_report.failure {
            tracing::warn!(crawl_id = %crawl_id, seed, error = %error, "Seed device query failed");
        }
        self.enqueue_neighbors(&seed_report.tables, &visited, &mut pending_keys, &mut queue);

        if !follow {
            outcome.pending = queue.into_iter().collect();
            return outcome;
        }

        while let Some(entry) = queue.pop_front() {
            tracing::debug!(crawl_id = %crawl_id, device = %entry.name, ip = %entry.ip, "Connecting");

            let QueryResult { report, disposition } =
                query_device(&self.probe, &entry.name, &entry.ip).await;
            let dns_note = self.dns_note(&entry.name, &entry.ip).await;

            if disposition.is_failure() {
                outcome.failures.push(FailureRecord {
                    name: entry.name.clone(),
                    ip: entry.ip.clone(),
                    capability: entry.capability.clone(),
                    model: report.model.clone(),
                    description: report.description.clone(),
                    reason: disposition,
                });
            }

            outcome.inventory.push(VisitRecord {
                name: entry.name.clone(),
                org_name: entry.org_name.clone(),
                ip: entry.ip.clone(),
                capability: entry.capability.clone(),
                model: report.model.clone(),
                description: report.description.clone(),
                disposition,
                dns_note,
            });

            let key = entry.key();
            pending_keys.remove(&key);
            visited.insert(key);

            self.enqueue_neighbors(&report.tables, &visited, &mut pending_keys, &mut queue);

            tracing::debug!(
                crawl_id = %crawl_id,
                scanned = outcome.inventory.len(),
                left = queue.len(),
                "Visit complete"
            );
        }

        tracing::info!(
            crawl_id = %crawl_id,
            visited = outcome.inventory.len(),
            failed = outcome.failures.len(),
            "Crawl complete"
        );

        outcome
    }

    /// Join a device's tables and queue every new, non-ignored neighbor.
    ///
    /// The ignore filter runs here, at discovery time, before a key can
    /// ever enter the pending set.
    fn enqueue_neighbors(
        &self,
        tables: &NeighborTables,
        visited: &HashSet<DeviceKey>,
        pending_keys: &mut HashSet<DeviceKey>,
        queue: &mut VecDeque<PendingEntry>,
    ) {
        for neighbor in join_tables(&tables.device_ids, &tables.addresses, &tables.capabilities) {
            if self.is_ignored(&neighbor.capability) {
                tracing::debug!(
                    device = %neighbor.device_name,
                    capability = %neighbor.capability,
                    "Neighbor ignored"
                );
                continue;
            }
            let entry = PendingEntry::from_neighbor(&neighbor);
            let key = entry.key();
            if visited.contains(&key) || pending_keys.contains(&key) {
                continue;
            }
            pending_keys.insert(key);
            queue.push_back(entry);
        }
    }

    /// Substring match, case-sensitive and unanchored.
    fn is_ignored(&self, capability: &str) -> bool {
        self.ignore_list
            .iter()
            .any(|pattern| capability.contains(pattern.as_str()))
    }

    /// DNS lookups block, so the check runs off the async worker.
    async fn dns_note(&self, name: &str, ip: &str) -> Option<String> {
        let resolver = Arc::clone(&self.resolver);
        let name = name.to_string();
        let ip = ip.to_string();
        match tokio::task::spawn_blocking(move || check_name(resolver.as_ref(), &name, &ip)).await
        {
            Ok(note) => note,
            Err(e) => {
                tracing::warn!(error = %e, "DNS check task failed");
                None
            }
        }
    }
}
