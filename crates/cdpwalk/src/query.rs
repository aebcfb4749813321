//! Per-device query with name-to-IP connection fallback.
//!
//! A visit is a small state machine: TryByName, then on connection failure
//! one retry against the known IP, then done. Timeouts are terminal at
//! either step. The probe report is carried through every terminal state so
//! partially-fetched fields survive a failure.

use async_trait::async_trait;

use cdpwalk_core::error::SessionError;
use cdpwalk_core::types::{ProbeReport, QueryDisposition};

/// Fetches description, model, and neighbor tables from one device over a
/// single protocol session. Implemented by the SNMP layer; mocked in tests.
#[async_trait]
pub trait DeviceProbe: Send + Sync {
    async fn probe(&self, target: &str) -> ProbeReport;
}

/// Terminal state of the two-step connection attempt.
#[derive(Debug)]
pub struct QueryResult {
    pub report: ProbeReport,
    pub disposition: QueryDisposition,
}

/// Drive the TryByName → TryByIP state machine for one device visit.
///
/// Only one fallback hop is attempted; there is no backoff and no repeat
/// of the same target.
pub async fn query_device<P: DeviceProbe + ?Sized>(
    probe: &P,
    name: &str,
    ip: &str,
) -> QueryResult {
    let by_name = probe.probe(name).await;
    match by_name.failure.clone() {
        None => QueryResult {
            report: by_name,
            disposition: QueryDisposition::Direct,
        },
        Some(SessionError::Timeout) => {
            tracing::debug!(device = name, "Timed out by name");
            QueryResult {
                report: by_name,
                disposition: QueryDisposition::TimedOut,
            }
        }
        Some(SessionError::Unreachable(reason)) => {
            tracing::debug!(device = name, ip, reason = %reason, "Failed to connect by name, retrying with IP");
            let by_ip = probe.probe(ip).await;
            match by_ip.failure.clone() {
                None => QueryResult {
                    report: by_ip,
                    disposition: QueryDisposition::IpFallback,
                },
                Some(SessionError::Timeout) => {
                    tracing::debug!(device = name, ip, "Timed out by IP");
                    QueryResult {
                        report: by_ip,
                        disposition: QueryDisposition::TimedOut,
                    }
                }
                Some(SessionError::Unreachable(_)) => {
                    tracing::debug!(device = name, ip, "Failed to connect by IP");
                    QueryResult {
                        report: by_ip,
                        disposition: QueryDisposition::Unreachable,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Scripted probe: a fixed report per target, recording call order.
    struct ScriptedProbe {
        responses: HashMap<String, ProbeReport>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn new(responses: Vec<(&str, ProbeReport)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(target, report)| (target.to_string(), report))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeviceProbe for ScriptedProbe {
        async fn probe(&self, target: &str) -> ProbeReport {
            self.calls.lock().unwrap().push(target.to_string());
            self.responses.get(target).cloned().unwrap_or_else(|| ProbeReport {
                failure: Some(SessionError::Unreachable("unknown target".into())),
                ..Default::default()
            })
        }
    }

    fn success(description: &str) -> ProbeReport {
        ProbeReport {
            description: description.to_string(),
            model: "WS-C3750".to_string(),
            ..Default::default()
        }
    }

    fn unreachable() -> ProbeReport {
        ProbeReport {
            failure: Some(SessionError::Unreachable("no route".into())),
            ..Default::default()
        }
    }

    fn timed_out() -> ProbeReport {
        ProbeReport {
            failure: Some(SessionError::Timeout),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn success_by_name_needs_no_fallback() {
        let probe = ScriptedProbe::new(vec![("sw1", success("ios"))]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::Direct);
        assert_eq!(result.report.description, "ios");
        assert_eq!(probe.calls(), vec!["sw1"]);
    }

    #[tokio::test]
    async fn connection_failure_falls_back_to_ip() {
        let probe = ScriptedProbe::new(vec![("sw1", unreachable()), ("10.1.1.1", success("ios"))]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::IpFallback);
        assert!(!result.disposition.is_failure());
        assert_eq!(result.report.description, "ios");
        assert_eq!(probe.calls(), vec!["sw1", "10.1.1.1"]);
    }

    #[tokio::test]
    async fn both_attempts_failing_is_unreachable() {
        let probe = ScriptedProbe::new(vec![("sw1", unreachable()), ("10.1.1.1", unreachable())]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::Unreachable);
        assert!(result.disposition.is_failure());
    }

    #[tokio::test]
    async fn timeout_by_name_is_not_retried() {
        let probe = ScriptedProbe::new(vec![("sw1", timed_out()), ("10.1.1.1", success("ios"))]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::TimedOut);
        // The IP was never attempted.
        assert_eq!(probe.calls(), vec!["sw1"]);
    }

    #[tokio::test]
    async fn timeout_during_ip_retry_is_terminal() {
        let probe = ScriptedProbe::new(vec![("sw1", unreachable()), ("10.1.1.1", timed_out())]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::TimedOut);
        assert_eq!(probe.calls(), vec!["sw1", "10.1.1.1"]);
    }

    #[tokio::test]
    async fn partial_fields_survive_a_failure() {
        let partial = ProbeReport {
            description: "ios 12.2".to_string(),
            failure: Some(SessionError::Timeout),
            ..Default::default()
        };
        let probe = ScriptedProbe::new(vec![("sw1", partial)]);

        let result = query_device(&probe, "sw1", "10.1.1.1").await;

        assert_eq!(result.disposition, QueryDisposition::TimedOut);
        assert_eq!(result.report.description, "ios 12.2");
    }
}
