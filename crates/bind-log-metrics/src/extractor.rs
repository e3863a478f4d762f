// SPDX-License-Identifier: Apache-2.0

//! Turns raw BIND log lines into typed events.
//!
//! Patterns are tried in order, first match wins; lines matching none are
//! dropped without error. RPZ rewrites must be tried before plain queries
//! since a blocked query also produces a query log line.

use regex::Regex;

/// Metric category a log line maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A resolved DNS query.
    Query,
    /// A query answered NXDOMAIN through an RPZ rewrite.
    Block,
}

impl EventKind {
    /// Series name the event is recorded under.
    pub fn series(self) -> &'static str {
        match self {
            EventKind::Query => "dns_query",
            EventKind::Block => "dns_block",
        }
    }
}

/// One recognized log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub kind: EventKind,
    pub client: String,
    pub domain: String,
    pub record_type: String,
}

pub struct RecordExtractor {
    patterns: Vec<(EventKind, Regex)>,
}

impl RecordExtractor {
    /// Extractor for the BIND querylog and RPZ rewrite formats.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        RecordExtractor {
            patterns: vec![
                (
                    EventKind::Block,
                    Regex::new(r"([0-9:.]+)#.*: rpz QNAME NXDOMAIN rewrite ([^/]+)/([^/]+)/IN")
                        .expect("static pattern"),
                ),
                (
                    EventKind::Query,
                    Regex::new(r"([0-9:.]+)#.*: query: ([^ ]+) IN ([^ ]+) \+")
                        .expect("static pattern"),
                ),
            ],
        }
    }

    /// Zero-or-one event per line.
    pub fn extract(&self, line: &str) -> Option<LogEvent> {
        for (kind, pattern) in &self.patterns {
            if let Some(groups) = pattern.captures(line) {
                return Some(LogEvent {
                    kind: *kind,
                    client: groups[1].to_string(),
                    domain: groups[2].to_string(),
                    record_type: groups[3].to_string(),
                });
            }
        }
        None
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY_LINE: &str = "client @0x7f1b4c0a1e60 10.0.0.23#54123 (example.com): query: example.com IN AAAA + (192.168.1.1)";
    const BLOCK_LINE: &str = "client @0x7f1b4c0a1e60 10.0.0.23#54123 (ads.example): rpz QNAME NXDOMAIN rewrite ads.example/A/IN via ads.example.rpz.local";

    #[test]
    fn test_extract_query() {
        let event = RecordExtractor::new()
            .extract(QUERY_LINE)
            .expect("query line should match");
        assert_eq!(
            event,
            LogEvent {
                kind: EventKind::Query,
                client: "10.0.0.23".to_string(),
                domain: "example.com".to_string(),
                record_type: "AAAA".to_string(),
            }
        );
        assert_eq!(event.kind.series(), "dns_query");
    }

    #[test]
    fn test_extract_block() {
        let event = RecordExtractor::new()
            .extract(BLOCK_LINE)
            .expect("rpz line should match");
        assert_eq!(event.kind, EventKind::Block);
        assert_eq!(event.domain, "ads.example");
        assert_eq!(event.record_type, "A");
        assert_eq!(event.kind.series(), "dns_block");
    }

    #[test]
    fn test_unrecognized_lines_dropped() {
        let extractor = RecordExtractor::new();
        assert_eq!(extractor.extract(""), None);
        assert_eq!(
            extractor.extract("zone example.com/IN: loaded serial 2024010101"),
            None
        );
    }

    #[test]
    fn test_block_takes_precedence_over_query() {
        // A line carrying both markers must count as a block, per pattern
        // order.
        let combined = format!("{BLOCK_LINE} query: ads.example IN A +");
        let event = RecordExtractor::new()
            .extract(&combined)
            .expect("line should match");
        assert_eq!(event.kind, EventKind::Block);
    }
}
