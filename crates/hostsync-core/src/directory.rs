//! Host directory rendering
//!
//! Maps the address inventory onto a hosts-file text blob. Pure and
//! deterministic: entries keep the inventory order, nothing is sorted,
//! deduplicated, normalized or filtered.

use std::fmt;

use crate::traits::AddressRecord;

/// One line of the host directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    ip: String,
    hostname: String,
    description: String,
}

impl HostEntry {
    /// Create a new entry
    pub fn new(
        ip: impl Into<String>,
        hostname: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            hostname: hostname.into(),
            description: description.into(),
        }
    }

    /// Address exactly as the inventory reported it
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// DNS name, empty when the inventory had none
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Free-text description, empty when the inventory had none
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<&AddressRecord> for HostEntry {
    fn from(record: &AddressRecord) -> Self {
        Self {
            ip: record.address.clone(),
            hostname: record.dns_name.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} # {}", self.ip, self.hostname, self.description)
    }
}

/// Ordered sequence of host entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDirectory {
    entries: Vec<HostEntry>,
}

impl HostDirectory {
    /// Build a directory from inventory records, preserving their order
    pub fn from_records(records: &[AddressRecord]) -> Self {
        Self {
            entries: records.iter().map(HostEntry::from).collect(),
        }
    }

    /// Entries in inventory order
    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    /// Number of entries (one per rendered line)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the directory has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one line per entry, joined by `\n`, without a trailing newline
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(HostEntry::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<HostEntry>> for HostDirectory {
    fn from(entries: Vec<HostEntry>) -> Self {
        Self { entries }
    }
}

/// Render inventory records straight to hosts-file text
pub fn render_hosts(records: &[AddressRecord]) -> String {
    HostDirectory::from_records(records).render()
}
