use tracing::debug;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 "null MX": the domain accepts no mail.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty()
    }
}

/// Why a domain yielded no usable mail exchanger.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The domain does not exist (NXDOMAIN).
    DomainNotFound,
    /// The domain exists but publishes no MX data.
    NoRecords,
    /// Any other resolver failure, with the resolver's diagnostic.
    Other(String),
}

/// Most-preferred record: one pass, keeping the first record that reaches
/// a new lowest preference. Ties stay with the earliest record.
pub fn select_preferred(records: &[MxRecord]) -> Option<&MxRecord> {
    let mut best: Option<&MxRecord> = None;
    for record in records {
        if best.is_none_or(|current| record.preference < current.preference) {
            debug!("MX record {} (preference {})", record.exchange, record.preference);
            best = Some(record);
        }
    }
    best
}
