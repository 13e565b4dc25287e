use std::net::{IpAddr, SocketAddr};

use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;

use super::{Error, LookupFailure, MxRecord};

const DNS_PORT: u16 = 53;

/// Builds a resolver for one verification (or one batch).
///
/// With no `dns_servers` the system configuration is used. Otherwise only
/// the given servers (`ip` or `ip:port`) are queried, over UDP and TCP.
/// The configuration lives in the returned value; nothing process-wide is
/// touched.
pub fn build_resolver(dns_servers: &[String]) -> Result<TokioAsyncResolver, Error> {
    if dns_servers.is_empty() {
        return TokioAsyncResolver::tokio_from_system_conf().map_err(Error::resolver_init);
    }

    let mut group = NameServerConfigGroup::new();
    for server in dns_servers {
        let addr = parse_dns_server(server)?;
        group.merge(NameServerConfigGroup::from_ips_clear(
            &[addr.ip()],
            addr.port(),
            true,
        ));
    }
    let config = ResolverConfig::from_parts(None, vec![], group);
    Ok(TokioAsyncResolver::tokio(config, ResolverOpts::default()))
}

pub(crate) fn parse_dns_server(server: &str) -> Result<SocketAddr, Error> {
    let trimmed = server.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    trimmed
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|err| Error::invalid_dns_server(server, err))
}

/// MX records of `domain` in answer order, null MX entries removed.
pub(crate) async fn resolve_with<R>(resolver: &R, domain: &str) -> Result<Vec<MxRecord>, LookupFailure>
where
    R: LookupMx,
{
    debug!("Resolving DNS... {domain}");
    let records: Vec<MxRecord> = resolver
        .lookup_mx(domain)
        .await?
        .into_iter()
        .filter(|record| !record.is_null())
        .collect();

    if records.is_empty() {
        Err(LookupFailure::NoRecords)
    } else {
        Ok(records)
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) fn classify_resolve_error(err: &ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            classify_negative_answer(*response_code)
                .unwrap_or_else(|| LookupFailure::Other(err.to_string()))
        }
        _ => LookupFailure::Other(err.to_string()),
    }
}

/// NXDOMAIN and NODATA answers; other negative answers stay unclassified.
pub(crate) fn classify_negative_answer(code: ResponseCode) -> Option<LookupFailure> {
    match code {
        ResponseCode::NXDomain => Some(LookupFailure::DomainNotFound),
        ResponseCode::NoError => Some(LookupFailure::NoRecords),
        _ => None,
    }
}

pub(crate) trait LookupMx {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure>;
}

impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        let lookup = self
            .mx_lookup(domain)
            .await
            .map_err(|err| classify_resolve_error(&err))?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupFailure> {
        self.lookups.set(self.lookups.get() + 1);
        (self.on_lookup)(domain)
    }
}
