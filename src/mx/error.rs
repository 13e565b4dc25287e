use thiserror::Error;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("invalid DNS server '{server}': {reason}")]
    InvalidDnsServer { server: String, reason: String },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl MxError {
    pub(crate) fn invalid_dns_server(server: &str, reason: impl ToString) -> Self {
        Self::InvalidDnsServer {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn resolver_init(source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::ResolverInit { source }
    }
}
