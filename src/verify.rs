//! One pipeline per address: structure check, MX lookup, SMTP probe.

use futures::future::join_all;
use tracing::{debug, info};

use crate::error::VerifyError;
use crate::mx::{LookupFailure, LookupMx, build_resolver, resolve_with, select_preferred};
use crate::options::VerifyOptions;
use crate::outcome::{self, VerificationResult};
use crate::smtp::{HandshakeParams, probe_host};
use crate::validator::{domain_of, is_valid_structure};

/// Verifies a single address.
///
/// Every outcome of the probe itself, negative ones included, is an
/// `Ok(VerificationResult)`. `Err` is reserved for an empty address or an
/// unusable DNS configuration.
pub async fn verify(
    email: &str,
    options: &VerifyOptions,
) -> Result<VerificationResult, VerifyError> {
    if let Some(early) = precheck(email)? {
        return Ok(early);
    }
    let resolver = build_resolver(&options.dns)?;
    verify_with_resolver(email, options, &resolver).await
}

/// Verifies every address concurrently with one shared resolver.
///
/// Results come back in submission order once all pipelines have settled;
/// a failing address never affects the others.
pub async fn verify_all<S>(
    emails: &[S],
    options: &VerifyOptions,
) -> Result<Vec<Result<VerificationResult, VerifyError>>, VerifyError>
where
    S: AsRef<str>,
{
    let resolver = build_resolver(&options.dns)?;
    Ok(verify_all_with_resolver(emails, options, &resolver).await)
}

pub(crate) async fn verify_all_with_resolver<S, R>(
    emails: &[S],
    options: &VerifyOptions,
    resolver: &R,
) -> Vec<Result<VerificationResult, VerifyError>>
where
    S: AsRef<str>,
    R: LookupMx,
{
    join_all(
        emails
            .iter()
            .map(|email| verify_with_resolver(email.as_ref(), options, resolver)),
    )
    .await
}

pub(crate) async fn verify_with_resolver<R: LookupMx>(
    email: &str,
    options: &VerifyOptions,
    resolver: &R,
) -> Result<VerificationResult, VerifyError> {
    if let Some(early) = precheck(email)? {
        return Ok(early);
    }

    info!("# Verifying {email}");
    let domain = domain_of(email);
    let records = match resolve_with(resolver, &domain).await {
        Ok(records) => records,
        Err(failure) => {
            debug!("MX lookup for {domain} failed: {failure:?}");
            return Ok(outcome::from_lookup_failure(email, &failure));
        }
    };
    let Some(best) = select_preferred(&records) else {
        return Ok(outcome::from_lookup_failure(
            email,
            &LookupFailure::NoRecords,
        ));
    };

    info!("Choosing {} for connection", best.exchange);
    let params = HandshakeParams {
        email,
        sender: &options.sender,
        fqdn: &options.fqdn,
        ignore: options.ignore(),
    };
    Ok(probe_host(&best.exchange, options.port, &params, options.timeout()).await)
}

fn precheck(email: &str) -> Result<Option<VerificationResult>, VerifyError> {
    if email.trim().is_empty() {
        return Err(VerifyError::MissingEmail);
    }
    if !is_valid_structure(email) {
        debug!("{email} rejected by structural validation");
        return Ok(Some(outcome::invalid_structure(email)));
    }
    Ok(None)
}
