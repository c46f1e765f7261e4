use std::sync::Arc;

use rustls::{crypto::ring, ClientConfig, RootCertStore};
use tokio_postgres_rustls::MakeRustlsConnect;

use crate::ChangeLogError;

/// Rustls connector trusting the platform's root certificates.
///
/// Missing or unreadable system roots are logged, not fatal: a server that
/// actually requires TLS then fails verification at connect time.
pub(crate) fn connector() -> Result<MakeRustlsConnect, ChangeLogError> {
    let mut roots = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            let (added, ignored) = roots.add_parsable_certificates(certs);
            tracing::debug!(added, ignored, "loaded native root certificates");
        }
        Err(e) => tracing::warn!(error = %e, "could not load native root certificates"),
    }

    let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(ChangeLogError::Tls)?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(MakeRustlsConnect::new(config))
}
