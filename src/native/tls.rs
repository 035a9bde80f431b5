use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// TLS connector using rustls with the Mozilla root store.
#[derive(Clone)]
pub struct TlsConnectorInner {
    connector: TlsConnector,
}

impl TlsConnectorInner {
    /// Creates a connector with `webpki-roots` trust anchors and no client auth.
    pub fn new() -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
        }
    }

    /// Performs the TLS handshake for `host` over an established TCP stream.
    pub async fn connect(&self, host: &str, stream: TcpStream) -> crate::Result<TlsStream<TcpStream>> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| crate::Error::invalid_argument(format!("invalid TLS server name: {host}")))?;
        Ok(self.connector.connect(server_name, stream).await?)
    }
}

impl Default for TlsConnectorInner {
    fn default() -> Self {
        Self::new()
    }
}
