pub mod api;
pub mod events;
pub mod middleware;

use crate::cli::Args;
use crate::slack::SignatureVerifier;
use self::api::{ build_router, ApiConfig };
use self::events::EventRouter;

use axum_server::tls_rustls::RustlsConfig;
use log::{ error, info };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Server {
    addr: String,
    events: Arc<EventRouter>,
    verifier: SignatureVerifier,
    args: Args,
}

impl Server {
    pub fn new(
        addr: String,
        events: Arc<EventRouter>,
        verifier: SignatureVerifier,
        args: Args
    ) -> Self {
        Self { addr, events, verifier, args }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = ApiConfig {
            events_path: self.args.events_path.clone(),
            process_before_response: self.args.process_before_response,
            max_requests_per_second: self.args.max_requests_per_second,
        };
        let app = build_router(self.events.clone(), self.verifier.clone(), &config);
        let addr = self.addr.parse::<SocketAddr>()?;

        if self.args.enable_tls {
            let (cert_path, key_path) = match (&self.args.tls_cert_path, &self.args.tls_key_path) {
                (Some(cert), Some(key)) => (cert, key),
                (Some(_), None) | (None, Some(_)) => {
                    error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                    return Err("Missing TLS certificate or key path".into());
                }
                (None, None) => {
                    error!("--enable-tls was set but no certificate/key paths provided.");
                    return Err("TLS enabled without cert/key".into());
                }
            };
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path).await?;

            info!("Listening for Slack events on https://{}{}", addr, config.events_path);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("Listening for Slack events on http://{}{}", addr, config.events_path);
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}
