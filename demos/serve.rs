//! Serves the sign-up/sign-in/validate endpoints for a user pool.
//!
//! ```sh
//! cargo run --example serve --features server -- gateway.json 127.0.0.1:8080
//! ```
//!
//! The configuration file is a [`GatewayConfig`] JSON document. The admin auth calls must be
//! signed with AWS credentials in production; plug a signer into
//! `CognitoHttpClient` for that. Local emulators usually accept unsigned calls.

// std
use std::{env, net::SocketAddr, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use cognito_session::{config::GatewayConfig, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let mut args = env::args().skip(1);
	let path = args.next().ok_or_else(|| eyre!("usage: serve <config.json> [addr]"))?;
	let addr: SocketAddr = args.next().as_deref().unwrap_or("127.0.0.1:8080").parse()?;
	let config = GatewayConfig::load(&path)?;
	let gateway = config.build_gateway()?;
	let listener = TcpListener::bind(addr).await?;

	tracing::info!(%addr, pool = %config.pool.pool_id, "Serving session endpoints.");

	axum::serve(listener, server::router(Arc::new(gateway), config.request_deadline())).await?;

	Ok(())
}
