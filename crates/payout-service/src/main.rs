//! Main entry point for the payout signer.
//!
//! The service holds a wallet seed sealed to its X25519 recipient key and
//! signs ERC-2612 permits that let payout beneficiaries pull tokens from that
//! wallet. Besides serving the signing API it offers helpers to generate the
//! recipient key, seal a seed to it and print the wallet address.

use clap::{Parser, Subcommand};
use payout_config::Config;
use payout_core::{MemoryNonceSource, PermitService, RelativeDeadline};
use payout_sealed_box::RecipientKeyPair;
use payout_types::utils::decode_hex;
use payout_types::{hex, with_0x_prefix, ParseError, SecretBytes32};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the payout signer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", global = true)]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info", global = true)]
	log_level: String,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// Serve the signing API (default)
	Serve,
	/// Generate a recipient X25519 key pair
	Keygen,
	/// Seal a wallet seed to a recipient public key
	Seal {
		/// Recipient X25519 public key (hex)
		#[arg(long)]
		public_key: String,
		/// Wallet seed (hex), read from the environment when omitted
		#[arg(long, env = "EVM_PRIVATE_KEY", hide_env_values = true)]
		seed: String,
	},
	/// Print the address of the configured wallet
	Address,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	match args.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(&args.config).await,
		Command::Keygen => {
			let keypair = RecipientKeyPair::generate();
			println!("public_key = {}", with_0x_prefix(&hex::encode(keypair.public_key())));
			println!(
				"secret_key = {}",
				with_0x_prefix(&hex::encode(keypair.secret_key().expose_secret()))
			);
			Ok(())
		},
		Command::Seal { public_key, seed } => {
			println!("{}", seal_seed(&public_key, &seed)?);
			Ok(())
		},
		Command::Address => {
			let config = load_config(&args.config).await?;
			println!("{}", build_service(&config)?.owner());
			Ok(())
		},
	}
}

async fn load_config(path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
	let path = path
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
	let config = Config::from_file(path).await?;
	tracing::info!("Loaded configuration [{}]", config.signer.id);
	Ok(config)
}

/// Wires the configured keys, token and collaborators into a [`PermitService`].
fn build_service(config: &Config) -> Result<PermitService, Box<dyn std::error::Error>> {
	let service = PermitService::new(
		config.recipient_keypair()?,
		config.encrypted_wallet_seed()?,
		config.token.clone(),
		Arc::new(MemoryNonceSource::new()),
		Arc::new(RelativeDeadline::new(config.permit_validity())),
	)?;
	Ok(service)
}

async fn serve(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!("Started payout signer");
	let config = load_config(path).await?;
	let service = Arc::new(build_service(&config)?);

	let api_config = config.api.clone().unwrap_or_default();
	if !api_config.enabled {
		tracing::warn!("API server disabled in configuration, nothing to serve");
		return Ok(());
	}
	server::start_server(api_config, service).await?;

	tracing::info!("Stopped payout signer");
	Ok(())
}

/// Seals a hex seed to a hex recipient key, returning the sealed box as hex.
fn seal_seed(public_key: &str, seed: &str) -> Result<String, Box<dyn std::error::Error>> {
	let bytes = decode_hex(public_key)?;
	let public_key: [u8; 32] = bytes
		.as_slice()
		.try_into()
		.map_err(|_| ParseError::InvalidLength {
			expected: 32,
			actual: bytes.len(),
		})?;
	let seed = SecretBytes32::from_hex(seed)?;
	let sealed = payout_sealed_box::seal(seed.expose_secret(), &public_key)?;
	Ok(sealed.to_hex())
}
