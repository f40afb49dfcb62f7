use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = recon_dash::Args::parse();
	recon_dash::run(args).await
}
