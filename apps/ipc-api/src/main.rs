use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ipc_api::Args::parse();

	ipc_api::run(args).await
}
