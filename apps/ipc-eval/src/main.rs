use clap::Parser;

use ipc_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	ipc_eval::run(args).await
}
