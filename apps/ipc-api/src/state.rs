use std::sync::Arc;

use ipc_service::IpcService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<IpcService>,
}
impl AppState {
	pub fn new(config: ipc_config::Config) -> color_eyre::Result<Self> {
		let service = IpcService::connect(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: IpcService) -> Self {
		Self { service: Arc::new(service) }
	}
}
