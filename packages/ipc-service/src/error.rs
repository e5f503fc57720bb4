pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Provider timed out: {message}")]
	Timeout { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl Error {
	/// Stable label for logs.
	pub fn code(&self) -> &'static str {
		match self {
			Self::InvalidRequest { .. } => "invalid_request",
			Self::Provider { .. } => "provider",
			Self::Timeout { .. } => "timeout",
			Self::Qdrant { .. } => "qdrant",
		}
	}
}

impl From<ipc_providers::Error> for Error {
	fn from(err: ipc_providers::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout { message: err.to_string() };
		}

		Self::Provider { message: err.to_string() }
	}
}

impl From<ipc_storage::Error> for Error {
	fn from(err: ipc_storage::Error) -> Self {
		match err {
			ipc_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			ipc_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}
