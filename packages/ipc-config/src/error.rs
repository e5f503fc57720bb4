use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read configuration {}.", path.display())]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Configuration {} is not valid TOML for this service: {source}", path.display())]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	/// A field parsed but violates a documented constraint.
	#[error("Invalid configuration: {message}")]
	Validation { message: String },
}
