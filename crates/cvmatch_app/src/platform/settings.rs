use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cvmatch_core::SessionConfig;
use cvmatch_engine::ClientSettings;
use cvmatch_logging::cvm_info;
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use super::logging::DEFAULT_LOG_FILE;

#[derive(Debug, thiserror::Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Contents of `cvmatch.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub upload_chunk_size: Option<usize>,
    pub page_size: Option<u32>,
    pub allowed_upload_types: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub(crate) struct SettingsOverrides {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSettings {
    pub client: ClientSettings,
    pub session: SessionConfig,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
}

impl AppSettings {
    /// A missing file yields defaults; a present but broken file is an error.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let settings = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(&text)
            .map_err(|err| SettingsError::Parse {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        cvm_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub(crate) fn resolve(self, overrides: SettingsOverrides) -> ResolvedSettings {
        let mut client = ClientSettings::default();
        if let Some(base_url) = overrides.base_url.or(self.base_url) {
            client.base_url = base_url;
        }
        if let Some(secs) = self.connect_timeout_secs {
            client.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            client.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = self.upload_chunk_size {
            client.upload_chunk_size = size.max(1);
        }

        let mut session = SessionConfig::default();
        if let Some(page_size) = overrides.page_size.or(self.page_size) {
            session.page_size = page_size.max(1);
        }
        if let Some(types) = self.allowed_upload_types {
            session.allowed_upload_types = types;
        }

        ResolvedSettings {
            client,
            session,
            output_dir: overrides
                .output_dir
                .or(self.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_file: self
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}
