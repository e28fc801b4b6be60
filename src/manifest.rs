//! JSON manifests exchanged with the command-line front end.
//!
//! Requests and descriptors are read from and written to UTF-8 paths via
//! capability-scoped directory handles.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::volume::{VolumeDescriptor, VolumeRequest};

/// Errors raised while reading or writing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when manifest content is not valid JSON for the expected type.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the path has no file name component.
    #[error("manifest path {path} is missing a filename")]
    MissingFileName {
        /// Offending path.
        path: Utf8PathBuf,
    },
}

/// Reads a [`VolumeRequest`] manifest.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file cannot be read or parsed.
pub fn read_request(path: &Utf8Path) -> Result<VolumeRequest, ManifestError> {
    read_json(path)
}

/// Reads a [`VolumeDescriptor`] manifest.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file cannot be read or parsed.
pub fn read_descriptor(path: &Utf8Path) -> Result<VolumeDescriptor, ManifestError> {
    read_json(path)
}

/// Writes a [`VolumeDescriptor`] as pretty-printed JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file cannot be written.
pub fn write_descriptor(path: &Utf8Path, descriptor: &VolumeDescriptor) -> Result<(), ManifestError> {
    let rendered = render_descriptor(descriptor)?;
    let (parent, file_name) = split(path)?;
    Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(|err| ManifestError::Io {
        path: parent.to_path_buf(),
        message: err.to_string(),
    })?;
    open_dir(parent)?
        .write(file_name, rendered)
        .map_err(|err| ManifestError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

/// Renders a descriptor as pretty-printed JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] if serialisation fails.
pub fn render_descriptor(descriptor: &VolumeDescriptor) -> Result<String, ManifestError> {
    render(descriptor).map_err(|message| ManifestError::Parse {
        path: Utf8PathBuf::from("<descriptor>"),
        message,
    })
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|err| err.to_string())
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, ManifestError> {
    let (parent, file_name) = split(path)?;
    let contents = open_dir(parent)?
        .read_to_string(file_name)
        .map_err(|err| ManifestError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    serde_json::from_str(&contents).map_err(|err| ManifestError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn split(path: &Utf8Path) -> Result<(&Utf8Path, &str), ManifestError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ManifestError::MissingFileName {
        path: path.to_path_buf(),
    })?;
    Ok((parent, file_name))
}

fn open_dir(parent: &Utf8Path) -> Result<Dir, ManifestError> {
    Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| ManifestError::Io {
        path: parent.to_path_buf(),
        message: err.to_string(),
    })
}
