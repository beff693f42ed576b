use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use speech_domain::{DomainError, StagedArtifact, StagingPort};
use tempfile::{Builder, TempPath};

/// Stages uploads as uniquely named files under a directory, the system
/// temp directory by default.
#[derive(Debug, Clone)]
pub struct TempFileStagingStore {
    directory: Option<PathBuf>,
    prefix: String,
}

impl TempFileStagingStore {
    pub fn new(directory: Option<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory,
            prefix: prefix.into(),
        }
    }

    fn write(&self, bytes: &[u8], extension: Option<&str>) -> io::Result<TempPath> {
        let suffix = extension.map(|ext| format!(".{ext}")).unwrap_or_default();
        let mut builder = Builder::new();
        builder.prefix(&self.prefix).suffix(&suffix);
        let mut file = match &self.directory {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file.into_temp_path())
    }
}

impl StagingPort for TempFileStagingStore {
    fn stage(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
    ) -> Result<Box<dyn StagedArtifact>, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("refusing to stage an empty upload"));
        }
        let temp = self.write(bytes, extension).map_err(|err| {
            DomainError::staging(format!("failed to stage upload: {err}"))
        })?;
        let path = temp.to_path_buf();
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "staged upload");
        Ok(Box::new(StagedFile {
            path,
            temp: Some(temp),
        }))
    }
}

/// A staged file. Dropping it without calling `release` still deletes it,
/// but swallows any error.
pub struct StagedFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl StagedArtifact for StagedFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn release(&mut self) -> Result<(), DomainError> {
        let removed = match self.temp.take() {
            Some(temp) => temp.close(),
            None => fs::remove_file(&self.path),
        };
        match removed {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "released staged upload");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DomainError::staging(format!(
                "failed to delete staged file {}: {err}",
                self.path.display()
            ))),
        }
    }
}
