use crate::{
    error::ScrapeError,
    record::{to_delimited, to_json, DelimitedSchema, Delimiter, ProblemRecord},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use strum::{Display, EnumString};
use tracing::info;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    Json,
    #[default]
    #[strum(to_string = "delimited", serialize = "csv")]
    Delimited,
}

impl OutputFormat {
    pub fn default_filename(self) -> &'static str {
        match self {
            Self::Json => "problems.json",
            Self::Delimited => "problems.csv",
        }
    }

    pub fn render(
        self,
        records: &[ProblemRecord],
        schema: DelimitedSchema,
        delimiter: Delimiter,
    ) -> Result<String, ScrapeError> {
        match self {
            Self::Json => to_json(records),
            Self::Delimited => Ok(to_delimited(records, schema, delimiter)),
        }
    }
}

/// Write `contents` to `dir/filename`, creating `dir` if needed.
pub fn save(dir: impl AsRef<Path>, filename: &str, contents: &str) -> Result<PathBuf, ScrapeError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        info!("directory {} doesn't exist, creating", dir.display());
        fs::create_dir_all(dir).map_err(|source| ScrapeError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(filename);
    fs::write(&path, contents).map_err(|source| ScrapeError::Io {
        path: path.clone(),
        source,
    })?;
    info!("data saved to {}", path.display());
    Ok(path)
}
