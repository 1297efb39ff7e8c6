use schemars::JsonSchema;
use segment::{ProcessingMode, RasterImage, SegmentError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    SegmentError(#[from] SegmentError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One output image: a mode applied to the configuration's input
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Job {
    pub name: String,
    pub description: Option<String>,
    pub mode: Option<ProcessingMode>,
}

impl Job {
    /// `<output_dir>/<name>.png`
    pub fn output_path<P: AsRef<Path>>(&self, output_dir: P) -> PathBuf {
        output_dir.as_ref().join(format!("{}.png", self.name))
    }
}

/// Batch configuration: one input image, many jobs
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobConfig {
    pub input: String,
    pub output_dir: String,
    pub jobs: Vec<Job>,
}

impl JobConfig {
    /// One job per processing mode, every mode at its default parameters
    pub fn skeleton(input: &Path, output_dir: &Path) -> Self {
        let jobs = ProcessingMode::iter()
            .map(|mode| Job {
                name: mode.to_string(),
                description: Some(mode.description().to_string()),
                mode: Some(mode),
            })
            .collect();

        Self {
            input: input.to_string_lossy().to_string(),
            output_dir: output_dir.to_string_lossy().to_string(),
            jobs,
        }
    }

    /// Read and parse a TOML job file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse jobs from TOML text
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a JSON job file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse jobs from JSON text
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a `.toml` or `.json` job file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Write the jobs as `.toml` or `.json`, chosen by extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Pretty-printed TOML
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}

/// Decode an image file into the engine's raster type
pub fn load_raster<P: AsRef<Path>>(path: P) -> Result<RasterImage, CliError> {
    let image = image::open(path)?;
    Ok(RasterImage::from_dynamic(image))
}

/// Encode a raster; the format follows the file extension
pub fn save_raster<P: AsRef<Path>>(image: &RasterImage, path: P) -> Result<(), CliError> {
    image.to_dynamic().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use segment::algorithms::{AdaptiveParams, LocalStatistic, Polarity};

    fn sample_config() -> JobConfig {
        JobConfig {
            input: "photo.png".to_string(),
            output_dir: "out".to_string(),
            jobs: vec![
                Job {
                    name: "edges".to_string(),
                    description: None,
                    mode: Some(ProcessingMode::SobelEdges),
                },
                Job {
                    name: "dark_median".to_string(),
                    description: Some("Dark text on paper".to_string()),
                    mode: Some(ProcessingMode::Adaptive(AdaptiveParams {
                        window: 21,
                        stat: LocalStatistic::Median,
                        polarity: Polarity::Dark,
                        ..Default::default()
                    })),
                },
                Job {
                    name: "todo".to_string(),
                    description: None,
                    mode: None,
                },
            ],
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let config = sample_config();
        let toml = config.to_toml().unwrap();
        assert_eq!(JobConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample_config();
        let json = config.to_json().unwrap();
        assert_eq!(JobConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_toml_with_partial_params() {
        let config = JobConfig::from_toml(
            r#"
            input = "scan.jpg"
            output_dir = "masks"

            [[jobs]]
            name = "ptile"
            mode = { type = "ptile", params = { p = 0.1 } }

            [[jobs]]
            name = "kmeans"
            [jobs.mode]
            type = "kmeans"
            params = { clusters = 4 }
            "#,
        )
        .unwrap();

        assert_eq!(config.jobs.len(), 2);
        let Some(ProcessingMode::KMeans(params)) = &config.jobs[1].mode else {
            panic!("expected kmeans job");
        };
        assert_eq!(params.clusters, 4);
        assert_eq!(params.max_iter, 50);
        assert_eq!(config.jobs[0].output_path(&config.output_dir), Path::new("masks/ptile.png"));
    }

    #[test]
    fn test_skeleton_has_one_job_per_mode() {
        let config = JobConfig::skeleton(Path::new("in.png"), Path::new("out"));
        assert_eq!(config.jobs.len(), ProcessingMode::mode_names().len());
        assert!(config.jobs.iter().all(|job| job.mode.is_some()));

        let toml = config.to_toml().unwrap();
        assert_eq!(JobConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            JobConfig::from_file("jobs.yaml"),
            Err(CliError::UnsupportedFileFormat)
        ));
    }
}
