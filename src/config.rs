//! Input locations and reader settings for a pipeline run.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::io::{csv::DEFAULT_ENCODINGS, CsvSource};

/// Census 2020-2022 population estimates for metro and micro areas, including CSA rows.
pub const CSA_POPULATION_URL: &str =
    "https://www2.census.gov/programs-surveys/popest/datasets/2020-2022/metro/totals/csa-est2022.csv";

/// Paths, URLs and reader settings for one run.
///
/// Relative file paths resolve against `data_folder`. Every field has a default,
/// so a JSON config only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root directory of the input files
    pub data_folder: PathBuf,
    /// Combined Statistical Area boundaries (`.shp`)
    pub metro_shapefile: PathBuf,
    /// Balancing authority control areas (`.shp`)
    pub balancing_authority_shapefile: PathBuf,
    /// Alternative fuel station export
    pub chargers_file: PathBuf,
    /// CSA population estimates, a path or an HTTP(S) URL
    pub population_source: CsvSource,
    /// ACS demographic extract, keyed by CSA `NAME`
    pub acs_file: PathBuf,
    /// ACS vehicles-by-tenure extract, keyed by CSA `NAME`
    pub acs_vehicles_file: PathBuf,
    /// Where output tables are written, defaults to `data_folder`
    pub output_dir: Option<PathBuf>,
    /// Text encodings tried in order when reading CSVs
    pub encodings: Vec<String>,
    /// Source CRS of the metro layer, read from its `.prj` when unset
    pub metro_epsg: Option<u32>,
    /// Source CRS of the balancing authority layer, read from its `.prj` when unset
    pub balancing_authority_epsg: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_folder: "Data".into(),
            metro_shapefile: "cb_2018_us_csa_5m/cb_2018_us_csa_5m.shp".into(),
            balancing_authority_shapefile: "Control__Areas/Control__Areas.shp".into(),
            chargers_file: "Electric and Alternative Fuel Charging Stations.csv".into(),
            population_source: CSA_POPULATION_URL.into(),
            acs_file: "ACS_Data.csv".into(),
            acs_vehicles_file: "ACS_aggvehiclesbytenure.csv".into(),
            output_dir: None,
            encodings: DEFAULT_ENCODINGS.iter().map(|label| label.to_string()).collect(),
            metro_epsg: None,
            balancing_authority_epsg: None,
        }
    }
}

impl PipelineConfig {
    /// Read a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("[config] Failed to parse config file: {}", path.display()))
    }

    /// `path` under `data_folder`, unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.data_folder.join(path) }
    }

    pub fn metro_shapefile_path(&self) -> PathBuf { self.resolve(&self.metro_shapefile) }

    pub fn balancing_authority_shapefile_path(&self) -> PathBuf { self.resolve(&self.balancing_authority_shapefile) }

    pub fn chargers_source(&self) -> CsvSource { self.resolve(&self.chargers_file).into() }

    /// URLs pass through unchanged; relative paths resolve under `data_folder`.
    pub fn population_source(&self) -> CsvSource {
        match &self.population_source {
            CsvSource::Path(path) => self.resolve(path).into(),
            url => url.clone(),
        }
    }

    pub fn acs_sources(&self) -> [CsvSource; 2] {
        [self.resolve(&self.acs_file).into(), self.resolve(&self.acs_vehicles_file).into()]
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.as_ref()
            .map(|dir| self.resolve(dir))
            .unwrap_or_else(|| self.data_folder.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_point_at_the_data_folder() {
        let config = PipelineConfig::default();
        assert_eq!(config.metro_shapefile_path(), Path::new("Data/cb_2018_us_csa_5m/cb_2018_us_csa_5m.shp"));
        assert_eq!(config.chargers_source(), CsvSource::Path("Data/Electric and Alternative Fuel Charging Stations.csv".into()));
        assert_eq!(config.population_source(), CsvSource::Url(CSA_POPULATION_URL.into()));
        assert_eq!(config.output_dir(), Path::new("Data"));
        assert_eq!(config.encodings, vec!["utf-8", "latin1", "cp1252"]);
    }

    #[test]
    fn json_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_folder": "/srv/ev", "population_source": "pops.csv", "metro_epsg": 4269 }}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.data_folder, Path::new("/srv/ev"));
        assert_eq!(config.metro_epsg, Some(4269));
        assert_eq!(config.balancing_authority_epsg, None);
        assert_eq!(config.population_source(), CsvSource::Path("/srv/ev/pops.csv".into()));
        assert_eq!(config.acs_sources()[1], CsvSource::Path("/srv/ev/ACS_aggvehiclesbytenure.csv".into()));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let config = PipelineConfig { output_dir: Some("/tmp/out".into()), ..Default::default() };
        assert_eq!(config.output_dir(), Path::new("/tmp/out"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(PipelineConfig::from_json_file(file.path()).is_err());
    }
}
