use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_PATH: &str = "athlete_events.csv";
pub const DATA_PATH_ENV: &str = "OLYMPIC_DATA_PATH";
pub const PREVIEW_ROWS_ENV: &str = "OLYMPIC_PREVIEW_ROWS";

/// Startup configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Athlete data file (`.csv`, `.json` or `.parquet`).
    pub data_path: PathBuf,
    /// Rows shown in the dataset preview table.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Read the process arguments and environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Data path precedence: first positional argument, then
    /// `OLYMPIC_DATA_PATH`, then `athlete_events.csv`.
    pub fn resolve<I, F>(args: I, lookup: F) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = args
            .into_iter()
            .next()
            .or_else(|| lookup(DATA_PATH_ENV))
            .filter(|p| !p.trim().is_empty())
        {
            config.data_path = PathBuf::from(path);
        }

        if let Some(rows) = lookup(PREVIEW_ROWS_ENV) {
            config.preview_rows = rows
                .trim()
                .parse()
                .with_context(|| format!("{PREVIEW_ROWS_ENV}='{rows}' is not a row count"))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::resolve(Vec::new(), env(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.data_path, PathBuf::from("athlete_events.csv"));
    }

    #[test]
    fn test_argument_beats_environment() {
        let config = DashboardConfig::resolve(
            vec!["from_arg.csv".to_string()],
            env(&[(DATA_PATH_ENV, "from_env.csv")]),
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("from_arg.csv"));
    }

    #[test]
    fn test_environment_path_and_preview_rows() {
        let config = DashboardConfig::resolve(
            Vec::new(),
            env(&[(DATA_PATH_ENV, "/data/olympics.parquet"), (PREVIEW_ROWS_ENV, " 12 ")]),
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/olympics.parquet"));
        assert_eq!(config.preview_rows, 12);
    }

    #[test]
    fn test_bad_preview_rows_is_an_error() {
        let err = DashboardConfig::resolve(Vec::new(), env(&[(PREVIEW_ROWS_ENV, "lots")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("OLYMPIC_PREVIEW_ROWS"));
    }
}
