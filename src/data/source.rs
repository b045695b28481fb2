//! Where observation series come from.

use std::path::PathBuf;

use crate::domain::{BinarySeries, ObservationSeries, SourceSpec, flag_from_value};
use crate::error::AppError;
use crate::io::ingest::load_observations;

use super::fred::FredClient;

/// Loads whole series by id.
pub trait SeriesSource {
    fn observations(&self, series_id: &str) -> Result<ObservationSeries, AppError>;

    /// A `{0, 1}` series such as `USREC`; other values are undefined.
    fn flags(&self, series_id: &str) -> Result<BinarySeries, AppError> {
        let series = self.observations(series_id)?;
        Ok(series.map(|obs| obs.value.and_then(flag_from_value)))
    }
}

/// A directory of `<SERIES_ID>.csv` files with `date,value[,deseasonalized_value]` columns.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_id: &str) -> PathBuf {
        self.dir.join(format!("{series_id}.csv"))
    }
}

impl SeriesSource for CsvDirectory {
    fn observations(&self, series_id: &str) -> Result<ObservationSeries, AppError> {
        let path = self.path_for(series_id);
        log::debug!("reading {series_id} from {}", path.display());

        let ingested = load_observations(&path)?;
        if !ingested.row_errors.is_empty() {
            log::warn!(
                "{}: skipped {} of {} rows",
                path.display(),
                ingested.row_errors.len(),
                ingested.rows_read
            );
            for err in &ingested.row_errors {
                log::debug!("  line {}: {}", err.line, err.message);
            }
        }
        if ingested.series.is_empty() {
            return Err(AppError::new(
                3,
                format!("No valid rows in series CSV '{}'.", path.display()),
            ));
        }
        Ok(ingested.series)
    }
}

/// Build the source a run is configured for.
pub fn open_source(spec: &SourceSpec) -> Result<Box<dyn SeriesSource>, AppError> {
    match spec {
        SourceSpec::Fred {
            observation_start,
            request_delay_ms,
        } => Ok(Box::new(FredClient::from_env(*observation_start, *request_delay_ms)?)),
        SourceSpec::CsvDir(dir) => {
            if !dir.is_dir() {
                return Err(AppError::new(
                    2,
                    format!("Data directory '{}' does not exist.", dir.display()),
                ));
            }
            Ok(Box::new(CsvDirectory::new(dir.clone())))
        }
    }
}
