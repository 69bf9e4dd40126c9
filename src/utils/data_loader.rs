//! Data loading utilities

use crate::error::{Result, TrainerError};
use crate::schema::FeatureSchema;
use crate::storage::{Location, Storage};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, info};

/// CSV loader that reads through a [`Storage`] backend
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows sampled for dtype inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            // A float after the sampled prefix would fail an integer column.
            infer_schema_length: None,
            separator: b',',
        }
    }

    /// Set the number of rows used for schema inference (`None` scans everything)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Fetch and parse a CSV file with a header row.
    ///
    /// Every failure (unreachable, unreadable, malformed) is a `LoadFailure`
    /// naming the location.
    pub fn load_csv(&self, storage: &dyn Storage, location: &Location) -> Result<DataFrame> {
        let start = Instant::now();
        let bytes = storage.read(location)?;
        debug!(backend = storage.name(), bytes = bytes.len(), "fetched input");

        let df = self
            .parse_csv(bytes)
            .map_err(|e| TrainerError::load(location.to_string(), e))?;

        info!(
            rows = df.height(),
            cols = df.width(),
            elapsed = ?start.elapsed(),
            "loaded {}",
            location
        );
        Ok(df)
    }

    /// Parse CSV bytes into a DataFrame
    pub fn parse_csv(&self, bytes: Vec<u8>) -> PolarsResult<DataFrame> {
        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
    }
}

/// Project `df` onto the schema's feature columns, in schema order.
pub fn feature_matrix(df: &DataFrame, schema: &FeatureSchema) -> Result<Array2<f64>> {
    schema.validate_features(df)?;
    columns_to_array2(df, &schema.features)
}

/// Project `df` onto the schema's feature columns and target column.
pub fn features_and_target(
    df: &DataFrame,
    schema: &FeatureSchema,
) -> Result<(Array2<f64>, Array1<f64>)> {
    schema.validate(df)?;
    let x = columns_to_array2(df, &schema.features)?;
    let y = Array1::from(column_values(df, &schema.target)?);
    Ok((x, y))
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let to_schema_err = || TrainerError::SchemaMismatch {
        missing: vec![],
        non_numeric: vec![name.to_string()],
        with_nulls: vec![],
    };

    let column = df.column(name).map_err(|_| TrainerError::SchemaMismatch {
        missing: vec![name.to_string()],
        non_numeric: vec![],
        with_nulls: vec![],
    })?;
    let as_f64 = column.cast(&DataType::Float64).map_err(|_| to_schema_err())?;
    let values = as_f64
        .f64()
        .map_err(|_| to_schema_err())?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| TrainerError::SchemaMismatch {
            missing: vec![],
            non_numeric: vec![],
            with_nulls: vec![name.to_string()],
        })?;
    Ok(values)
}

/// Row-major matrix built from column-major frame data
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data = col_names
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_names.len()), |(r, c)| col_data[c][r]))
}
