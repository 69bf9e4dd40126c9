//! The training run: load → validate → fit → persist

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::config::{EstimatorKind, JobConfig};
use super::estimator::Estimator;
use crate::error::Result;
use crate::export::{save_artifact, ArtifactMetadata};
use crate::storage::{self, Location, Storage};
use crate::utils::{features_and_target, DataLoader};

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Where the artifact was written
    pub artifact: String,
    pub estimator: EstimatorKind,
    pub n_samples: usize,
    /// In-sample R²
    pub r2: f64,
    pub elapsed: Duration,
}

/// A single training run over one data set.
///
/// Storage backends are chosen from the data path and model directory
/// schemes unless injected with [`TrainingJob::with_storage`].
pub struct TrainingJob {
    config: JobConfig,
    loader: DataLoader,
    input_storage: Option<Box<dyn Storage>>,
    output_storage: Option<Box<dyn Storage>>,
}

impl TrainingJob {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
            input_storage: None,
            output_storage: None,
        }
    }

    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Use explicit backends for the input and output locations
    pub fn with_storage(mut self, input: Box<dyn Storage>, output: Box<dyn Storage>) -> Self {
        self.input_storage = Some(input);
        self.output_storage = Some(output);
        self
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Run the job. Nothing is written unless loading, validation and fitting all succeed.
    pub fn run(self) -> Result<TrainOutcome> {
        let start = Instant::now();
        let data_location = Location::parse(&self.config.data_path)?;
        let model_dir = Location::parse(&self.config.model_dir)?;

        let input = match self.input_storage {
            Some(storage) => storage,
            None => storage::for_location(&data_location)?,
        };
        let output = match self.output_storage {
            Some(storage) => storage,
            None => storage::for_location(&model_dir)?,
        };

        info!("loading data from {}", data_location);
        let df = self.loader.load_csv(input.as_ref(), &data_location)?;

        let schema = &self.config.schema;
        let (x, y) = features_and_target(&df, schema)?;
        debug!(features = ?schema.features, target = %schema.target, "extracted training matrix");

        info!(estimator = %self.config.estimator, rows = x.nrows(), "fitting model");
        let mut estimator = Estimator::new(self.config.estimator);
        estimator.fit(&x, &y)?;

        if !estimator.regressor().full_rank {
            warn!("feature matrix is rank deficient, using the minimum-norm solution");
        }
        let r2 = estimator.score(&x, &y)?;
        info!(r2, "model trained");

        let metadata =
            ArtifactMetadata::new(schema.clone(), estimator.kind(), x.nrows()).with_r2(r2);
        let target = save_artifact(output.as_ref(), &model_dir, &estimator, metadata)?;

        Ok(TrainOutcome {
            artifact: target.to_string(),
            estimator: estimator.kind(),
            n_samples: x.nrows(),
            r2,
            elapsed: start.elapsed(),
        })
    }
}
