use crate::error::Result;
use crate::models::{Variable, VariableExtrema};
use crate::processors::aggregator::Aggregator;
use crate::processors::chunk_reducer::{resolve_padding, ChunkReducer};
use crate::readers::{extract_dates, FileInventory};
use crate::settings::PipelineConfig;
use crate::utils::progress::ProgressReporter;
use crate::writers::{DocumentSource, MetadataStore};
use tracing::{debug, info};

/// Outcome of one variable's run, as written to the metadata document
#[derive(Debug, Clone)]
pub struct VariableSummary {
    pub variable: Variable,
    pub timestamps: usize,
    pub chunks_read: usize,
    pub min_global: Option<f64>,
    pub max_global: Option<f64>,
}

impl VariableSummary {
    fn from_extrema(variable: Variable, extrema: &VariableExtrema, chunks_per_timestamp: usize) -> Self {
        Self {
            variable,
            timestamps: extrema.timestamp_count(),
            chunks_read: extrema.timestamp_count() * chunks_per_timestamp,
            min_global: extrema.min_global,
            max_global: extrema.max_global,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} timestamps, {} chunks, min={}, max={}",
            self.variable.display_name(),
            self.variable,
            self.timestamps,
            self.chunks_read,
            format_extremum(self.min_global),
            format_extremum(self.max_global)
        )
    }
}

pub fn format_extremum(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Runs inventory, date extraction, reduction, aggregation and the metadata
/// write for each configured variable, in order
pub struct Pipeline {
    config: PipelineConfig,
    reducer: ChunkReducer,
    store: MetadataStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.check()?;

        let reducer = ChunkReducer::new(config.chunks_per_timestamp).with_mmap(config.use_mmap);
        let store = MetadataStore::new(config.metadata_path());

        Ok(Self {
            config,
            reducer,
            store,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every variable; the first error aborts the remaining ones
    pub fn run(&self) -> Result<Vec<VariableSummary>> {
        let mut summaries = Vec::with_capacity(self.config.variables.len());

        for &variable in &self.config.variables {
            summaries.push(self.process_variable(variable)?);
        }

        Ok(summaries)
    }

    /// Compute one variable's extrema and write its entry.
    ///
    /// Nothing is written unless every chunk of every timestamp was read.
    pub fn process_variable(&self, variable: Variable) -> Result<VariableSummary> {
        let extrema = self.compute_variable(variable)?;

        let written = self.store.update(variable.display_name(), &extrema)?;
        if written.source == DocumentSource::Missing && !self.config.silent {
            println!(
                "Metadata file not found, starting with an empty document: {}",
                self.store.path().display()
            );
        }

        let summary =
            VariableSummary::from_extrema(variable, &extrema, self.config.chunks_per_timestamp);
        debug!("{}", summary.summary());
        Ok(summary)
    }

    /// Everything up to, but not including, the metadata write
    pub fn compute_variable(&self, variable: Variable) -> Result<VariableExtrema> {
        let dir = &self.config.data_dir;
        let inventory = FileInventory::scan(dir)?;
        let files = inventory.filter_by_variable(variable);
        let dates = extract_dates(&files, variable)?;

        info!(
            "Processing {}: {} files, {} timestamps in {}",
            variable,
            files.len(),
            dates.len(),
            dir.display()
        );

        let total_chunks = (dates.len() * self.reducer.chunks_per_timestamp()) as u64;
        let progress = ProgressReporter::new(
            total_chunks,
            &format!("Reading {} chunks...", variable),
            self.config.silent,
        );

        let mut aggregator = Aggregator::new();
        for timestamp in dates {
            let padding = resolve_padding(self.config.padding, variable, timestamp, &inventory)?;
            progress.set_message(&format!("Reading {} {}", variable, timestamp));
            let extrema =
                self.reducer
                    .reduce_timestamp(dir, variable, timestamp, padding, Some(&progress))?;
            aggregator.add(extrema);
        }

        progress.finish_with_message(&format!(
            "{}: {} timestamps reduced",
            variable,
            aggregator.timestamp_count()
        ));

        Ok(aggregator.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Padding, Timestamp};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_chunks(dir: &Path, variable: Variable, ts: Timestamp, count: usize, value: f32) {
        for i in 0..count {
            let name = ts.chunk_file_name(variable, Padding::Unpadded, i);
            fs::write(dir.join(name), value.to_le_bytes()).unwrap();
        }
    }

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig::new(dir)
            .with_chunks_per_timestamp(3)
            .with_silent(true)
    }

    #[test]
    fn test_run_writes_every_variable() {
        let dir = TempDir::new().unwrap();
        let ts = Timestamp::new(2011, 9, 13, 0).unwrap();
        write_chunks(dir.path(), Variable::Salt, ts, 3, 34.5);
        write_chunks(dir.path(), Variable::Theta, ts, 3, 12.0);
        write_chunks(dir.path(), Variable::VorticityUvw, ts, 3, -0.25);

        let summaries = Pipeline::new(config(dir.path())).unwrap().run().unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].min_global, Some(-0.25));

        let document = MetadataStore::new(dir.path().join("metadata.json"))
            .load_or_default()
            .unwrap()
            .document;
        assert_eq!(document.keys().collect::<Vec<_>>(), vec!["SALT", "THETA", "VORT"]);
        let theta = document.variable("THETA").unwrap().unwrap();
        assert_eq!(theta.local_min("2011-9-13-0"), Some(&[12.0, 12.0, 12.0][..]));
    }

    #[test]
    fn test_failure_stops_later_variables() {
        let dir = TempDir::new().unwrap();
        let ts = Timestamp::new(2011, 9, 13, 0).unwrap();
        write_chunks(dir.path(), Variable::Salt, ts, 2, 1.0);
        write_chunks(dir.path(), Variable::Theta, ts, 3, 2.0);

        let pipeline = Pipeline::new(
            config(dir.path()).with_variables(vec![Variable::Salt, Variable::Theta]),
        )
        .unwrap();
        assert!(pipeline.run().is_err());
        assert!(!dir.path().join("metadata.json").exists());
    }

    #[test]
    fn test_variable_without_files() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(config(dir.path()).with_variables(vec![Variable::Theta])).unwrap();

        let summary = pipeline.process_variable(Variable::Theta).unwrap();
        assert_eq!(summary.timestamps, 0);
        assert_eq!(summary.min_global, None);
        assert!(summary.summary().contains("min=n/a"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(Pipeline::new(config(dir.path()).with_variables(vec![])).is_err());
    }
}
