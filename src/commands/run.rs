//! Pipeline command handler.
//!
//! Implements the `run` subcommand: screens each requested asset class for
//! mean-reverting pairs and persists one results table per class.

use crate::config::PipelineConfig;
use crate::data::SeriesStore;
use crate::pipeline::PairsPipeline;
use crate::types::AssetClass;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run the screening pipeline for each asset class in sequence.
///
/// # Arguments
/// * `data_dir` - Directory holding the collected per-instrument CSV files
/// * `output_dir` - Directory the per-class results tables are written to
/// * `config_path` - Optional JSON file overriding configuration defaults
/// * `assets` - Asset classes to screen; empty means all of them
///
/// # Errors
/// Returns an error when the configuration is invalid or a failure occurs
/// outside the per-pair evaluation loop.
pub fn run_pipeline(
    data_dir: &Path,
    output_dir: &Path,
    config_path: Option<&PathBuf>,
    assets: &[AssetClass],
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration overrides");
            PipelineConfig::from_json_file(path)?
        }
        None => {
            let config = PipelineConfig::default();
            config.validate().map_err(crate::error::PipelineError::InvalidConfig)?;
            config
        }
    };

    info!(
        data_dir = %data_dir.display(),
        train = %config.train_window(),
        test = %config.test_window(),
        "--- Pairscout: Mean-Reversion Pair Screening ---"
    );

    let assets: Vec<AssetClass> = if assets.is_empty() {
        AssetClass::ALL.to_vec()
    } else {
        assets.to_vec()
    };

    let store = SeriesStore::new(data_dir);
    let pipeline = PairsPipeline::new(&config, store);

    for asset in assets {
        let table = pipeline.run(asset)?;
        if table.is_empty() {
            warn!(asset = %asset, "No qualifying pairs found");
            continue;
        }

        table.print();
        let path = table.write_csv(output_dir)?;
        println!(
            "\n✓ Saved {} {} pairs to {}",
            table.len(),
            asset,
            path.display()
        );
    }

    Ok(())
}
