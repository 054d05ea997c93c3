use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::pipeline::format_extremum;
use crate::processors::Pipeline;
use crate::readers::{extract_dates, FileInventory};
use crate::settings::{ConfigOverrides, PipelineConfig};
use crate::writers::{DocumentSource, MetadataStore};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            data_dir,
            metadata_path,
            variables,
            padding,
            chunks,
            mmap,
            quiet,
        } => {
            let overrides = ConfigOverrides {
                data_dir,
                metadata_path,
                variables,
                chunks_per_timestamp: chunks,
                padding,
                use_mmap: mmap.then_some(true),
                silent: quiet.then_some(true),
            };
            let config = PipelineConfig::load(config.as_deref(), &overrides)?;

            println!("Computing extrema...");
            println!("Data directory: {}", config.data_dir.display());
            println!("Metadata file: {}", config.metadata_path().display());
            println!(
                "Variables: {}",
                config
                    .variables
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let pipeline = Pipeline::new(config)?;
            let summaries = pipeline.run()?;

            println!();
            for summary in &summaries {
                println!("{}", summary.summary());
            }
            println!("Processing complete!");
        }

        Commands::Dates { data_dir, variable } => {
            let inventory = FileInventory::scan(&data_dir)?;
            let files = inventory.filter_by_variable(variable);
            let dates = extract_dates(&files, variable)?;

            println!(
                "{} timestamps for {} in {} ({} files)",
                dates.len(),
                variable,
                data_dir.display(),
                files.len()
            );
            for date in dates {
                println!("  {}", date.key());
            }
        }

        Commands::Info {
            metadata_path,
            sample,
        } => {
            println!("Analyzing metadata file: {}", metadata_path.display());

            let loaded = MetadataStore::new(&metadata_path).load_or_default()?;
            match &loaded.source {
                DocumentSource::Existing => {}
                DocumentSource::Missing => {
                    println!("File not found");
                    return Ok(());
                }
                DocumentSource::Recovered { reason } => {
                    println!("File is not a valid metadata document: {}", reason);
                    return Ok(());
                }
            }

            let document = loaded.document;
            println!("{} entries\n", document.len());

            for name in document.keys() {
                match document.variable(name) {
                    Ok(Some(extrema)) => {
                        println!(
                            "{}: min={}, max={}, {} timestamps",
                            name,
                            format_extremum(extrema.min_global),
                            format_extremum(extrema.max_global),
                            extrema.timestamp_count()
                        );
                        for ((key, mins), (_, maxs)) in extrema
                            .min_local
                            .iter()
                            .zip(extrema.max_local.iter())
                            .take(sample)
                        {
                            let lo = mins.iter().copied().fold(f64::INFINITY, f64::min);
                            let hi = maxs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                            println!("  {}: {} chunks, min={}, max={}", key, mins.len(), lo, hi);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{}: not an extrema entry ({})", name, e),
                }
            }
        }
    }

    Ok(())
}
