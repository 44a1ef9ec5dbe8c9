mod analysis;
mod config;
mod data;
mod loader;
mod output;
mod pipeline;
mod plot;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use config::AppConfig;
use data::SampleAxis;
use output::{export_run, print_report};
use pipeline::{reduce_directory, reduction_for};
use plot::{render_density_svg, PlotSpec};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(config.verbose);
    run(&config)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(config: &AppConfig) -> Result<()> {
    if !config.input_dir.is_dir() {
        bail!("input directory {:?} does not exist", config.input_dir);
    }
    config.validate().context("invalid configuration")?;

    let reduction = reduction_for(config.probe, config.smoothing(), config.probe_setup());
    let reduced = reduce_directory(&config.input_dir, reduction.as_ref())?;
    print_report(&reduced, config.probe);

    let axis = SampleAxis::from_period(config.sample_period);
    if let Some(path) = &config.export {
        export_run(path, &reduced, axis)?;
        info!("exported reduced signals to {:?}", path);
    }

    if let Some(path) = &config.plot {
        let spec = PlotSpec {
            title: &config.title,
            y_label: "n_e (m^-3)",
            axis,
        };
        render_density_svg(path, &reduced.density, &spec)
            .with_context(|| format!("failed to render {:?}", path))?;
        info!("wrote density plot to {:?}", path);
    }

    Ok(())
}
