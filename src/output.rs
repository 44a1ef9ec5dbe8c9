use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use statrs::statistics::Statistics;
use tabled::{settings::Style, Table, Tabled};

use crate::config::ProbeKind;
use crate::data::{ReductionRun, SampleAxis};

#[derive(Tabled)]
struct ConditionRow {
    #[tabled(rename = "Condition")]
    condition: String,
    #[tabled(rename = "Shots")]
    shots: usize,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Peak RMS")]
    peak_rms: String,
    #[tabled(rename = "Mean RMS")]
    mean_rms: String,
    #[tabled(rename = "Peak n_e (m^-3)")]
    peak_density: String,
    #[tabled(rename = "Mean n_e (m^-3)")]
    mean_density: String,
}

/// One line of the exported table: a single sample of a named series.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    condition: &'a str,
    series: &'a str,
    index: usize,
    x: f64,
    value: f64,
}

fn format_stat(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4e}")
    } else {
        "-".to_string()
    }
}

pub fn print_report(run: &ReductionRun, probe: ProbeKind) {
    println!("\n=== {probe} Probe Reduction ===\n");
    println!("Density constant C: {:.4e}", run.density_constant);

    if run.is_empty() {
        println!("No conditions found.");
        return;
    }

    let rows: Vec<ConditionRow> = run
        .density
        .iter()
        .map(|(name, density)| {
            let averaged = run.averaged.get(name).map(Vec::as_slice).unwrap_or(&[]);
            ConditionRow {
                condition: name.clone(),
                shots: run.rms.get(name).map_or(0, Vec::len),
                samples: density.len(),
                peak_rms: format_stat(Statistics::max(averaged)),
                mean_rms: format_stat(averaged.mean()),
                peak_density: format_stat(Statistics::max(density)),
                mean_density: format_stat(density.mean()),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{table}\n");
}

/// Write every signal of the run as a long tab-delimited table with a header
/// row.
///
/// For each condition the per-shot RMS signals come first, as series
/// `rms_<shot file>`, followed by `rms_mean` and `density`.
pub fn export_run(path: &Path, run: &ReductionRun, axis: SampleAxis) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(file);

    for (name, density) in &run.density {
        let mut series: Vec<(String, &[f64])> = run
            .rms
            .get(name)
            .into_iter()
            .flatten()
            .map(|signal| (format!("rms_{}", signal.shot), signal.rms.as_slice()))
            .collect();
        if let Some(averaged) = run.averaged.get(name) {
            series.push(("rms_mean".to_string(), averaged.as_slice()));
        }
        series.push(("density".to_string(), density.as_slice()));

        for (label, values) in &series {
            for (index, value) in values.iter().enumerate() {
                writer
                    .serialize(ExportRow {
                        condition: name,
                        series: label,
                        index,
                        x: axis.value(index),
                        value: *value,
                    })
                    .with_context(|| format!("failed to write {:?}", path))?;
            }
        }
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}
