use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use ismip_hom::coordinates::{
    count_outside_unit_square, normalize, ConventionDetector, FirstSampleHeuristic,
};
use ismip_hom::data_loader::{decode_table, load_table};
use ismip_hom::{InputRecord, RecordId};

/// Print what the pipeline would make of a single result file
#[derive(Parser, Debug)]
#[command(name = "inspect_record")]
struct Args {
    /// Path to an ISMIP-HOM result file, e.g. oga1a005.txt
    file: PathBuf,

    /// Number of leading rows to print
    #[arg(short, long, default_value = "5")]
    rows: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let file_path = &args.file;

    println!("Inspecting result file: {}", file_path.display());

    let id = RecordId::from_path(file_path).context("file name does not follow MMMMELLL")?;
    let record = InputRecord::new(file_path.clone(), id, None);

    println!("\n=== RECORD ===");
    println!("{}", record);

    if !record.method_class.is_known() {
        println!("\nModel {} is not classified, its data is never loaded.", record.id.model_code);
        return Ok(());
    }

    let table = load_table(file_path).with_context(|| format!("reading {}", file_path.display()))?;
    let experiment = record.id.experiment;

    println!("\n=== TABLE ===");
    println!("  rows = {}", table.nrows());
    println!("  columns = {} (expected {})", table.ncols(), experiment.column_count());
    println!("  schema = {}", experiment.columns().join(", "));

    match decode_table(file_path, experiment, &table) {
        Ok(samples) => println!("  decoded {} samples", samples.len()),
        Err(e) => println!("  schema mismatch: {}", e),
    }

    if table.ncols() >= 2 && experiment.has_query_grid() {
        let mut positions: Vec<[f64; 2]> = table.rows().into_iter().map(|r| [r[0], r[1]]).collect();
        if experiment == ismip_hom::Experiment::F {
            let detector = FirstSampleHeuristic;
            let convention = detector.detect(&positions);
            normalize(&mut positions, convention);
            println!("\n=== COORDINATES ===");
            println!("  convention = {} (detector: {})", convention, detector.name());
            println!(
                "  rows outside the unit square after normalizing = {}",
                count_outside_unit_square(&positions)
            );
        }
    }

    println!("\nFirst rows:");
    for row in table.rows().into_iter().take(args.rows) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>12.6}", v)).collect();
        println!("  {}", cells.join(" "));
    }

    Ok(())
}
