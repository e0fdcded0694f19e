use std::path::PathBuf;

use clap::Parser;
use geo_trapmap::io::{read_scene, write_matrix_file};
use geo_trapmap::TrapezoidalMap;
use log::info;

const OUTPUT_FILE: &str = "output_dag_matrix.csv";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input segment list: count, bounding box, one `x1 y1 x2 y2` per line
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    info!("reading input from {:?}", args.input);
    let scene = read_scene(&args.input)?;
    info!(
        "bounding box ({}, {}) - ({}, {}), {} segments",
        scene.bounds.min().x,
        scene.bounds.min().y,
        scene.bounds.max().x,
        scene.bounds.max().y,
        scene.segments.len()
    );

    let mut map = TrapezoidalMap::build(scene.bounds, scene.segments);
    let stats = map.stats();
    info!(
        "built map: {} single splits, {} multi splits, {} skipped",
        stats.single_splits, stats.multi_splits, stats.skipped
    );

    let matrix = map.adjacency_matrix();

    println!("Trapezoids:");
    for leaf in map.leaves() {
        if let Some(cell) = map.dag().trapezoid(leaf) {
            println!("  {}", cell.describe(map.arrangement()));
        }
    }

    write_matrix_file(OUTPUT_FILE, &matrix)?;
    println!(
        "Wrote {0}x{0} adjacency matrix to {1}",
        matrix.len(),
        OUTPUT_FILE
    );

    Ok(())
}
