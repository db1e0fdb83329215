//! Print every breakpoint layout for one or more dashboard record files.
//!
//! ```text
//! cargo run -p dg-core --example preview_layouts -- dashboard.json [sizes.json]
//! ```
//!
//! The first record's `dashboardId` names the dashboard. Without a size
//! table file the builtin table is used.

use dg_core::{Board, Breakpoint, GridConfig, PlacementRecord, ResponsiveTransformer, SizeTable};
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(records_path) = args.first() else {
        eprintln!("usage: preview_layouts <records.json> [sizes.json]");
        return ExitCode::FAILURE;
    };

    match run(records_path, args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR {records_path}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(records_path: &str, sizes_path: Option<&str>) -> Result<(), String> {
    let input = fs::read_to_string(records_path).map_err(|e| e.to_string())?;
    let records: Vec<PlacementRecord> = serde_json::from_str(&input).map_err(|e| e.to_string())?;
    let Some(dashboard) = records.first().map(|r| r.dashboard_id) else {
        println!("(no records)");
        return Ok(());
    };

    let sizes = match sizes_path {
        Some(path) => SizeTable::from_json(&fs::read_to_string(path).map_err(|e| e.to_string())?)?,
        None => SizeTable::builtin(),
    };

    let config = GridConfig::default();
    let board = Board::new(dashboard, records, config)?;
    let mut transformer = ResponsiveTransformer::new(sizes, &config);

    for bp in Breakpoint::ALL {
        println!("{bp} ({} column(s))", bp.columns());
        for item in transformer.transform(board.records(), bp).iter() {
            println!("  {:<12} {}", item.id.as_str(), item.rect);
        }
    }
    Ok(())
}
