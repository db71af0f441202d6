//! Deck Series Solver
//!
//! Solves one or more deck series from a JSON request file and writes the
//! opening equilibrium of each as JSON.
//!
//! Usage: solve_series <requests.json> [config.json] [output.json]
//!
//! A request is `{ "name": "...", "end_condition": 0, "chart": [[...], ...] }`;
//! the file holds one request or an array of them.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use deck_series_solver::matrix::Matrix;
use deck_series_solver::series::{EndCondition, SeriesConfig, SeriesReport, SeriesSolver};

#[derive(Debug, Deserialize)]
struct SeriesRequest {
    #[serde(default)]
    name: String,
    /// 0 = full elimination, 1 = one deck in reserve
    end_condition: i64,
    chart: Matrix,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Single(SeriesRequest),
    Batch(Vec<SeriesRequest>),
}

#[derive(Debug, Serialize)]
struct NamedReport {
    name: String,
    #[serde(flatten)]
    report: SeriesReport,
}

fn solve_request(request: &SeriesRequest, config: &SeriesConfig) -> Result<NamedReport, String> {
    let end = EndCondition::from_flag(request.end_condition).map_err(|e| e.to_string())?;
    let report = SeriesSolver::new(config.clone())
        .report(&request.chart, end)
        .map_err(|e| e.to_string())?;
    Ok(NamedReport {
        name: request.name.clone(),
        report,
    })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <requests.json> [config.json] [output.json]", args[0]);
        std::process::exit(2);
    }

    let requests = match std::fs::read_to_string(&args[1])
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<RequestFile>(&content).map_err(|e| e.to_string()))
    {
        Ok(RequestFile::Single(request)) => vec![request],
        Ok(RequestFile::Batch(requests)) => requests,
        Err(e) => {
            eprintln!("Error reading {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let config = match args.get(2) {
        Some(path) => match SeriesConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SeriesConfig::default(),
    };
    let output_path = args.get(3).map(String::as_str).unwrap_or("series_report.json");

    println!("=== Deck Series Solver ===\n");
    println!(
        "Requests: {} | Memoize: {} | Parallel stages: {}",
        requests.len(),
        config.memoize,
        config.parallel
    );

    let start = Instant::now();

    // Independent series share nothing, so solve them across the pool
    let results: Vec<Result<NamedReport, String>> = requests
        .par_iter()
        .map(|request| solve_request(request, &config))
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(named) => {
                println!("\n--- {} ---", named.name);
                println!("{}", named.report);
                reports.push(named);
            }
            Err(e) => {
                eprintln!("\n--- {} --- failed: {}", request.name, e);
                failures += 1;
            }
        }
    }

    println!("\n=== Complete ===");
    println!(
        "Solved {}/{} in {:.3}s",
        reports.len(),
        requests.len(),
        start.elapsed().as_secs_f64()
    );

    let written = serde_json::to_string_pretty(&reports)
        .map_err(std::io::Error::from)
        .and_then(|json| std::fs::write(output_path, json));
    match written {
        Ok(_) => println!("Saved JSON: {}", output_path),
        Err(e) => eprintln!("Error saving JSON: {}", e),
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
