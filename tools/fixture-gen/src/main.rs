//! Fixture generator for SceneSim test suites.
//!
//! Provides commands for:
//! - Generating whole suites from named presets
//! - Generating a single scene from a seed
//! - Checking fixture files for duplicate ids
//!
//! ## Usage
//!
//! ```bash
//! # Five smoke-test cases to a file
//! fixture-gen suite --preset smoke --count 5 --output fixtures/smoke.json
//!
//! # One complex scene to stdout
//! fixture-gen scene --seed 42 --complexity complex
//!
//! # Check a fixture file
//! fixture-gen validate fixtures/smoke.json --report report.json
//! ```

use clap::{Parser, Subcommand};
use scenesim_common::logging::{init_logging, LogConfig};
use scenesim_data::{generate_test_suite, Complexity, SceneDataGenerator, PRESETS};
use std::path::PathBuf;

mod fixtures;

#[derive(Parser)]
#[command(name = "fixture-gen")]
#[command(about = "Generate and validate deterministic SceneSim fixtures")]
struct Cli {
    /// Log filter, e.g. "scenesim_data=debug"
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a test suite from a preset
    Suite {
        /// Preset name (see `presets`)
        #[arg(short, long, default_value = "smoke")]
        preset: String,
        /// Number of test cases
        #[arg(short, long, default_value = "5")]
        count: usize,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a single scene
    Scene {
        #[arg(short, long, default_value = "12345")]
        seed: u32,
        /// simple, medium or complex
        #[arg(short, long, default_value = "medium")]
        complexity: Complexity,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a fixture file for duplicate ids
    Validate {
        /// Fixture file
        file: PathBuf,
        /// Output JSON report path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the suite presets
    Presets,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs share stdout with fixture JSON, so only warnings by default.
    init_logging(LogConfig::default().with_filter(cli.log.unwrap_or_else(|| "warn".to_string())));

    match cli.command {
        Commands::Suite {
            preset,
            count,
            output,
        } => {
            let suite = generate_test_suite(&preset, count)?;
            fixtures::write_json(&suite, output.as_deref())?;
        }

        Commands::Scene {
            seed,
            complexity,
            output,
        } => {
            let scene = SceneDataGenerator::new(seed).generate_scene_data(complexity);
            fixtures::write_json(&scene, output.as_deref())?;
        }

        Commands::Validate { file, report } => {
            let result = fixtures::validate_file(&file)?;

            println!("Validation result for {}:", result.file);
            println!("  Entities:   {}", result.entities);
            println!("  Violations: {}", result.violations.len());
            for violation in &result.violations {
                println!("    - {violation}");
            }

            if let Some(report_path) = report {
                fixtures::write_json(&result, Some(&report_path))?;
                println!("Report written to: {}", report_path.display());
            }

            if !result.valid {
                std::process::exit(1);
            }
        }

        Commands::Presets => {
            for preset in PRESETS {
                println!(
                    "{:<16} seed={:<6} complexity={}",
                    preset.name, preset.seed, preset.complexity
                );
            }
        }
    }

    Ok(())
}
