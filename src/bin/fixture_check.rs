//! Fixture Check CLI
//!
//! Compiles a schema descriptor into a document validator and checks demo
//! fixture files against it. Also exports the compiled shape as JSON Schema
//! and inspects the descriptor's reference graph.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fixture_schemas::{
    object_to_json_schema, Compiler, FixtureConfig, Issue, ObjectValidator, ReferenceGraph,
    SchemaDescriptor,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "fixture-check")]
#[command(about = "Check demo fixture data against an API schema descriptor")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check fixture documents against the compiled document validator
    Check {
        /// Schema descriptor (JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Fixture files or directories to check
        #[arg(required = true)]
        data: Vec<PathBuf>,
        /// Allow documents that contain only some models
        #[arg(long)]
        partial: bool,
        /// Override the reference depth bound
        #[arg(long)]
        max_depth: Option<usize>,
        /// Write a JSON report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Export the document validator as JSON Schema
    Export {
        /// Schema descriptor (JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Export the partial document shape
        #[arg(long)]
        partial: bool,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show fixture models, reference cycles, dangling refs and diagnostics
    Inspect {
        /// Schema descriptor (JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Save it to this file instead
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

/// Outcome for one fixture file
#[derive(Serialize)]
struct FileResult {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = FixtureConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check {
            schema,
            data,
            partial,
            max_depth,
            report,
        } => {
            let mut options = config.compiler;
            if let Some(depth) = max_depth {
                options.max_depth = depth;
            }

            let descriptor = load_schema(&schema)?;
            let mut compiler = Compiler::new(options);
            let document = compile(&mut compiler, &descriptor, partial);
            let diagnostics = compiler.into_diagnostics();

            println!(
                "🔍 Checking fixtures against {} ({} document, {} models)",
                schema.display(),
                if partial { "partial" } else { "full" },
                document.len()
            );
            if !diagnostics.is_empty() {
                println!();
                println!("{}", diagnostics.format_all());
            }
            println!();

            let files = collect_data_files(&data);
            let results: Vec<FileResult> = files.iter().map(|f| check_file(&document, f)).collect();

            for result in &results {
                if result.valid {
                    println!("  ✅ {}", result.path);
                    continue;
                }
                println!("  ❌ {}", result.path);
                if let Some(error) = &result.error {
                    println!("     └─ {}", error);
                }
                for issue in &result.issues {
                    println!("     └─ {}", issue);
                }
            }

            let failed = results.iter().filter(|r| !r.valid).count();
            let warnings_fail = config.output.fail_on_warnings && diagnostics.has_warnings();

            if let Some(path) = report {
                let report = serde_json::json!({
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "schema": schema.display().to_string(),
                    "mode": if partial { "partial" } else { "full" },
                    "documents": results.len(),
                    "passed": results.len() - failed,
                    "failed": failed,
                    "diagnostics": diagnostics,
                    "results": results,
                });
                std::fs::write(&path, config.output.format.render(&report)?)
                    .with_context(|| format!("writing report to {}", path.display()))?;
                println!();
                println!("📝 Report written to {}", path.display());
            }

            println!();
            if failed > 0 {
                println!("❌ {} of {} fixture file(s) failed", failed, results.len());
                std::process::exit(1);
            }
            if warnings_fail {
                println!("❌ Schema produced {} warning(s)", diagnostics.warning_count());
                std::process::exit(1);
            }
            println!("✅ All {} fixture file(s) valid", results.len());
            Ok(())
        }

        Commands::Export {
            schema,
            partial,
            output,
        } => {
            let descriptor = load_schema(&schema)?;
            let mut compiler = Compiler::new(config.compiler);
            let document = compile(&mut compiler, &descriptor, partial);
            let rendered = config.output.format.render(&object_to_json_schema(&document))?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing schema to {}", path.display()))?;
                    println!("✅ Exported {} models to {}", document.len(), path.display());
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Inspect { schema } => {
            let descriptor = load_schema(&schema)?;
            let graph = ReferenceGraph::build(&descriptor);

            println!("📊 {}", schema.display());
            println!("  Models:     {}", graph.model_count());
            println!("  References: {}", graph.reference_count());
            println!();

            println!("Fixture models ({}):", graph.fixture_models().len());
            for name in graph.fixture_models() {
                println!("  • {}", name);
            }

            let cycles = graph.cycles();
            if !cycles.is_empty() {
                println!();
                println!("Reference cycles ({}):", cycles.len());
                for cycle in &cycles {
                    if cycle.is_self_referential {
                        println!("  ↻ {} (self)", cycle.members.join(""));
                    } else {
                        println!("  ↻ {}", cycle.members.join(" ↔ "));
                    }
                }
            }

            if !graph.dangling().is_empty() {
                println!();
                println!("Dangling references ({}):", graph.dangling().len());
                for dangling in graph.dangling() {
                    print!("  ⚠️  {}{} -> {}", dangling.from_model, dangling.site, dangling.target);
                    if !dangling.suggestions.is_empty() {
                        print!(" (did you mean {}?)", dangling.suggestions.join(", "));
                    }
                    println!();
                }
            }

            let mut compiler = Compiler::new(config.compiler);
            compiler.compile_documents(&descriptor);
            let diagnostics = compiler.into_diagnostics();
            println!();
            if diagnostics.is_empty() {
                println!("✅ No compile diagnostics");
            } else {
                println!("{}", diagnostics.format_all());
            }
            Ok(())
        }

        Commands::Config { save } => {
            match save {
                Some(path) => {
                    config.save(&path)?;
                    println!("✅ Configuration saved to {}", path.display());
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

fn load_schema(path: &Path) -> Result<SchemaDescriptor> {
    SchemaDescriptor::from_path(path).with_context(|| format!("loading schema {}", path.display()))
}

fn compile(compiler: &mut Compiler, schema: &SchemaDescriptor, partial: bool) -> ObjectValidator {
    if partial {
        compiler.partial_document(schema)
    } else {
        compiler.full_document(schema)
    }
}

/// Files as given, directories expanded to their `*.json` files in path order
fn collect_data_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn check_file(document: &ObjectValidator, path: &Path) -> FileResult {
    let display = path.display().to_string();

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(value) => {
            let report = document.check(&value);
            FileResult {
                path: display,
                valid: report.is_valid(),
                issues: report.issues().to_vec(),
                error: None,
            }
        }
        Err(error) => FileResult {
            path: display,
            valid: false,
            issues: Vec::new(),
            error: Some(error),
        },
    }
}
