use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use vecpf_core::rules::all_rules;
use vecpf_core::{BitHost, Directive, Engine, EngineConfig};

mod check;
mod lanes;

#[derive(Parser)]
#[command(name = "vecpf")]
#[command(version = "0.2.0")]
#[command(about = "Vector printf engine driver", long_about = None)]
struct Cli {
    /// Configuration file (default: vecpf.json in the current directory or a parent)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log engine decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format one vector with a vector directive
    Format {
        /// Vector directive, e.g. %-8vhd
        #[arg(value_name = "DIRECTIVE")]
        directive: String,

        /// Lane values in register order (one 128-bit value for vz/zv, or a
        /// 16-byte string for %vc)
        #[arg(value_name = "VALUES", required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// List the conversion rule table
    Rules {
        /// Only rules for this conversion character
        #[arg(short, long, value_name = "CHAR")]
        conversion: Option<char>,
    },

    /// Compare every vector directive with an explicit scalar loop
    Check {
        /// Print every mismatch instead of the first few
        #[arg(long)]
        all: bool,
    },

    /// Print or write an example vecpf.json
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(EngineConfig::from_dir(&cwd).unwrap_or_else(|e| {
                warn!("ignoring unreadable vecpf.json: {}", e);
                EngineConfig::default()
            }))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Format { directive, values } => {
            let config = load_config(cli.config.as_deref())?;
            let engine = Engine::initialize(&config, &mut BitHost::new());

            let parsed = Directive::parse(&directive)
                .with_context(|| format!("Invalid directive '{}'", directive))?;
            let request = parsed.to_request(engine.registry()).ok_or_else(|| {
                anyhow!("modifier '{}' is disabled in the configuration", parsed.modifier)
            })?;
            let rule = engine.resolve(&request)?;
            info!("{} -> {} x{}", parsed, rule.kind, rule.element_count());

            let vector = lanes::build_vector(rule, &values, engine.byte_order())?;
            let rendered = engine.format_to_vec(&request, &vector)?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }

        Commands::Rules { conversion } => {
            println!("{:<6} {:<9} {:<15} {:>5}  scalar", "conv", "modifier", "lanes", "count");
            for rule in all_rules().filter(|rule| conversion.map_or(true, |c| rule.conversion == c)) {
                println!(
                    "%{:<5} {:<9} {:<15} {:>5}  %{}",
                    rule.conversion,
                    rule.modifier.token(),
                    rule.kind.to_string(),
                    rule.element_count(),
                    rule.suffix
                );
            }
            Ok(())
        }

        Commands::Check { all } => {
            let config = load_config(cli.config.as_deref())?;
            let engine = Engine::initialize(&config, &mut BitHost::new());
            println!("🔍 Checking vector directives against scalar loops ({:?})", engine.byte_order());

            let report = check::run(&engine)?;
            let shown = if all { report.failed() } else { report.failed().min(10) };
            for mismatch in report.mismatches.iter().take(shown) {
                eprintln!("❌ {} (scalar {})", mismatch.directive, mismatch.scalar);
                eprintln!("   expected: {:?}", mismatch.expected);
                eprintln!("   actual:   {:?}", mismatch.actual);
            }

            if report.skipped > 0 {
                println!("   ⏭️  {} rules skipped (modifier disabled)", report.skipped);
            }
            if report.failed() > 0 {
                return Err(anyhow!(
                    "{} of {} directives differ from the scalar loop",
                    report.failed(),
                    report.failed() + report.passed
                ));
            }
            println!("✅ {} directives match", report.passed);
            Ok(())
        }

        Commands::Config { output } => {
            let example = EngineConfig::example()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, example)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("✅ Wrote {}", path.display());
                }
                None => println!("{}", example),
            }
            Ok(())
        }
    }
}
