use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pyrite_ast::{BuiltinKind, DataKind};
use pyrite_compiler::{
    ConfigError, FunctionSignature, Registries, RegistryConfig, WrapperGenerator, WrapperSpec,
};
use pyrite_diagnostics::DiagnosticEngine;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pyrite")]
#[command(version = "0.2.0")]
#[command(about = "Typed builtins and native wrapper generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate wrapper specs for function signatures
    Wrap {
        /// JSON file with one signature or an array of signatures
        #[arg(value_name = "SIGNATURES")]
        input: PathBuf,

        /// Registry extension file
        #[arg(short, long, value_name = "EXT")]
        registry: Option<PathBuf>,

        /// Output specs and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective registries
    Registry {
        /// Registry extension file
        #[arg(short, long, value_name = "EXT")]
        registry: Option<PathBuf>,
    },

    /// List the builtin name table
    Builtins,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Wrap {
            input,
            registry,
            json,
        } => {
            let registries = load_registries(registry.as_deref())?;
            let signatures = load_signatures(&input)?;
            log::info!("Wrapping {} function(s) from {:?}", signatures.len(), input);

            let (specs, engine) = WrapperGenerator::new(&registries).generate_all(&signatures);

            if json {
                println!("{}", render_json(&specs, &engine)?);
            } else {
                for spec in &specs {
                    print!("{}", render_spec(spec));
                }
                if engine.has_diagnostics() {
                    engine.print_all();
                    engine.print_summary();
                }
            }

            if engine.has_fatal() {
                return Err(anyhow::anyhow!(
                    "{} of {} wrapper(s) could not be generated",
                    engine.fatal_count(),
                    signatures.len()
                ));
            }
            Ok(())
        }

        Commands::Registry { registry } => {
            let registries = load_registries(registry.as_deref())?;
            print!("{}", render_registries(&registries));
            Ok(())
        }

        Commands::Builtins => {
            print!("{}", render_builtins());
            Ok(())
        }
    }
}

fn load_registries(extension: Option<&Path>) -> Result<Registries> {
    let builder = Registries::builder();
    let builder = match extension {
        Some(path) => {
            log::debug!("Loading registry extension {:?}", path);
            let config = RegistryConfig::from_file(path).inspect_err(|err| {
                if let Some(diagnostic) = config_diagnostic(err) {
                    eprintln!("{}", diagnostic);
                }
            })?;
            config.apply(builder)
        }
        None => builder,
    };
    Ok(builder.build())
}

/// The coded diagnostic of an invalid extension entry, if that is what failed
fn config_diagnostic(err: &anyhow::Error) -> Option<pyrite_diagnostics::Diagnostic> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ConfigError>())
        .map(ConfigError::to_diagnostic)
}

fn load_signatures(path: &Path) -> Result<Vec<FunctionSignature>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    FunctionSignature::parse_many(&content)
        .with_context(|| format!("Invalid signatures in {}", path.display()))
}

fn render_json(specs: &[WrapperSpec], engine: &DiagnosticEngine) -> Result<String> {
    let report = serde_json::json!({
        "specs": specs,
        "diagnostics": engine.diagnostics(),
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_spec(spec: &WrapperSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", spec.function);
    let _ = writeln!(out, "  parse: \"{}\"", spec.parse_format);
    let _ = writeln!(out, "  build: \"{}\"", spec.build_format);

    for arg in &spec.arguments {
        let _ = write!(out, "  arg {}: {} via {}", arg.name, arg.native, arg.format);
        if arg.optional {
            out.push_str(" (optional)");
        }
        for check in &arg.checks {
            let _ = write!(out, ", check {}", check);
        }
        if let Some(cast) = &arg.cast {
            let _ = write!(out, ", cast {}", cast);
        }
        out.push('\n');
    }

    for result in &spec.results {
        let _ = write!(out, "  result {}: {} via {}", result.name, result.native, result.format);
        if let Some(cast) = &result.cast {
            let _ = write!(out, ", cast {}", cast);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "  {}: [{}]",
        spec.keywords.name,
        spec.keywords.arg_names.join(", ")
    );
    out
}

fn render_registries(registries: &Registries) -> String {
    let mut out = String::new();

    out.push_str("format codes:\n");
    for (dtype, code) in registries.format_codes() {
        let _ = writeln!(out, "  {:<16} {}", dtype.to_string(), code);
    }

    out.push_str("check predicates:\n");
    for (kind, predicate) in registries.check_predicates() {
        let _ = writeln!(out, "  {:<16} {}", kind.name(), predicate);
    }

    out.push_str("type flags:\n");
    for (dtype, flag) in registries.type_flags() {
        let _ = writeln!(out, "  {:<16} {}", dtype.to_string(), flag);
    }

    out.push_str("value collectors:\n");
    for kind in [DataKind::Integer, DataKind::Real] {
        if let Some(collector) = registries.collector(kind) {
            let _ = writeln!(out, "  {:<16} {}", kind.name(), collector);
        }
    }

    out.push_str("casts:\n");
    for cast in registries.casts() {
        let _ = writeln!(out, "  {}", cast);
    }

    for (cast, primitive) in registries.unresolved_primitives() {
        log::warn!("cast `{}` calls undeclared primitive `{}`", cast, primitive);
    }
    out
}

fn render_builtins() -> String {
    let mut out = String::new();
    for name in BuiltinKind::names() {
        let Some(kind) = BuiltinKind::from_name(name) else {
            continue;
        };
        let role = match kind.cast_target() {
            Some(target) => format!("cast to {}", target.name()),
            None if kind.is_iteration() => "iteration".to_string(),
            None => "value".to_string(),
        };
        let _ = writeln!(out, "{:<10} {}", name, role);
    }
    out
}
