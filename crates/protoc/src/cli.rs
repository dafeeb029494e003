use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use surface_model::Model;
use surface_openapi::Document;
use tracing::debug;

use crate::error::PluginError;
use crate::plugin;
use crate::renderer::{RenderOptions, Renderer};

#[derive(Parser, Debug)]
#[command(
    name = "protoc-gen-surface",
    version,
    about = "Generate a proto3 service definition from an OpenAPI 3 document"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a plugin request from stdin and write the response to stdout
    Plugin,
    /// Generate <package>.proto from an OpenAPI document file
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(value_name = "INPUT", help = "OpenAPI 3 document (JSON or YAML)")]
    input: PathBuf,
    #[arg(long, help = "proto package name. Defaults to one derived from the document title")]
    package: Option<String>,
    #[arg(
        long = "out-dir",
        default_value = ".",
        help = "Directory the generated file is written to"
    )]
    out_dir: PathBuf,
}

/// Run the command line and return the process exit code.
pub fn run_cli<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = err.exit_code();
            let _ = err.print();
            return code;
        }
    };
    let result = match cli.command {
        Commands::Plugin => run_plugin(),
        Commands::Generate(args) => generate(&args).map(|path| {
            println!("Wrote {}", path.display());
        }),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_plugin() -> Result<(), PluginError> {
    let response = plugin::run(std::io::stdin().lock(), std::io::stdout().lock())?;
    if response.errors.is_empty() {
        Ok(())
    } else {
        for error in &response.errors {
            eprintln!("{error}");
        }
        Err(PluginError::Reported {
            count: response.errors.len(),
        })
    }
}

fn generate(args: &GenerateArgs) -> Result<PathBuf, PluginError> {
    debug!(input = %args.input.display(), "Generating proto file from document.");
    let document = Document::from_path(&args.input)?;
    let model = Model::from_openapi(&document)?;
    let renderer = Renderer::new(
        &model,
        RenderOptions {
            package: args.package.clone(),
        },
    );

    fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(renderer.file_name());
    fs::write(&path, renderer.render())?;
    debug!(package = renderer.package(), path = %path.display(), "Wrote proto file.");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_return_exit_code() {
        assert_eq!(run_cli(["protoc-gen-surface", "frobnicate"]), 2);
        assert_eq!(run_cli(["protoc-gen-surface", "generate"]), 2);
    }

    #[test]
    fn test_help_returns_success() {
        assert_eq!(run_cli(["protoc-gen-surface", "--help"]), 0);
    }
}
