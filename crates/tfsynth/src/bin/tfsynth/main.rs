mod cli;

use tfsynth::manifest::Manifest;
use tfsynth::{Document, ElementKind};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFSYNTH_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Synth(synth_cli) => synth(synth_cli),
        cli::Command::Catalog => catalog(),
        cli::Command::Schema(schema_cli) => schema(schema_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn synth(cli: cli::SynthCommand) -> anyhow::Result<()> {
    let manifest = load(&cli.input)?;
    let root = manifest.build()?;
    let document = root.synthesize()?;

    output(&cli.output, &document)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Manifest> {
    if input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(Manifest::from_yaml_str(&stdin)?);
    }

    let mut manifest = Manifest::default();

    for file_path in &input.files {
        manifest.merge(Manifest::load_file(file_path)?);
    }

    for dir_path in &input.directories {
        manifest.merge(Manifest::load_directory(dir_path)?);
    }

    anyhow::ensure!(!manifest.elements.is_empty(), "No elements loaded");

    Ok(manifest)
}

fn output(output: &cli::OutputArgs, document: &Document) -> anyhow::Result<()> {
    let rendered = match (&output.format, output.pretty) {
        (cli::OutputFormat::Json, false) => document.to_json()?,
        (cli::OutputFormat::Json, true) => document.to_json_pretty()?,
        (cli::OutputFormat::Yaml, _) => document.to_yaml()?,
        (cli::OutputFormat::Hcl, _) => document.to_hcl()?,
    };

    println!("{}", rendered.trim_end());
    Ok(())
}

pub fn catalog() -> anyhow::Result<()> {
    for schema in tfsynth::catalog::schemas() {
        println!("{:<10} {}", schema.kind().to_string(), schema.type_name());
    }
    Ok(())
}

pub fn schema(cli: cli::SchemaCommand) -> anyhow::Result<()> {
    let kind: ElementKind = cli.kind.parse()?;
    let Some(schema) = tfsynth::catalog::lookup(kind, &cli.type_name) else {
        anyhow::bail!("`{}` is not a known {kind} type", cli.type_name);
    };

    if let Some(provider) = schema.provider() {
        println!("# provider {} ({})", provider.name, provider.source);
    }
    for attribute in schema.attributes() {
        let sensitive = if attribute.sensitive { " sensitive" } else { "" };
        println!(
            "{:<32} {:<18} {}{sensitive}",
            attribute.name,
            attribute.mode.to_string(),
            attribute.shape
        );
    }
    Ok(())
}
