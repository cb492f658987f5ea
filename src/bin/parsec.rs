//! Command-line driver for the bundled grammars
//!
//! Usage:
//!   parsec --expr `<text>` [--format `<format>`]    - Parse (and evaluate) an arithmetic expression
//!   parsec --json `<file|text>` [--format `<format>`] - Parse a JSON document
//!   parsec `<text>` [--config `<file>`]              - Parse with the grammar named in the config
//!
//! A `parsec.toml` in the working directory is read when present; `--config`
//! and `--format` take precedence over it.
//!
//! Set `RUST_LOG=parsec=trace` to watch the combinators at work.

use std::path::Path;
use std::sync::Once;

use clap::{Arg, ArgGroup, Command};
use parsec::grammars::{expr, json};
use parsec::parsec::config::{GrammarKind, Loader, OutputFormat, ParsecConfig};
use parsec::parsec::formats::{to_sexp_str, to_treeviz_str};
use parsec::Node;

static TRACING_INIT: Once = Once::new();

/// Install a subscriber only if RUST_LOG is set, so normal runs stay quiet.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let matches = Command::new("parsec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse JSON documents and arithmetic expressions with parser combinators")
        .arg_required_else_help(true)
        .arg(
            Arg::new("expr")
                .long("expr")
                .short('e')
                .value_name("TEXT")
                .help("Arithmetic expression to parse"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .short('j')
                .value_name("FILE|TEXT")
                .help("JSON document to parse, read from FILE if it exists"),
        )
        .arg(
            Arg::new("input")
                .help("Input text for the grammar named by driver.grammar")
                .index(1),
        )
        .group(
            ArgGroup::new("source")
                .args(["expr", "json", "input"])
                .required(true),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_parser(["treeviz", "sexp", "debug", "value"])
                .help("Output format (default from config: treeviz)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML file layered over the defaults and ./parsec.toml"),
        )
        .get_matches();

    let config = load_config(
        matches.get_one::<String>("config"),
        matches.get_one::<String>("format"),
    )
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let (grammar, text) = if let Some(text) = matches.get_one::<String>("expr") {
        (GrammarKind::Expr, text.clone())
    } else if let Some(source) = matches.get_one::<String>("json") {
        (GrammarKind::Json, read_source(source))
    } else {
        let input = matches
            .get_one::<String>("input")
            .expect("source group is required");
        (config.driver.grammar, input.clone())
    };

    match run(grammar, &text, &config) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(
    path: Option<&String>,
    format: Option<&String>,
) -> Result<ParsecConfig, config::ConfigError> {
    let mut loader = Loader::default().with_local_file(".");
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    if let Some(format) = format {
        loader = loader.with_format(format)?;
    }
    loader.build()
}

/// `--json` takes a path when one exists on disk, otherwise the literal text
fn read_source(source: &str) -> String {
    if Path::new(source).is_file() {
        std::fs::read_to_string(source).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {}", source, e);
            std::process::exit(1);
        })
    } else {
        source.to_string()
    }
}

fn run(
    grammar: GrammarKind,
    text: &str,
    config: &ParsecConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let tree = match grammar {
        GrammarKind::Json => json::parse(text)?,
        GrammarKind::Expr => expr::parse(text)?,
    };

    let output = match config.output.format {
        OutputFormat::Treeviz => to_treeviz_str(&tree, config.output.label_width),
        OutputFormat::Sexp => format!("{}\n", to_sexp_str(&tree)),
        OutputFormat::Debug => format!("{:#?}\n", tree),
        OutputFormat::Value => format!("{}\n", value_of(grammar, &tree)?),
    };
    Ok(output)
}

fn value_of(grammar: GrammarKind, tree: &Node) -> Result<String, Box<dyn std::error::Error>> {
    match grammar {
        GrammarKind::Json => Ok(serde_json::to_string_pretty(&json::to_value(tree)?)?),
        GrammarKind::Expr => Ok(expr::evaluate(tree)?.to_string()),
    }
}
