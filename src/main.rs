use clap::Parser;
use std::path::PathBuf;
use std::process;
use xlschema::config::Options;
use xlschema::namespace::NamespaceKind;
use xlschema::reader::YamlReader;
use xlschema::writer::{Writer, WriterKind};

/// Generate code from a YAML relational schema.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input schema (.yml)
    input: Option<PathBuf>,

    /// Writer as suffix/method, e.g. sql/sqlite (repeatable)
    #[arg(short, long = "writer")]
    writers: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Attach namespace values: package or djapp
    #[arg(long)]
    namespace: Option<String>,

    /// Column for right-aligned definition comments (0 disables)
    #[arg(long)]
    comment_offset: Option<usize>,

    /// List available writers and exit
    #[arg(long)]
    list: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list {
        for kind in WriterKind::ALL {
            println!("{}", kind.key());
        }
        return;
    }

    let Some(input) = cli.input else {
        fail("Usage: xlschema <input.yml> -w <suffix/method> [options] (see --help)");
    };

    let mut options = Options::default();
    if let Some(output) = cli.output {
        options = options.with_output(output);
    }
    if let Some(offset) = cli.comment_offset {
        options = options.with_comment_offset(offset);
    }

    let namespace = cli.namespace.as_deref().map(|name| {
        NamespaceKind::from_str(name).unwrap_or_else(|| fail(format!("Invalid namespace: {name}")))
    });

    let kinds: Vec<WriterKind> = cli
        .writers
        .iter()
        .map(|w| WriterKind::from_str(w).unwrap_or_else(|| fail(format!("Unknown writer: {w}"))))
        .collect();
    if kinds.is_empty() {
        fail("No writer given; use -w <suffix/method> (see --list)");
    }

    let schema = YamlReader::new(options.clone())
        .read_path(&input)
        .unwrap_or_else(|e| fail(format!("Failed to read {}: {e}", input.display())));

    for kind in kinds {
        let mut writer = Writer::new(&schema, kind, options.clone());
        if let Some(namespace) = namespace {
            writer = writer.with_namespace(namespace);
        }

        let result = if cli.stdout {
            writer.render().map(|code| print!("{code}"))
        } else {
            writer.write().map(|_| ())
        };
        if let Err(e) = result {
            fail(format!("{}: {e}", kind.key()));
        }
    }
}
