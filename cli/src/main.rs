//! unbhf CLI - Borland help file reader
//!
//! A command-line tool for inspecting BHF help files and extracting their
//! topics as plain text or HTML.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unbhf::{export, BhfFile, ParseOptions, RenderOptions, TextFormat, Unbhf};

/// Borland hypertext help (BHF) reader
#[derive(Parser)]
#[command(
    name = "unbhf",
    author = "iyulab",
    version,
    about = "Inspect and extract Borland hypertext help files",
    long_about = "unbhf - Borland hypertext help (BHF) file reader.\n\n\
                  Decodes Turbo Pascal, Turbo C++ and Borland Pascal help files.\n\n\
                  Usage:\n  \
                  unbhf <file>                  Show file information\n  \
                  unbhf text <file> <context>   Render one topic\n  \
                  unbhf export <file>           Render every topic to a directory"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (shows file information)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fail on any format problem instead of reporting it
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the catalog summary
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// List the context table
    Contexts {
        /// Input file path
        input: PathBuf,
    },

    /// List the index
    Index {
        /// Input file path
        input: PathBuf,

        /// Only show labels starting with this prefix
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Render one topic
    Text {
        /// Input file path
        input: PathBuf,

        /// Context id (default: the main index)
        context: Option<u16>,

        /// Look the topic up by index label instead
        #[arg(short, long, conflicts_with = "context")]
        label: Option<String>,

        /// Render HTML instead of plain text
        #[arg(long)]
        html: bool,

        /// Keep stored line breaks
        #[arg(long)]
        no_reflow: bool,

        /// Link target prefix for HTML output
        #[arg(long, default_value = "#context-")]
        link_prefix: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every record in file order
    Records {
        /// Input file path
        input: PathBuf,
    },

    /// Write the catalog as JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Render every topic to a directory
    Export {
        /// Input file path
        input: PathBuf,

        /// Output directory (default: <filename>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one linked HTML page instead of text files
        #[arg(long)]
        html: bool,

        /// Keep stored line breaks
        #[arg(long)]
        no_reflow: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    // RUST_LOG is honoured only with --verbose so log lines stay off the terminal by default
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let parse_options = if cli.strict {
        ParseOptions::new().strict()
    } else {
        ParseOptions::new()
    };

    let Some(command) = cli.command else {
        // Default command (unbhf <file>)
        return match cli.input {
            Some(input) => run_info(&input, parse_options),
            None => {
                use clap::CommandFactory;
                Cli::command().print_help()?;
                Ok(())
            }
        };
    };

    match command {
        Commands::Info { input } => run_info(&input, parse_options)?,

        Commands::Contexts { input } => {
            let file = BhfFile::open_with_options(&input, parse_options)?;
            let document = file.document();

            println!("{}", "Contexts".cyan().bold());
            println!("{}", "─".repeat(40));
            for (id, offset) in document.contexts.iter().enumerate() {
                let marker = if id == usize::from(document.file_header.main_index) {
                    " (main index)".green().to_string()
                } else {
                    String::new()
                };
                println!("{:>6}  {:>10}{}", id, offset, marker);
            }
        }

        Commands::Index { input, search } => {
            let file = BhfFile::open_with_options(&input, parse_options)?;
            let document = file.document();

            let entries: Vec<_> = match &search {
                Some(prefix) => document.search_index(prefix).collect(),
                None => document.index.iter().collect(),
            };

            for entry in &entries {
                let offset = document
                    .resolve(entry)
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "?".red().to_string());
                println!(
                    "{:<40} {:>6} {:>10}",
                    entry.label,
                    entry.context.to_string().dimmed(),
                    offset
                );
            }
            if search.is_some() {
                println!("\n{} {} matches", "✓".green().bold(), entries.len());
            }
        }

        Commands::Text {
            input,
            context,
            label,
            html,
            no_reflow,
            link_prefix,
            output,
        } => {
            let mut builder = Unbhf::new().with_link_prefix(link_prefix);
            if cli.strict {
                builder = builder.strict();
            }
            if html {
                builder = builder.html();
            }
            if no_reflow {
                builder = builder.without_reflow();
            }

            let mut help = builder.open(&input)?;
            let content = match (context, label) {
                (Some(id), _) => help.render(id)?,
                (None, Some(label)) => match help.render_label(&label)? {
                    Some(content) => content,
                    None => return Err(format!("no index entry named {:?}", label).into()),
                },
                (None, None) => help.render_main_index()?,
            };

            write_output(output.as_ref(), &content)?;
            print_diagnostics(help.file().diagnostics());

            if let Some(path) = output {
                println!("{} Rendered topic: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Records { input } => {
            let mut file = BhfFile::open_with_options(&input, parse_options)?;

            println!("{}", "Records".cyan().bold());
            println!("{}", "─".repeat(40));
            let mut count = 0;
            for record in file.records() {
                let record = record?;
                println!(
                    "{:>10}  {:<12} {:>6} bytes",
                    record.offset,
                    format!("{:?}", record.header.record_type()),
                    record.header.length
                );
                count += 1;
            }
            println!("\n{}: {}", "Total".bold(), count);
        }

        Commands::Json {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Parsing catalog...");

            let file = BhfFile::open_with_options(&input, parse_options)?;
            let json = if compact {
                serde_json::to_string(file.document())?
            } else {
                file.document().to_json()?
            };

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Export {
            input,
            output,
            html,
            no_reflow,
        } => run_export(&input, output, html, no_reflow, parse_options)?,

        Commands::Version => print_version(),
    }

    Ok(())
}

fn run_info(input: &Path, parse_options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let file = BhfFile::open_with_options(input, parse_options)?;
    let document = file.document();
    let header = &document.file_header;

    println!("{}", "Help File Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Stamp".bold(), document.stamp);
    println!("{}: {}", "Signature".bold(), document.signature_text());
    println!(
        "{}: {} (text {})",
        "Format".bold(),
        document.version.format,
        document.version.text
    );

    println!("\n{}", "File Header".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {:#06x}", "Options".bold(), header.options);
    match document.main_index_offset() {
        Some(offset) => println!(
            "{}: {} (offset {})",
            "Main index".bold(),
            header.main_index,
            offset
        ),
        None => println!("{}: {} (unresolved)", "Main index".bold(), header.main_index),
    }
    println!("{}: {}", "Largest record".bold(), header.largest_record);
    println!(
        "{}: {}x{} (margin {})",
        "Screen".bold(),
        header.width,
        header.height,
        header.left_margin
    );
    println!("{}: {}", "Text width".bold(), header.max_width());

    let table: Vec<_> = document
        .compression
        .table
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    println!("\n{}", "Compression".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {:?}", "Type".bold(), document.compression.kind);
    println!("{}: {}", "Table".bold(), table.join(" "));

    println!("\n{}", "Contents".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Contexts".bold(), document.contexts.len());
    println!("{}: {}", "Topics".bold(), document.topic_offsets().len());
    println!("{}: {}", "Index entries".bold(), document.index.len());

    print_diagnostics(file.diagnostics());
    Ok(())
}

fn run_export(
    input: &Path,
    output: Option<PathBuf>,
    html: bool,
    no_reflow: bool,
    parse_options: ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = match output {
        Some(p) => p,
        None => {
            let stem = input
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let parent = input.parent().unwrap_or(Path::new("."));
            parent.join(format!("{}_output", stem))
        }
    };

    let data = fs::read(input)?;
    let document =
        BhfFile::from_reader_with_options(io::Cursor::new(data.as_slice()), parse_options.clone())?
            .into_document();

    let format = if html { TextFormat::Html } else { TextFormat::PlainText };
    let mut options = RenderOptions::new().with_format(format);
    if no_reflow {
        options = options.without_reflow();
    }

    let pb = ProgressBar::new(document.topic_offsets().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len} topics")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let results = export::render_all_with_progress(data, &document, &parse_options, &options, |_| {
        pb.inc(1)
    });
    pb.finish_and_clear();

    let mut topics = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(topic) => topics.push(topic),
            Err(e) => failures.push(e),
        }
    }

    let written = export::write_topics(&topics, &output_dir, format)?;

    println!("{}", "Export Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    println!("{}: {}", "Topics".bold(), topics.len());
    println!("{}: {}", "Files".bold(), written.len());
    let diagnostics: Vec<_> = export::diagnostics(&topics).cloned().collect();
    print_diagnostics(&diagnostics);
    if !failures.is_empty() {
        println!("\n{} {} topics failed", "!".yellow().bold(), failures.len());
        for failure in &failures {
            println!("  {} {}", "-".yellow(), failure);
        }
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &[unbhf::Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\n{}", "Diagnostics".yellow().bold());
    println!("{}", "─".repeat(40));
    for diagnostic in diagnostics {
        println!("  {} {}", "!".yellow(), diagnostic);
    }
}

fn print_version() {
    println!("{} {}", "unbhf".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Borland hypertext help (BHF) file reader");
    println!();
    println!("Supported formats: Turbo Pascal 2.0/4.0/6.0, Turbo C++ 3.0, Borland Pascal 7.0");
    println!("Repository: https://github.com/iyulab/unbhf");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_text_command_args() {
        let cli = Cli::try_parse_from(["unbhf", "text", "TURBO.TPH", "12", "--html"]).unwrap();
        match cli.command {
            Some(Commands::Text {
                context, html, label, ..
            }) => {
                assert_eq!(context, Some(12));
                assert!(html);
                assert!(label.is_none());
            }
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_bare_file_is_info() {
        let cli = Cli::try_parse_from(["unbhf", "TURBO.TPH"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input, Some(PathBuf::from("TURBO.TPH")));
    }
}
