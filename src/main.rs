//! # bbs-charmap CLI - Legacy Code Page Converter
//!
//! Command-line interface for converting BBS and FidoNet message text
//! between legacy code pages and UTF-8.

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufReader, BufWriter, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use bbs_charmap::{
    Charset, CodePage, Direction, Provider, StreamingTranslator, Translator, registry,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// bbs-charmap: legacy code page converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bbs-charmap")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Decode code page text to UTF-8
    Decode(StreamArgs),

    /// Encode UTF-8 text into a code page
    Encode(StreamArgs),

    /// Convert between two legacy code pages
    Convert(ConvertArgs),

    /// List all supported code pages
    List(ListArgs),

    /// Display detailed information about a code page
    Info(InfoArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct StreamArgs {
    /// Code page identifier; unknown names fall back to LATIN-1
    #[arg(short, long)]
    charset: String,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Buffer size for large files (KB)
    #[arg(long, default_value = "64")]
    buffer_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source code page
    #[arg(short = 'f', long = "from")]
    from: CodePage,

    /// Target code page
    #[arg(short = 't', long = "to")]
    to: CodePage,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ListArgs {
    /// Filter by provider
    #[arg(short, long)]
    provider: Option<ProviderArg>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InfoArgs {
    /// Code page to describe
    code_page: CodePage,

    /// Show character mapping samples
    #[arg(long)]
    samples: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProviderArg {
    Table,
    Whatwg,
}

#[cfg(feature = "cli")]
impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Table => Provider::Table,
            ProviderArg::Whatwg => Provider::Whatwg,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult {
    success: bool,
    charset: String,
    bytes_processed: usize,
    bytes_written: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(ref args) => stream_command(args, Direction::Decode, &cli)?,
        Commands::Encode(ref args) => stream_command(args, Direction::Encode, &cli)?,
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::List(ref args) => list_command(args, &cli)?,
        Commands::Info(ref args) => info_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn open_input(path: Option<&Path>, verbose: bool) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            if verbose {
                eprintln!("Reading from: {}", path.display());
            }
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            if verbose {
                eprintln!("Reading from stdin");
            }
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

#[cfg(feature = "cli")]
fn open_output(path: Option<&Path>, verbose: bool) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if verbose {
                eprintln!("Writing to: {}", path.display());
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(feature = "cli")]
fn stream_command(args: &StreamArgs, direction: Direction, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    if args.buffer_size == 0 {
        anyhow::bail!("--buffer-size must be at least 1 KB");
    }
    let Some(chunk_size) = buffer_bytes(args.buffer_size) else {
        anyhow::bail!("--buffer-size {} KB is too large", args.buffer_size);
    };

    let charset = match direction {
        Direction::Decode => Charset::for_decode(&args.charset),
        Direction::Encode => Charset::for_encode(&args.charset),
    };

    if cli.verbose {
        let known = match direction {
            Direction::Decode => registry::lookup(&args.charset.to_uppercase()),
            Direction::Encode => registry::lookup(&args.charset),
        };
        match charset {
            Charset::Utf8 => eprintln!("{} is UTF-8, copying input unchanged", args.charset),
            Charset::Legacy(page) if known.is_none() => {
                eprintln!("Unknown code page {}, using {}", args.charset, page.name())
            }
            Charset::Legacy(page) => eprintln!("Using code page {}", page.name()),
        }
    }

    let mut reader = open_input(args.input.as_deref(), cli.verbose)?;
    let mut writer = open_output(args.output.as_deref(), cli.verbose)?;

    let mut translator = match charset {
        Charset::Utf8 => None,
        Charset::Legacy(page) => Some(
            StreamingTranslator::new(page, direction, chunk_size)
                .context("Failed to create streaming translator")?,
        ),
    };

    let mut chunk = vec![0u8; chunk_size];
    let mut bytes_processed = 0;
    let mut bytes_written = 0;
    loop {
        let n = reader.read(&mut chunk).context("Failed to read input")?;
        if n == 0 {
            break;
        }
        bytes_processed += n;
        let converted = match translator.as_mut() {
            Some(translator) => translator
                .process_chunk(&chunk[..n])
                .context("Conversion failed")?,
            None => chunk[..n].to_vec(),
        };
        writer
            .write_all(&converted)
            .context("Failed to write output")?;
        bytes_written += converted.len();
    }
    if let Some(translator) = translator.as_mut() {
        let tail = translator.finish().context("Conversion failed")?;
        writer.write_all(&tail).context("Failed to write output")?;
        bytes_written += tail.len();
    }
    writer.flush().context("Failed to flush output")?;

    let processing_time = start_time.elapsed();

    if cli.verbose {
        eprintln!(
            "Processed {} bytes -> {} bytes in {:?}",
            bytes_processed, bytes_written, processing_time
        );
    }

    if let OutputFormat::Json = cli.format {
        let result = ConversionResult {
            success: true,
            charset: match charset {
                Charset::Utf8 => registry::UNIVERSAL.to_string(),
                Charset::Legacy(page) => page.name().to_string(),
            },
            bytes_processed,
            bytes_written,
            processing_time_ms: processing_time.as_millis() as u64,
        };
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn buffer_bytes(kilobytes: usize) -> Option<usize> {
    kilobytes.checked_mul(1024)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    if cli.verbose {
        eprintln!("Converting from {} to {}", args.from, args.to);
    }

    let translator = Translator::new(args.from, args.to);

    let mut input_data = Vec::new();
    open_input(args.input.as_deref(), cli.verbose)?
        .read_to_end(&mut input_data)
        .context("Failed to read input")?;

    let output_data = translator
        .convert(&input_data)
        .with_context(|| format!("Failed to convert from {} to {}", args.from, args.to))?;

    let mut writer = open_output(args.output.as_deref(), cli.verbose)?;
    writer
        .write_all(&output_data)
        .context("Failed to write output")?;
    writer.flush().context("Failed to flush output")?;

    let processing_time = start_time.elapsed();

    if cli.verbose {
        eprintln!(
            "Processed {} bytes -> {} bytes in {:?}",
            input_data.len(),
            output_data.len(),
            processing_time
        );
    }

    if let OutputFormat::Json = cli.format {
        let result = ConversionResult {
            success: true,
            charset: args.to.name().to_string(),
            bytes_processed: input_data.len(),
            bytes_written: output_data.len(),
            processing_time_ms: processing_time.as_millis() as u64,
        };
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(args: &ListArgs, cli: &Cli) -> Result<()> {
    let filter = args.provider.map(Provider::from);
    let pages: Vec<_> = CodePage::ALL
        .into_iter()
        .filter(|page| filter.is_none_or(|provider| page.provider() == provider))
        .collect();

    match cli.format {
        OutputFormat::Json => {
            let infos: Vec<_> = pages.iter().map(|page| page.info()).collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        OutputFormat::Text => {
            println!("Supported Code Pages ({} total):", pages.len());
            println!();

            for page in pages {
                println!(
                    "{:10} {:14} {:9} {}",
                    page.name(),
                    page.standard_name(),
                    format!("[{}]", page.provider().label()),
                    page.aliases()[1..].join(", ")
                );
            }
            println!();
            println!("{:10} passthrough", registry::UNIVERSAL);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn info_command(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let page = args.code_page;

    match cli.format {
        OutputFormat::Json => {
            let mut info = serde_json::to_value(page.info())?;
            if args.samples {
                info["samples"] = serde_json::to_value(character_samples(page)?)?;
            }
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("Code Page Information: {}", page.name());
            println!("Standard: {}", page.standard_name());
            println!("Description: {}", page.description());
            println!("Aliases: {}", page.aliases().join(", "));
            println!(
                "Provider: {} ({})",
                page.provider().label(),
                page.codec().name()
            );

            if args.samples {
                println!("\nCharacter Samples:");
                for (byte, text) in character_samples(page)? {
                    println!("  0x{:02X} -> {}", byte, text);
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn character_samples(page: CodePage) -> Result<Vec<(u8, String)>> {
    [0x41u8, 0x80, 0x9F, 0xA0, 0xC9, 0xE0, 0xFF]
        .into_iter()
        .map(|byte| -> Result<(u8, String)> {
            let text = page
                .decode(&[byte])
                .with_context(|| format!("Failed to decode 0x{:02X}", byte))?;
            Ok((byte, text.escape_default().to_string()))
        })
        .collect()
}
