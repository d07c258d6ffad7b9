//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::util::HashAlgorithm;

/// carve - extract named byte ranges from binary containers.
#[derive(Parser, Debug)]
#[command(name = "carve")]
#[command(
    author,
    version,
    about,
    long_about = r#"carve pulls named byte ranges out of binary containers.

unpack walks a container (zip, tar, tar.gz or a plain directory), selects
items by wildcard path patterns, deduplicates repeated paths by content and
emits one result per extracted item. read carves a single bounded region
out of a flat file, optionally terminated like an ASCII or UTF-16 string.

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: paths only

Examples:
    carve unpack firmware.zip "*.cfg" --list
    carve unpack bundle.tar.gz "etc/*" -o extracted/
    carve read image.bin --offset 0x1200 --ascii
"#
)]
pub struct Cli {
    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for results printed to stdout.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw (paths only)"
    )]
    pub format: String,

    /// Quiet mode (suppress warnings).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress non-essential stderr output such as duplicate-path\n\
warnings. Machine-readable results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log each emitted path to stderr while extracting. Intended for\n\
debugging; stdout output is unaffected."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human\n\
readability. Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract items from a container by path patterns.
    #[command(
        long_about = "Walk a container and extract every item whose path matches one of\n\
the given patterns. Patterns use wildcard syntax ('*' matches any run of\n\
characters, '?' one character) unless --regex is given. Pattern order\n\
drives emission order; an item matched by several patterns is emitted once\n\
per pattern. Repeated paths with identical content are absorbed silently,\n\
repeated paths with different content are all emitted and reported on\n\
stderr.\n\n\
Examples:\n\
  carve unpack archive.zip\n\
  carve unpack archive.zip \"*.txt\" \"docs/*\" -o out/\n\
  carve unpack rootfs/ \"etc/*.conf\" --list\n\
  carve unpack blob.bin --container tar\n"
    )]
    Unpack {
        /// Container file or directory.
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Wildcard patterns for item paths (default: every item).
        #[arg(
            value_name = "PATTERN",
            num_args = 0..,
            long_help = "Wildcard patterns for the paths of items to extract. Each matching\n\
item is emitted separately. The default is a single asterisk, which\n\
extracts every item."
        )]
        patterns: Vec<String>,

        /// List matching paths instead of extracting payloads.
        #[arg(short, long)]
        list: bool,

        /// Join item paths with the container's own path.
        #[arg(short, long)]
        join: bool,

        /// Interpret patterns as regular expressions instead of wildcards.
        #[arg(short, long)]
        regex: bool,

        /// Container kind (zip/tar/targz/dir); default: detect.
        #[arg(
            long,
            value_name = "KIND",
            long_help = "Force the container kind instead of sniffing magic bytes.\n\n\
Supported values: zip, tar, targz, dir."
        )]
        container: Option<String>,

        /// Write extracted payloads below this directory.
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Checksum algorithm reported per item (xxh3/sha1).
        #[arg(long, default_value = "xxh3", value_name = "ALGO")]
        checksum: String,
    },

    /// Carve a bounded byte region out of a flat file.
    #[command(
        long_about = "Read a region of FILE starting at --offset. The region ends at the\n\
first string terminator when --ascii (single zero byte) or --utf16\n\
(aligned zero pair) is given, after --count bytes, or at the end of the\n\
file; the tightest bound wins. The raw bytes go to stdout unless --output\n\
is given, in which case a result record is printed instead.\n\n\
Examples:\n\
  carve read image.bin --offset 0x1200 --ascii\n\
  carve read dump.bin --offset 4096 --count 16\n\
  carve read dump.bin --offset 0x40 --utf16 --output name.bin\n"
    )]
    Read {
        /// Input file.
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Start offset (hex like 0x1200, or decimal).
        #[arg(long, value_name = "ADDR")]
        offset: String,

        /// Maximum number of bytes to read (0 = unbounded).
        #[arg(long, default_value = "0", value_name = "N")]
        count: usize,

        /// Stop at the first zero byte (ASCII string).
        #[arg(short, long)]
        ascii: bool,

        /// Stop at the first aligned zero pair (UTF-16 string).
        #[arg(short, long)]
        utf16: bool,

        /// Write the region to this file instead of stdout.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    match cli.command {
        Commands::Unpack {
            input,
            patterns,
            list,
            join,
            regex,
            container,
            output_dir,
            checksum,
        } => {
            let algorithm: HashAlgorithm = checksum.parse().unwrap_or_default();
            crate::unpack::run::run_unpack(
                &input,
                &patterns,
                list,
                join,
                regex,
                container.as_deref(),
                output_dir.as_deref(),
                algorithm,
                cli.quiet,
                cli.verbose,
                render_config,
            )
        }

        Commands::Read {
            input,
            offset,
            count,
            ascii,
            utf16,
            output,
        } => crate::memory::run::run_read(
            &input,
            &offset,
            count,
            ascii,
            utf16,
            output.as_deref(),
            cli.verbose,
            render_config,
        ),
    }
}
