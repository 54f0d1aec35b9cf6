use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

// clap short flags are a single character.
const LEGACY_SHORT_FLAGS: &[(&str, &str)] = &[
    ("-dr", "--dry-run"),
    ("-ee", "--exclude-ext"),
    ("-en", "--exclude-name"),
    ("-mb", "--max-bytes"),
    ("-tu", "--token-usage"),
];

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ask a question to the Gemini API, optionally including file or folder contents.",
    long_about = "gemctx builds a prompt from your question plus the contents of the given files \nand directories (skipping excluded and binary files, within an optional byte budget), \nthen sends it to the Gemini API or prints it with --dry-run.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  gemctx \"Explain this code\" -f src/main.rs\n  gemctx \"Review\" -d src -ee .png .lock -mb 64KB -dr\n  gemctx \"Summarize\" -d docs -o summary.md -tu"
)]
pub struct Cli {
    #[arg(value_name = "QUESTION", help = "The question to ask the Gemini API.")]
    pub question: String,

    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        num_args = 1..,
        action = ArgAction::Append,
        help = "One or more files to include in the prompt.",
        help_heading = "Inputs"
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        short = 'd',
        long = "dir",
        value_name = "PATH",
        num_args = 1..,
        action = ArgAction::Append,
        help = "One or more directories to include (files are read recursively).",
        help_heading = "Inputs"
    )]
    pub dirs: Vec<PathBuf>,

    #[arg(
        long = "exclude-ext",
        value_name = "EXT",
        num_args = 1..,
        action = ArgAction::Append,
        help = "File extensions to exclude, e.g. .jpg .png .exe [short: -ee].",
        help_heading = "Filtering"
    )]
    pub exclude_ext: Vec<String>,

    #[arg(
        long = "exclude-name",
        value_name = "NAME",
        num_args = 1..,
        action = ArgAction::Append,
        help = "File names to exclude, e.g. config.json secret.txt [short: -en].",
        help_heading = "Filtering"
    )]
    pub exclude_name: Vec<String>,

    #[arg(
        long = "max-bytes",
        value_name = "SIZE",
        value_parser = parse_max_bytes,
        help = "Maximum total bytes to read from all files (integer or e.g. 64KB) [short: -mb].",
        help_heading = "Filtering"
    )]
    pub max_bytes: Option<u64>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "The Gemini model to use [default: gemini-2.0-flash, or the config file value].",
        help_heading = "Request"
    )]
    pub model: Option<String>,

    #[arg(
        long = "dry-run",
        help = "Print the prompt that would be sent and exit [short: -dr].",
        help_heading = "Request"
    )]
    pub dry_run: bool,

    #[arg(
        long = "token-usage",
        help = "Report token usage (local estimate on --dry-run) [short: -tu].",
        help_heading = "Request"
    )]
    pub token_usage: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        help = "File path to save the AI's response to.",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help = "Path of the TOML config file (default: .gemctx/gemctx.toml).",
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        conflicts_with = "config",
        help = "Disable loading any TOML config file.",
        help_heading = "Configuration"
    )]
    pub no_config: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}

fn parse_max_bytes(raw: &str) -> Result<u64, String> {
    gemctx_core::parse_byte_size(raw).map_err(|e| e.to_string())
}

pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_terminator = false;
    args.into_iter()
        .map(|arg| {
            if seen_terminator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                seen_terminator = true;
                return arg;
            }
            for (short, long) in LEGACY_SHORT_FLAGS {
                if text == *short {
                    return OsString::from(*long);
                }
                if let Some(value) = text
                    .strip_prefix(*short)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}
