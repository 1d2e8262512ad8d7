use crate::config::Settings;
use crate::format::OutputFormat;
use clap::Parser;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Positional arguments only: every token, including ones that look like
/// flags, reaches the validation gate as is.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2image",
    about = "Convert every page of a PDF into a separate image file",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// PDF file to convert
    #[arg(allow_hyphen_values = true)]
    input: Option<PathBuf>,
    /// png, bmp, jpg, jpeg, gif, emf or wmf (defaults to the configured format)
    #[arg(allow_hyphen_values = true)]
    format: Option<String>,
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<OsString>,
}

/// A validated request to convert one PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    input: PathBuf,
    format: OutputFormat,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            format,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Outcome of reading the command line.
#[derive(Debug)]
pub enum Resolution {
    /// Arguments were missing or invalid; print usage and stop.
    Usage,
    Convert(ConversionRequest),
}

/// Parse `args` (program name first) and decide what to do.
pub fn resolve<I, T>(args: I, settings: &Settings) -> Resolution
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            log::debug!("unparseable arguments: {}", e.kind());
            return Resolution::Usage;
        }
    };

    let Some(input) = cli.input else {
        return Resolution::Usage;
    };
    if !cli.ignored.is_empty() {
        log::debug!("ignoring extra arguments {:?}", cli.ignored);
    }

    let token = cli.format.as_deref().unwrap_or(&settings.default_format);
    let Some(format) = OutputFormat::from_token(token) else {
        log::debug!("unknown format {token:?}");
        return Resolution::Usage;
    };

    if !input.is_file() {
        log::debug!("{} is not an existing file", input.display());
        return Resolution::Usage;
    }
    if !has_pdf_extension(&input) {
        log::debug!("{} does not end in .pdf", input.display());
        return Resolution::Usage;
    }

    Resolution::Convert(ConversionRequest::new(input, format))
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Write the usage banner, naming the configured default format.
pub fn write_usage(out: &mut impl Write, default_format: &str) -> io::Result<()> {
    writeln!(out, "usage")?;
    writeln!(out, "prompt>pdf2image InputFile FileType(optional)")?;
    writeln!(out, "InputFile must be pdf")?;
    writeln!(
        out,
        "FileType:{}. default is {}",
        OutputFormat::TOKENS.join(" or "),
        default_format
    )
}
