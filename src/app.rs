use crate::cli::{self, Resolution};
use crate::config::Settings;
use crate::convert::convert;
use crate::render::PdfiumRenderer;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io;

/// Run the program for `args` (program name first).
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let settings = Settings::load();

    let request = match cli::resolve(args, &settings) {
        Resolution::Convert(request) => request,
        Resolution::Usage => {
            cli::write_usage(&mut io::stdout().lock(), &settings.default_format)?;
            return Ok(());
        }
    };

    let renderer = PdfiumRenderer::bind(settings.pdfium_library_dir.as_deref(), settings.dpi)?;

    // Single-threaded on purpose: pages are rendered and written strictly one after another.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start runtime")?;
    let written = runtime.block_on(convert(&request, &renderer, settings.dpi))?;

    log::info!("wrote {} file(s)", written.len());
    Ok(())
}
