use crate::cli::ConversionRequest;
use crate::encode::save_page;
use crate::format::OutputFormat;
use crate::render::{PdfDocumentPages, PdfRenderer};
use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// `{base}_{index}.{ext}`, keeping the base name's bytes as they are.
pub fn output_file_name(base: &OsStr, index: u32, format: OutputFormat) -> OsString {
    let mut name = base.to_os_string();
    name.push(format!("_{}.{}", index, format.extension()));
    name
}

/// Where page `index` of the request is written: next to the input file.
pub fn output_path(request: &ConversionRequest, index: u32) -> PathBuf {
    let input = request.input();
    let base = input.file_stem().unwrap_or_default();
    let name = output_file_name(base, index, request.format());

    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Render every page of the request's PDF, in page order, and write one image per page.
///
/// Pages are handled one at a time and each page image is dropped before the next
/// render starts; rendering is not parallelised. A failure aborts the remaining
/// pages and leaves files written so far in place. Returns the written paths.
///
/// Reading the input and each render are awaited; with PDFium the render itself
/// runs synchronously inside its future.
pub async fn convert<R: PdfRenderer>(
    request: &ConversionRequest,
    renderer: &R,
    dpi: f32,
) -> Result<Vec<PathBuf>> {
    let input = request.input();
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("cannot read {}", input.display()))?;

    let document = renderer
        .load(bytes)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let page_count = document.page_count();
    log::info!("{}: {} page(s) to {}", input.display(), page_count, request.format());

    let mut written = Vec::with_capacity(page_count as usize);
    for index in 0..page_count {
        let path = output_path(request, index);
        {
            let page = document
                .render_page(index)
                .await
                .with_context(|| format!("cannot render page {} of {}", index, input.display()))?;
            save_page(&page, &path, request.format(), dpi)?;
        }
        log::info!("page {} -> {}", index, path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn file_name_uses_zero_based_index_and_extension() {
        assert_eq!(output_file_name(OsStr::new("report"), 0, OutputFormat::Png), "report_0.png");
        assert_eq!(output_file_name(OsStr::new("slides"), 12, OutputFormat::Jpeg), "slides_12.jpeg");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_base_name_is_kept_byte_for_byte() {
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new(OsStr::from_bytes(b"/d/r\xffport.pdf"));
        let request = ConversionRequest::new(input, OutputFormat::Png);

        let path = output_path(&request, 0);
        assert_eq!(path.as_os_str().as_bytes(), b"/d/r\xffport_0.png");
    }

    #[test]
    fn output_lands_next_to_input() {
        let request = ConversionRequest::new("/data/in/report.final.pdf", OutputFormat::Wmf);
        assert_eq!(output_path(&request, 2), Path::new("/data/in/report.final_2.wmf"));
    }

    #[test]
    fn bare_file_name_stays_relative() {
        let request = ConversionRequest::new("report.PDF", OutputFormat::Bmp);
        assert_eq!(output_path(&request, 0), Path::new("report_0.bmp"));
    }
}
