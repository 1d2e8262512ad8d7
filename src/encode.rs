use crate::format::OutputFormat;
use crate::metafile;
use crate::render::PageImage;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;

/// Encode `page` as `format` at `path`, replacing any file already there.
pub fn save_page(page: &PageImage, path: &Path, format: OutputFormat, dpi: f32) -> Result<()> {
    match format {
        OutputFormat::Png => save_raster(DynamicImage::ImageRgba8(page.as_rgba().clone()), path, ImageFormat::Png),
        OutputFormat::Gif => save_raster(DynamicImage::ImageRgba8(page.as_rgba().clone()), path, ImageFormat::Gif),
        // JPEG and BMP carry no alpha channel here
        OutputFormat::Jpeg => save_raster(rgb(page), path, ImageFormat::Jpeg),
        OutputFormat::Bmp => save_raster(rgb(page), path, ImageFormat::Bmp),
        OutputFormat::Emf | OutputFormat::Wmf => save_metafile(page, path, format, dpi),
    }
}

fn rgb(page: &PageImage) -> DynamicImage {
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(page.as_rgba().clone()).to_rgb8())
}

fn save_raster(image: DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    image
        .save_with_format(path, format)
        .with_context(|| format!("cannot write {}", path.display()))
}

fn save_metafile(page: &PageImage, path: &Path, format: OutputFormat, dpi: f32) -> Result<()> {
    let image = DynamicImage::ImageRgba8(page.as_rgba().clone()).to_rgb8();

    // Encode fully before touching the destination, so a rejected page leaves it intact.
    let mut buf = Vec::new();
    let encoded = if format == OutputFormat::Wmf {
        metafile::write_wmf(&image, dpi, &mut buf)
    } else {
        metafile::write_emf(&image, dpi, &mut buf)
    };
    encoded.with_context(|| format!("cannot encode {}", path.display()))?;

    fs::write(path, buf).with_context(|| format!("cannot write {}", path.display()))
}
