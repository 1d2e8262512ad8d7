use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::Path;

/// PDF user space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// One rendered page, owned until it has been written out.
#[derive(Debug, Clone)]
pub struct PageImage {
    pixels: RgbaImage,
}

impl PageImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Something that can open a PDF held in memory.
pub trait PdfRenderer {
    type Document<'a>: PdfDocumentPages
    where
        Self: 'a;

    fn load(&self, bytes: Vec<u8>) -> Result<Self::Document<'_>>;
}

/// An open document whose pages can be rendered one at a time.
#[allow(async_fn_in_trait)]
pub trait PdfDocumentPages {
    fn page_count(&self) -> u32;

    /// Render page `index`. Implementations may suspend while the page is produced.
    async fn render_page(&self, index: u32) -> Result<PageImage>;
}

/// Renderer backed by the PDFium shared library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
    scale: f32,
}

impl PdfiumRenderer {
    /// Bind PDFium from `library_dir`, then next to the executable, then the system library.
    pub fn bind(library_dir: Option<&Path>, dpi: f32) -> Result<Self> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .with_context(|| format!("cannot load PDFium from {}", dir.display()))?,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .context("PDFium library not found; place it next to the executable or set pdfium_library_dir")?,
        };

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            scale: dpi / POINTS_PER_INCH,
        })
    }
}

impl PdfRenderer for PdfiumRenderer {
    type Document<'a> = PdfiumDocument<'a>;

    fn load(&self, bytes: Vec<u8>) -> Result<PdfiumDocument<'_>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .context("cannot parse PDF")?;
        Ok(PdfiumDocument {
            document,
            scale: self.scale,
        })
    }
}

pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    scale: f32,
}

impl PdfDocumentPages for PdfiumDocument<'_> {
    fn page_count(&self) -> u32 {
        u32::from(self.document.pages().len())
    }

    /// PDFium renders synchronously inside the future; it completes on first poll.
    async fn render_page(&self, index: u32) -> Result<PageImage> {
        let page_index = u16::try_from(index)?;
        let page = self.document.pages().get(page_index)?;

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.scale)
            .set_clear_color(PdfColor::WHITE);

        let bitmap = page.render_with_config(&render_config)?;
        let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
        let pixels = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| anyhow!("page {index}: bitmap size does not match {width}x{height}"))?;

        Ok(PageImage::new(pixels))
    }
}
