//! Report export: capture, JPEG encoding, A4 pagination and atomic write.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use normate_core::{ErrorKind, PageFormat, PageGeometry, DEFAULT_MARGIN_MM};
use normate_logging::{normate_debug, normate_info, normate_warn};
use thiserror::Error;

use crate::capture::{CaptureError, CaptureSettings, RegionCapture};
use crate::filename::export_filename;
use crate::persist::{AtomicFileWriter, PersistError};

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Pause before capture so pending layout work can land.
    pub settle_delay: Duration,
    pub capture: CaptureSettings,
    pub page_format: PageFormat,
    pub margin_mm: f64,
    pub jpeg_quality: u8,
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(150),
            capture: CaptureSettings::default(),
            page_format: PageFormat::A4_PORTRAIT,
            margin_mm: DEFAULT_MARGIN_MM,
            jpeg_quality: 92,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("document composition failed: {0}")]
    Compose(#[from] lopdf::Error),
    #[error("failed to serialise document: {0}")]
    Serialize(#[from] std::io::Error),
    #[error("captured image is empty or does not fit the page format")]
    EmptyImage,
    #[error("failed to write document: {0}")]
    Persist(#[from] PersistError),
    #[error("export task failed: {0}")]
    Task(String),
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExportFailed {
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub page_count: usize,
}

pub struct DocumentExporter {
    settings: ExportSettings,
}

impl DocumentExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Capture the report region and write it as a paginated PDF.
    ///
    /// Nothing is written unless every step succeeds.
    pub async fn export(
        &self,
        job_id: &str,
        capture: Arc<dyn RegionCapture>,
    ) -> Result<ExportSummary, ExportError> {
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let settings = self.settings.clone();
        let filename = export_filename(job_id);
        let job = job_id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            render_document(capture.as_ref(), &settings).and_then(|(bytes, page_count)| {
                let writer = AtomicFileWriter::new(settings.output_dir.clone());
                let path = writer.write(&filename, &bytes)?;
                Ok(ExportSummary { path, page_count })
            })
        })
        .await
        .map_err(|err| ExportError::Task(err.to_string()))?;

        match &result {
            Ok(summary) => normate_info!(
                "Exported job {} to {} ({} pages)",
                job,
                summary.path.display(),
                summary.page_count
            ),
            Err(err) => normate_warn!("Export of job {} failed: {}", job, err),
        }
        result
    }
}

/// Capture, encode and compose. Returns the PDF bytes and page count.
fn render_document(
    capture: &dyn RegionCapture,
    settings: &ExportSettings,
) -> Result<(Vec<u8>, usize), ExportError> {
    let raster = capture.capture(&settings.capture)?;
    let rgb: RgbImage = DynamicImage::ImageRgba8(raster).to_rgb8();
    let geometry = PageGeometry::fit(
        settings.page_format,
        settings.margin_mm,
        rgb.width(),
        rgb.height(),
    )
    .ok_or(ExportError::EmptyImage)?;

    let jpeg = encode_jpeg(&rgb, settings.jpeg_quality)?;
    normate_debug!(
        "Encoded {}x{} raster as {} byte JPEG",
        rgb.width(),
        rgb.height(),
        jpeg.len()
    );
    build_pdf(&jpeg, rgb.width(), rgb.height(), &geometry)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder.encode_image(image)?;
    Ok(bytes)
}

/// One page per offset, each drawing the same image XObject shifted up and clipped
/// to the content box.
pub fn build_pdf(
    jpeg: &[u8],
    width_px: u32,
    height_px: u32,
    geometry: &PageGeometry,
) -> Result<(Vec<u8>, usize), ExportError> {
    let page_w = geometry.format.width_mm * POINTS_PER_MM;
    let page_h = geometry.format.height_mm * POINTS_PER_MM;
    let margin = geometry.margin_mm * POINTS_PER_MM;
    let image_w = geometry.content_width_mm * POINTS_PER_MM;
    let image_h = geometry.rendered_height_mm * POINTS_PER_MM;
    let clip_h = geometry.usable_height_mm * POINTS_PER_MM;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width_px),
            "Height" => i64::from(height_px),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    });

    let offsets = geometry.page_offsets();
    let mut kids: Vec<Object> = Vec::with_capacity(offsets.len());
    for offset_mm in &offsets {
        // PDF space grows upwards from the bottom edge.
        let top = offset_mm * POINTS_PER_MM;
        let image_y = page_h - top - image_h;
        let content = format!(
            "q {x:.3} {y:.3} {cw:.3} {ch:.3} re W n {iw:.3} 0 0 {ih:.3} {x:.3} {iy:.3} cm /{IMAGE_NAME} Do Q\n",
            x = margin,
            y = margin,
            cw = image_w,
            ch = clip_h,
            iw = image_w,
            ih = image_h,
            iy = image_y,
        )
        .into_bytes();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w as f32), Object::Real(page_h as f32)],
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok((bytes, page_count))
}
