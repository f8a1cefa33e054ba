//! Raster capture of the report region.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use normate_logging::normate_debug;
use thiserror::Error;

/// Extra spacing applied while capturing, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOverrides {
    pub padding_px: u32,
    pub section_gap_px: u32,
}

impl Default for LayoutOverrides {
    fn default() -> Self {
        Self {
            padding_px: 24,
            section_gap_px: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Oversampling factor applied to every logical dimension.
    pub scale: f32,
    pub background: [u8; 3],
    /// Capture width in logical pixels, independent of any viewport.
    pub logical_width: u32,
    pub layout: LayoutOverrides,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: [255, 255, 255],
            logical_width: 1200,
            layout: LayoutOverrides::default(),
        }
    }
}

impl CaptureSettings {
    fn scaled(&self, logical: u32) -> u32 {
        (logical as f32 * self.scale).round().max(0.0) as u32
    }

    /// Full raster width in device pixels.
    pub fn raster_width(&self) -> u32 {
        self.scaled(self.logical_width)
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("nothing to capture")]
    EmptyRegion,
    #[error("capture area too small for the layout padding")]
    TooNarrow,
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("captured region exceeds the maximum raster size")]
    TooLarge,
}

/// Produces the raster of the rendered report region.
pub trait RegionCapture: Send + Sync {
    fn capture(&self, settings: &CaptureSettings) -> Result<RgbaImage, CaptureError>;
}

enum Snapshot {
    File(PathBuf),
    Image(DynamicImage),
}

/// Capture built from already rendered bitmaps of the report sections, stacked top
/// to bottom in the order given.
pub struct SnapshotCapture {
    snapshots: Vec<Snapshot>,
}

impl SnapshotCapture {
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self {
            snapshots: paths
                .iter()
                .map(|p| Snapshot::File(p.as_ref().to_path_buf()))
                .collect(),
        }
    }

    pub fn from_images(images: Vec<DynamicImage>) -> Self {
        Self {
            snapshots: images.into_iter().map(Snapshot::Image).collect(),
        }
    }

    fn load(&self) -> Result<Vec<DynamicImage>, CaptureError> {
        self.snapshots
            .iter()
            .map(|snapshot| match snapshot {
                Snapshot::File(path) => image::open(path).map_err(|source| CaptureError::Read {
                    path: path.clone(),
                    source,
                }),
                Snapshot::Image(image) => Ok(image.clone()),
            })
            .collect()
    }
}

impl RegionCapture for SnapshotCapture {
    fn capture(&self, settings: &CaptureSettings) -> Result<RgbaImage, CaptureError> {
        let images = self.load()?;
        if images.iter().all(|i| i.width() == 0 || i.height() == 0) {
            return Err(CaptureError::EmptyRegion);
        }

        let width = settings.raster_width();
        let padding = settings.scaled(settings.layout.padding_px);
        let gap = settings.scaled(settings.layout.section_gap_px);
        let inner_width = padding
            .checked_mul(2)
            .and_then(|edges| width.checked_sub(edges))
            .filter(|w| *w > 0)
            .ok_or(CaptureError::TooNarrow)?;

        let resized: Vec<RgbaImage> = images
            .iter()
            .filter(|i| i.width() > 0 && i.height() > 0)
            .map(|i| {
                let height = (u64::from(i.height()) * u64::from(inner_width)
                    / u64::from(i.width()))
                .max(1) as u32;
                imageops::resize(&i.to_rgba8(), inner_width, height, FilterType::Triangle)
            })
            .collect();

        let gaps = u32::try_from(resized.len().saturating_sub(1))
            .ok()
            .and_then(|n| n.checked_mul(gap));
        let height = resized
            .iter()
            .try_fold(0u32, |total, i| total.checked_add(i.height()))
            .zip(gaps)
            .and_then(|(content, gaps)| content.checked_add(gaps))
            .and_then(|content| content.checked_add(padding * 2))
            .ok_or(CaptureError::TooLarge)?;

        let [r, g, b] = settings.background;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
        let mut y = padding;
        for region in &resized {
            imageops::overlay(&mut canvas, region, i64::from(padding), i64::from(y));
            y += region.height() + gap;
        }

        normate_debug!(
            "Captured {} region(s) into {}x{} raster",
            resized.len(),
            width,
            height
        );
        Ok(canvas)
    }
}
