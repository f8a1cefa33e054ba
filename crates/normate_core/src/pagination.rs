//! Page geometry for slicing one tall image across fixed-size pages.
//!
//! All lengths are millimetres measured from the top edge of the page.

/// Heights within this distance of a page boundary do not start a new page.
const HEIGHT_EPSILON_MM: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageFormat {
    /// ISO A4, portrait.
    pub const A4_PORTRAIT: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

pub const DEFAULT_MARGIN_MM: f64 = 10.0;

/// Placement of an image scaled to the content width of a page format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub format: PageFormat,
    pub margin_mm: f64,
    pub content_width_mm: f64,
    pub usable_height_mm: f64,
    /// Height of the whole image once scaled to `content_width_mm`.
    pub rendered_height_mm: f64,
}

impl PageGeometry {
    /// Fit an image of `width_px` × `height_px` to the content box. Returns `None`
    /// for an empty image or margins that leave no content box.
    pub fn fit(format: PageFormat, margin_mm: f64, width_px: u32, height_px: u32) -> Option<Self> {
        let content_width_mm = format.width_mm - 2.0 * margin_mm;
        let usable_height_mm = format.height_mm - 2.0 * margin_mm;
        if width_px == 0 || height_px == 0 || content_width_mm <= 0.0 || usable_height_mm <= 0.0 {
            return None;
        }
        let rendered_height_mm = f64::from(height_px) * content_width_mm / f64::from(width_px);
        Some(Self {
            format,
            margin_mm,
            content_width_mm,
            usable_height_mm,
            rendered_height_mm,
        })
    }

    pub fn page_offsets(&self) -> Vec<f64> {
        compute_page_offsets(
            self.rendered_height_mm,
            self.format.height_mm,
            self.margin_mm,
        )
    }
}

/// Vertical offset of the image on each page, one entry per page.
///
/// Page 1 places the image at the top margin; every following page shifts it up by
/// one usable page height (`page_height - 2 * margin`) until the image is used up.
/// There is always at least one page.
pub fn compute_page_offsets(total_height: f64, page_height: f64, margin: f64) -> Vec<f64> {
    let usable = page_height - 2.0 * margin;
    if usable <= 0.0 || !total_height.is_finite() || total_height <= usable + HEIGHT_EPSILON_MM {
        return vec![margin];
    }

    let mut offsets = vec![margin];
    let mut remaining = total_height - usable;
    while remaining > HEIGHT_EPSILON_MM {
        let index = offsets.len() as f64;
        offsets.push(margin - index * usable);
        remaining -= usable;
    }
    offsets
}
