//! Adapters between the decoder and a host's preview, thumbnail and
//! metadata services.
//!
//! The host supplies the surfaces through the traits in this module. Every
//! adapter either hands over a complete image or nothing at all: on error the
//! host shows no preview for the file.

use std::sync::atomic::{AtomicBool, Ordering};

use ddslook_dds::{
    decode_with, probe, DecodeOptions, DecodedSurface, Error, Result, SurfaceDecoder,
};
use tracing::debug;

/// Badge attached to thumbnails large enough to show it.
pub const THUMBNAIL_BADGE: &str = "DDS";

/// Thumbnails at most this tall get no badge.
pub const BADGE_MIN_HEIGHT: f64 = 16.0;

/// Host signal telling whether a request is still wanted.
pub trait RequestStatus {
    fn is_cancelled(&self) -> bool;
}

/// A request that is never cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl RequestStatus for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl RequestStatus for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: RequestStatus + ?Sized> RequestStatus for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Full-size preview display.
pub trait PreviewSurface {
    fn present(&mut self, image: DecodedSurface, title: &str);
}

/// Thumbnail display.
pub trait ThumbnailSurface {
    fn set_image(&mut self, image: DecodedSurface, badge: Option<&'static str>);
}

/// A searchable file attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Codecs(Vec<String>),
    PixelWidth(u32),
    PixelHeight(u32),
}

/// Sink for file attributes.
pub trait MetadataIndex {
    fn add(&mut self, attribute: Attribute);
}

impl MetadataIndex for Vec<Attribute> {
    fn add(&mut self, attribute: Attribute) {
        self.push(attribute);
    }
}

fn check<S: RequestStatus>(status: &S) -> Result<()> {
    if status.is_cancelled() {
        return Err(Error::Canceled);
    }
    Ok(())
}

/// Decode `bytes` at full size and present it under the title
/// `"<name> (<W>x<H> <codec>)"`.
///
/// Returns [`Error::Canceled`] when `status` reports cancellation before or
/// after decoding; the surface is left untouched in that case.
pub fn generate_preview<P, S>(name: &str, bytes: &[u8], surface: &mut P, status: &S) -> Result<()>
where
    P: PreviewSurface + ?Sized,
    S: RequestStatus,
{
    check(status)?;

    let options = DecodeOptions::default();
    let decoder = SurfaceDecoder::new(bytes, &options)?;
    check(status)?;
    let image = decoder.decode_with_cancel(options.cancel_interval_rows, || status.is_cancelled())?;

    check(status)?;

    let title = format!(
        "{name} ({}x{} {})",
        image.width,
        image.height,
        decoder.codec_name()
    );
    debug!(%title, "presenting preview");
    surface.present(image, &title);
    Ok(())
}

/// Decode the mip closest to `max_width` x `max_height` and hand it to the
/// thumbnail surface.
///
/// The [`THUMBNAIL_BADGE`] is attached only when `max_height` exceeds
/// [`BADGE_MIN_HEIGHT`].
pub fn generate_thumbnail<T, S>(
    bytes: &[u8],
    max_width: f64,
    max_height: f64,
    surface: &mut T,
    status: &S,
) -> Result<()>
where
    T: ThumbnailSurface + ?Sized,
    S: RequestStatus,
{
    check(status)?;

    let options = DecodeOptions::new().with_preferred_size(dimension(max_width), dimension(max_height));
    let image = decode_with(bytes, &options, || status.is_cancelled())?;

    check(status)?;

    let badge = (max_height > BADGE_MIN_HEIGHT).then_some(THUMBNAIL_BADGE);
    debug!(
        width = image.width,
        height = image.height,
        level = image.level,
        badge = badge.is_some(),
        "setting thumbnail"
    );
    surface.set_image(image, badge);
    Ok(())
}

/// Host sizes are fractional points; the decoder wants whole pixels.
fn dimension(size: f64) -> u32 {
    if size.is_nan() || size <= 0.0 {
        0
    } else {
        size.ceil().min(u32::MAX as f64) as u32
    }
}

/// Record codec and pixel dimensions for `bytes` without decoding pixels.
///
/// Unnamed pixel formats contribute dimensions only.
pub fn import_metadata<M>(bytes: &[u8], index: &mut M) -> Result<()>
where
    M: MetadataIndex + ?Sized,
{
    let info = probe(bytes)?;

    if info.codec_name != "???" {
        index.add(Attribute::Codecs(vec![info.codec_name]));
    }
    index.add(Attribute::PixelHeight(info.height));
    index.add(Attribute::PixelWidth(info.width));
    Ok(())
}
