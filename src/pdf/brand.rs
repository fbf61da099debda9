//! Brand marks: remote logo images with a text fallback

use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, warn};

use crate::config::PacketConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::layout::{Rect, Rgb};
use crate::pdf::document::{ImageMark, LogoVariant, PacketDocument};
use crate::pdf::draw::{Align, Canvas, Font};

/// Fetch and embed the logo for `variant`, once per packet
///
/// Never fails: a missing URL, a failed fetch or an undecodable image all yield
/// `None`, and callers draw the company name instead.
pub async fn load_logo(
    packet: &mut PacketDocument,
    fetcher: &dyn Fetcher,
    config: &PacketConfig,
    variant: LogoVariant,
) -> Option<ImageMark> {
    if let Some(cached) = packet.cached_logo(variant) {
        return cached;
    }

    let url = match variant {
        LogoVariant::Light => config.logo_light_url.as_deref(),
        LogoVariant::Dark => config.logo_dark_url.as_deref(),
    };

    let logo = match url {
        None => None,
        Some(url) => match fetcher.fetch(url).await {
            Ok(bytes) => match embed_image(packet.document_mut(), &bytes) {
                Ok(mark) => {
                    debug!("Embedded {:?} logo ({}x{})", variant, mark.width, mark.height);
                    Some(mark)
                }
                Err(e) => {
                    warn!("Logo at {} could not be decoded: {}", url, e);
                    None
                }
            },
            Err(e) => {
                warn!("Logo unavailable, using text mark: {}", e);
                None
            }
        },
    };

    packet.cache_logo(variant, logo);
    logo
}

/// Embed PNG/JPEG bytes as an RGB image XObject, with an alpha soft mask when the
/// image has transparency
pub fn embed_image(doc: &mut Document, bytes: &[u8]) -> Result<ImageMark> {
    let decoded = image::load_from_memory(bytes).map_err(|e| Error::Image(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Image("image has no pixels".to_string()));
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut dict = image_dict(width, height, "DeviceRGB");
    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask_id = doc.add_object(Stream::new(image_dict(width, height, "DeviceGray"), alpha));
        dict.set("SMask", Object::Reference(mask_id));
    }

    let id = doc.add_object(Stream::new(dict, rgb));
    Ok(ImageMark { id, width, height })
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

/// Draw the logo inside `bounds`, or the company name when there is no logo
pub fn draw_brand_mark(canvas: &mut Canvas, logo: Option<ImageMark>, bounds: Rect, company: &str, color: Rgb) {
    match logo {
        Some(mark) => canvas.image(mark.id, bounds.fit_left(mark.aspect())),
        None => {
            let size = (bounds.height * 0.45).min(22.0);
            let baseline = bounds.y + (bounds.height - size) / 2.0 + size * 0.2;
            canvas.text(bounds.x, baseline, Font::Bold, size, color, Align::Left, &company.to_uppercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResult};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        body: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().ok_or_else(|| FetchError::Status { url: url.to_string(), status: 404 })
        }
    }

    fn png_bytes(transparent: bool) -> Vec<u8> {
        let mut img = image::RgbaImage::new(4, 2);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([10, 20, 30, if transparent { 0 } else { 255 }]);
        }
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_embed_opaque_png() {
        let mut doc = Document::with_version("1.5");
        let mark = embed_image(&mut doc, &png_bytes(false)).unwrap();
        assert_eq!((mark.width, mark.height), (4, 2));
        assert_eq!(mark.aspect(), 2.0);

        let stream = doc.get_object(mark.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content.len(), 4 * 2 * 3);
        assert!(!stream.dict.has(b"SMask"));
    }

    #[test]
    fn test_embed_transparent_png_gets_soft_mask() {
        let mut doc = Document::with_version("1.5");
        let mark = embed_image(&mut doc, &png_bytes(true)).unwrap();
        let stream = doc.get_object(mark.id).unwrap().as_stream().unwrap();
        assert!(stream.dict.has(b"SMask"));
    }

    #[test]
    fn test_embed_garbage_fails() {
        let mut doc = Document::with_version("1.5");
        assert!(matches!(embed_image(&mut doc, b"not an image"), Err(Error::Image(_))));
    }

    #[tokio::test]
    async fn test_logo_fetched_once_per_packet() {
        let fetcher = CountingFetcher { body: Some(png_bytes(false)), calls: AtomicUsize::new(0) };
        let config = PacketConfig::default();
        let mut packet = PacketDocument::new();

        let first = load_logo(&mut packet, &fetcher, &config, LogoVariant::Dark).await;
        let second = load_logo(&mut packet, &fetcher, &config, LogoVariant::Dark).await;

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logo_failure_is_cached_as_none() {
        let fetcher = CountingFetcher { body: None, calls: AtomicUsize::new(0) };
        let config = PacketConfig::default();
        let mut packet = PacketDocument::new();

        assert_eq!(load_logo(&mut packet, &fetcher, &config, LogoVariant::Light).await, None);
        assert_eq!(load_logo(&mut packet, &fetcher, &config, LogoVariant::Light).await, None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logo_without_url_skips_fetch() {
        let fetcher = CountingFetcher { body: Some(png_bytes(false)), calls: AtomicUsize::new(0) };
        let config = PacketConfig { logo_dark_url: None, ..PacketConfig::default() };
        let mut packet = PacketDocument::new();

        assert_eq!(load_logo(&mut packet, &fetcher, &config, LogoVariant::Dark).await, None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_text_fallback_uses_company_name() {
        let mut canvas = Canvas::new();
        draw_brand_mark(&mut canvas, None, Rect::new(40.0, 700.0, 200.0, 50.0), "Acme", Rgb(0.0, 0.0, 0.0));
        let (content, images) = canvas.finish();
        assert!(images.is_empty());
        assert!(String::from_utf8(content).unwrap().contains("(ACME) Tj"));
    }
}
