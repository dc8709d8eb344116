//! Signed thumbnail URLs for post listings.
//!
//! Listings show one scaled preview per post instead of the full image list.
//! The preview is served by an image proxy that only accepts URLs signed with
//! a shared key: `{proxy}/scale/{hmac(source)}/{hex(source)}?scale=N&signature={hmac(N)}`,
//! where every `hmac` is HMAC-SHA1 rendered as lowercase hex.

use std::fmt;

use hmac::{Hmac, Mac, digest::InvalidLength};
use sha1::Sha1;

/// Width, in pixels, of listing previews.
pub const THUMBNAIL_SCALE: u32 = 300;

type HmacSha1 = Hmac<Sha1>;

#[derive(Clone)]
pub struct ThumbnailSigner {
  mac:            HmacSha1,
  proxy_url:      String,
  image_base_url: String,
}

impl fmt::Debug for ThumbnailSigner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ThumbnailSigner")
      .field("proxy_url", &self.proxy_url)
      .field("image_base_url", &self.image_base_url)
      .finish_non_exhaustive()
  }
}

impl ThumbnailSigner {
  /// `image_base_url` is prefixed to the stored image path to form the source
  /// URL the proxy fetches.
  pub fn new(
    key: &[u8],
    proxy_url: impl Into<String>,
    image_base_url: impl Into<String>,
  ) -> Result<Self, InvalidLength> {
    Ok(Self {
      mac:            HmacSha1::new_from_slice(key)?,
      proxy_url:      proxy_url.into().trim_end_matches('/').to_owned(),
      image_base_url: image_base_url.into(),
    })
  }

  /// Hex-encoded HMAC-SHA1 of `value`.
  pub fn sign(&self, value: &str) -> String {
    let mut mac = self.mac.clone();
    mac.update(value.as_bytes());
    hex::encode(mac.finalize().into_bytes())
  }

  /// Proxy URL for `image` scaled to `scale` pixels.
  pub fn thumbnail(&self, image: &str, scale: u32) -> String {
    let source = format!("{}{image}", self.image_base_url);
    format!(
      "{}/scale/{}/{}?scale={scale}&signature={}",
      self.proxy_url,
      self.sign(&source),
      hex::encode(source.as_bytes()),
      self.sign(&scale.to_string()),
    )
  }

  /// The listing form of an image list: a thumbnail of the first image, or
  /// nothing.
  pub fn preview(&self, images: &[String]) -> Vec<String> {
    images
      .first()
      .map(|first| vec![self.thumbnail(first, THUMBNAIL_SCALE)])
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signer() -> ThumbnailSigner {
    ThumbnailSigner::new(b"camo-secret", "https://camo.example/", "https://img.example/")
      .unwrap()
  }

  #[test]
  fn sign_is_hmac_sha1_hex() {
    let signer = ThumbnailSigner::new(b"Jefe", "https://camo.example", "").unwrap();
    assert_eq!(
      signer.sign("what do ya want for nothing?"),
      "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
    );
  }

  #[test]
  fn empty_key_still_signs() {
    let signer = ThumbnailSigner::new(b"", "https://camo.example", "").unwrap();
    assert_eq!(signer.sign("x"), "6244e66451a1c8695db9731ce2c4fd5de25ccf87");
  }

  #[test]
  fn thumbnail_url_layout() {
    assert_eq!(
      signer().thumbnail("a.png", 300),
      "https://camo.example/scale/52fceb79819e59070a83d2092c6c914e8623cf86/\
       68747470733a2f2f696d672e6578616d706c652f612e706e67\
       ?scale=300&signature=d158ab06d0c2dff1ad73a7b81a15dfcf8cfbcbde"
    );
  }

  #[test]
  fn preview_keeps_only_the_first_image() {
    let signer = signer();
    let images = vec!["a.png".to_owned(), "b.png".to_owned()];

    assert_eq!(signer.preview(&images), vec![signer.thumbnail("a.png", THUMBNAIL_SCALE)]);
    assert!(signer.preview(&[]).is_empty());
  }
}
