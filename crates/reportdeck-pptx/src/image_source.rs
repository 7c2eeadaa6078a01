//! Turning image references into picture bytes.
//!
//! A reference is either a `data:<mime>;base64,<payload>` URI, a bare
//! base64 payload (taken to be JPEG), or, with the `remote-images` feature,
//! an http/https URL whose path ends in a whitelisted picture extension.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ReportError, Result};

/// Picture formats that can be embedded in a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Format for a MIME type; parameters such as `; charset=` are ignored
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Picture bytes with their format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }
}

/// Resolves image references for maps and list thumbnails
pub trait ImageSource: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<ImageData>;
}

/// Decodes data URIs and bare base64 JPEG payloads; never touches the network
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriImageSource;

impl ImageSource for DataUriImageSource {
    fn resolve(&self, reference: &str) -> Result<ImageData> {
        let reference = reference.trim();
        if is_remote(reference) {
            return Err(ReportError::image_fetch(
                reference,
                "remote images are not enabled",
            ));
        }

        let (format, payload) = match reference.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    ReportError::image_fetch(reference, "data URI has no payload")
                })?;
                let mut params = header.split(';');
                let mime = params.next().unwrap_or("");
                if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
                    return Err(ReportError::image_fetch(
                        reference,
                        "only base64 data URIs are supported",
                    ));
                }
                let format = ImageFormat::from_content_type(mime).ok_or_else(|| {
                    ReportError::image_fetch(
                        reference,
                        format!("unsupported picture type '{}'", mime),
                    )
                })?;
                (format, payload)
            }
            None => (ImageFormat::Jpeg, reference),
        };

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ReportError::image_fetch(reference, e.to_string()))?;
        if bytes.is_empty() {
            return Err(ReportError::image_fetch(reference, "empty picture"));
        }
        Ok(ImageData::new(format, bytes))
    }
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Path extensions fetched when no explicit list is configured
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

#[cfg(feature = "remote-images")]
pub use remote::WebAndDataUriImageSource;

#[cfg(feature = "remote-images")]
mod remote {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Url;
    use tracing::debug;

    use super::{is_remote, DataUriImageSource, ImageData, ImageFormat, ImageSource};
    use crate::error::{ReportError, Result};

    /// Fetches whitelisted http/https pictures, decoding everything else
    /// like [`DataUriImageSource`]
    #[derive(Debug, Clone)]
    pub struct WebAndDataUriImageSource {
        client: Client,
        allowed_extensions: Vec<String>,
    }

    impl WebAndDataUriImageSource {
        /// Create a source allowing the given path extensions (`.png` etc.)
        pub fn new(allowed_extensions: Vec<String>) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| ReportError::image_fetch("http client", e.to_string()))?;
            Ok(Self {
                client,
                allowed_extensions: allowed_extensions
                    .into_iter()
                    .map(|e| e.to_ascii_lowercase())
                    .collect(),
            })
        }

        /// Whether the URL's path ends in an allowed extension
        pub fn is_allowed(&self, url: &Url) -> bool {
            let path = url.path().to_ascii_lowercase();
            self.allowed_extensions.iter().any(|ext| path.ends_with(ext))
        }

        fn fetch(&self, reference: &str) -> Result<ImageData> {
            let url = Url::parse(reference)
                .map_err(|e| ReportError::image_fetch(reference, e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ReportError::image_fetch(reference, "unsupported scheme"));
            }
            if !self.is_allowed(&url) {
                return Err(ReportError::image_fetch(
                    reference,
                    "path does not end in an allowed picture extension",
                ));
            }

            debug!(url = %url, "fetching picture");
            let response = self
                .client
                .get(url)
                .send()
                .map_err(|e| ReportError::image_fetch(reference, e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ReportError::image_fetch(
                    reference,
                    format!("server returned {}", status.as_u16()),
                ));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let format = ImageFormat::from_content_type(&content_type).ok_or_else(|| {
                ReportError::image_fetch(
                    reference,
                    format!("unsupported content type '{}'", content_type),
                )
            })?;
            let bytes = response
                .bytes()
                .map_err(|e| ReportError::image_fetch(reference, e.to_string()))?;
            Ok(ImageData::new(format, bytes.to_vec()))
        }
    }

    impl ImageSource for WebAndDataUriImageSource {
        fn resolve(&self, reference: &str) -> Result<ImageData> {
            let reference = reference.trim();
            if is_remote(reference) {
                self.fetch(reference)
            } else {
                DataUriImageSource.resolve(reference)
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::image_source::DEFAULT_ALLOWED_EXTENSIONS;

        fn source() -> WebAndDataUriImageSource {
            WebAndDataUriImageSource::new(
                DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            )
            .unwrap()
        }

        #[test]
        fn test_whitelist() {
            let source = source();
            let allowed = |s: &str| source.is_allowed(&Url::parse(s).unwrap());
            assert!(allowed("https://maps.example.com/tiles/europe.PNG"));
            assert!(allowed("http://example.com/a.jpeg?size=large"));
            assert!(!allowed("http://example.com/a.svg"));
            assert!(!allowed("http://example.com/a.png/evil.exe"));
        }

        #[test]
        fn test_rejected_before_fetch() {
            let err = source().resolve("http://example.com/a.svg").unwrap_err();
            assert_eq!(err.code(), "RPT003");
        }

        #[test]
        fn test_data_uri_delegated() {
            let data = source().resolve("data:image/gif;base64,R0lGODlh").unwrap();
            assert_eq!(data.format, ImageFormat::Gif);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let data = DataUriImageSource
            .resolve("data:image/png;base64,iVBORw0KGgo=")
            .unwrap();
        assert_eq!(data.format, ImageFormat::Png);
        assert_eq!(&data.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_bare_payload_is_jpeg() {
        let data = DataUriImageSource.resolve("/9j/4AAQ\nSkZJRg==").unwrap();
        assert_eq!(data.format, ImageFormat::Jpeg);
        assert_eq!(&data.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_rejections() {
        for reference in [
            "data:image/svg+xml;base64,PHN2Zz4=",
            "data:image/png,plain",
            "data:image/png;base64",
            "not base64 at all!",
            "https://example.com/map.png",
            "",
        ] {
            let err = DataUriImageSource.resolve(reference).unwrap_err();
            assert_eq!(err.code(), "RPT003", "{}", reference);
        }
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            ImageFormat::from_content_type("image/JPEG; charset=binary"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_content_type("text/html"), None);
        assert_eq!(ImageFormat::Gif.extension(), "gif");
    }
}
