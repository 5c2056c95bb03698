use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decoded photo bytes, before any transcoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Bytes produced by the base64 decoder.
    pub bytes: Vec<u8>,
    /// Subtype declared by a `data:image/<fmt>;base64,` prefix, lowercased.
    /// `None` when the client sent bare base64.
    pub declared_format: Option<String>,
}

impl RawImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A JPEG re-encoding of the inbound photo that fits inside the configured bounds.
///
/// Only [`normalize`](crate::normalize) constructs these, so holding one means
/// the dimension bound and the fixed output format have already been enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    quality: u8,
}

impl NormalizedImage {
    pub(crate) fn new(bytes: Vec<u8>, width: u32, height: u32, quality: u8) -> Self {
        Self {
            bytes,
            width,
            height,
            quality,
        }
    }

    /// Encoded JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// JPEG quality factor the bytes were encoded with.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard-alphabet base64 of the JPEG bytes, as remote JSON APIs expect.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
