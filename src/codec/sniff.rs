use crate::foundation::core::ImageFormat;

/// Result of matching leading bytes against known container signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sniffed {
    /// A container the codec can decode.
    Supported(ImageFormat),
    /// A recognized container the codec refuses, by name.
    Unsupported(&'static str),
    /// No signature matched.
    Unknown,
}

struct Sniffer {
    name: &'static str,
    format: Option<ImageFormat>,
    matches: fn(&[u8]) -> bool,
}

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

// Checked in order; the first match wins.
const SNIFFERS: &[Sniffer] = &[
    Sniffer {
        name: "png",
        format: Some(ImageFormat::Png),
        matches: |b| b.starts_with(PNG_MAGIC),
    },
    Sniffer {
        name: "jpeg",
        format: Some(ImageFormat::Jpeg),
        matches: |b| b.starts_with(JPEG_MAGIC),
    },
    Sniffer {
        name: "gif",
        format: None,
        matches: |b| b.starts_with(b"GIF87a") || b.starts_with(b"GIF89a"),
    },
    Sniffer {
        name: "webp",
        format: None,
        matches: |b| b.len() >= 12 && b.starts_with(b"RIFF") && &b[8..12] == b"WEBP",
    },
    Sniffer {
        name: "bmp",
        format: None,
        matches: |b| b.starts_with(b"BM"),
    },
    Sniffer {
        name: "tiff",
        format: None,
        matches: |b| b.starts_with(b"II*\0") || b.starts_with(b"MM\0*"),
    },
];

/// Identify the container format from content, never from a file name.
pub fn sniff(bytes: &[u8]) -> Sniffed {
    for s in SNIFFERS {
        if (s.matches)(bytes) {
            return match s.format {
                Some(f) => Sniffed::Supported(f),
                None => Sniffed::Unsupported(s.name),
            };
        }
    }
    Sniffed::Unknown
}

/// Like [`sniff`], collapsed to the decodable formats only.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    match sniff(bytes) {
        Sniffed::Supported(f) => Some(f),
        Sniffed::Unsupported(_) | Sniffed::Unknown => None,
    }
}
