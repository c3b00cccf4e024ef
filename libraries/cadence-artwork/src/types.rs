/// Image container detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniff the format; unknown data is treated as JPEG
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Self::Png,
            [b'G', b'I', b'F', b'8', ..] => Self::Gif,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Self::Webp,
            _ => Self::Jpeg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Cover image bytes with their detected format
#[derive(Debug, Clone)]
pub struct ArtworkData {
    /// Raw image bytes
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

impl ArtworkData {
    /// Wrap raw bytes, sniffing the format
    pub fn new(data: Vec<u8>) -> Self {
        let format = ImageFormat::detect(&data);
        Self { data, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_formats() {
        assert_eq!(ImageFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D]), ImageFormat::Png);
        assert_eq!(ImageFormat::detect(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::Webp);
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF]), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::detect(&[]), ImageFormat::Jpeg);
    }

    #[test]
    fn artwork_data_reports_mime() {
        let art = ArtworkData::new(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(art.mime_type(), "image/png");
    }
}
