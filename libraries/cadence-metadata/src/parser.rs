/// Metadata parser implementation using lofty
use crate::error::MetadataError;
use cadence_core::{MetadataParser, ParsedTags};
use lofty::{AudioFile, ItemKey, PictureType, Probe, Tag, TaggedFileExt};
use std::io::Cursor;

/// Metadata parser using the lofty library
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyParser;

impl LoftyParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
        tag.get_string(key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// First four digits of a date-ish field ("1999", "1999-04-01")
    fn year(tag: &Tag) -> Option<i32> {
        let raw = tag
            .get_string(&ItemKey::Year)
            .or_else(|| tag.get_string(&ItemKey::RecordingDate))?;
        let digits: String = raw.trim().chars().take(4).collect();
        if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }

    /// Embedded pictures, front cover first
    fn pictures(tag: &Tag) -> Vec<Vec<u8>> {
        let mut pictures: Vec<_> = tag.pictures().iter().collect();
        pictures.sort_by_key(|p| !matches!(p.pic_type(), PictureType::CoverFront));
        pictures.into_iter().map(|p| p.data().to_vec()).collect()
    }
}

impl MetadataParser for LoftyParser {
    fn parse(&self, bytes: &[u8]) -> cadence_core::Result<ParsedTags> {
        let tagged_file = Probe::new(Cursor::new(bytes))
            .guess_file_type()
            .map_err(|e| MetadataError::UnsupportedFormat(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ParseError(e.to_string()))?;

        let mut parsed = ParsedTags {
            duration_seconds: tagged_file.properties().duration().as_secs_f64(),
            ..ParsedTags::default()
        };

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag());

        if let Some(tag) = tag {
            parsed.title = Self::text(tag, &ItemKey::TrackTitle);
            parsed.artist = Self::text(tag, &ItemKey::TrackArtist)
                .or_else(|| Self::text(tag, &ItemKey::AlbumArtist));
            parsed.album = Self::text(tag, &ItemKey::AlbumTitle);
            parsed.year = Self::year(tag);
            parsed.lyrics = Self::text(tag, &ItemKey::Lyrics);
            parsed.pictures = Self::pictures(tag);
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::CadenceError;

    /// One second of 8 kHz mono 8-bit PCM
    fn tiny_wav() -> Vec<u8> {
        let samples = vec![128u8; 8000];
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // channels
        wav.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
        wav.extend_from_slice(&8000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&1u16.to_le_bytes()); // block align
        wav.extend_from_slice(&8u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(&samples);
        wav
    }

    #[test]
    fn untagged_wav_reports_duration_only() {
        let parsed = LoftyParser::new().parse(&tiny_wav()).unwrap();
        assert!((parsed.duration_seconds - 1.0).abs() < 0.05);
        assert!(parsed.title.is_none());
        assert!(parsed.artist.is_none());
        assert!(parsed.pictures.is_empty());
    }

    #[test]
    fn garbage_is_a_parse_failure() {
        let result = LoftyParser::new().parse(b"definitely not audio");
        assert!(matches!(result, Err(CadenceError::ParseFailure { .. })));
    }
}
