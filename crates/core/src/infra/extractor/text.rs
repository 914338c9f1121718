use super::ExtractFailure;

/// Candidate encodings for plain text, tried in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub const FALLBACK_ORDER: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Utf16,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    /// Returns `None` when the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => decode_utf8(bytes),
            TextEncoding::Utf16 => decode_utf16(bytes),
            TextEncoding::Latin1 => decode_latin1(bytes),
            TextEncoding::Windows1252 => decode_windows1252(bytes),
        }
    }
}

/// First encoding in fallback order that decodes `bytes`, with the decoded text.
pub fn decode(bytes: &[u8]) -> Option<(TextEncoding, String)> {
    TextEncoding::FALLBACK_ORDER
        .iter()
        .find_map(|enc| enc.decode(bytes).map(|text| (*enc, text)))
}

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractFailure> {
    if bytes.is_empty() {
        return Err(ExtractFailure::Empty);
    }

    let (encoding, decoded) = decode(bytes).ok_or(ExtractFailure::Undecodable)?;
    if encoding != TextEncoding::Utf8 {
        log::debug!("Decoded text file as {encoding:?}");
    }

    let text = decoded.trim();
    if text.is_empty() {
        return Err(ExtractFailure::NoText);
    }

    Ok(text.to_string())
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

// Only BOM-marked input counts as UTF-16. Without a BOM almost any even-length
// 8-bit text "decodes" as UTF-16 and would never reach the Latin-1 fallback.
fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        (rest, false)
    } else {
        return None;
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

// Bytes 0x80..=0x9F are C1 controls in Latin-1; real-world text with those
// bytes is Windows-1252, so Latin-1 declines and lets the next candidate try.
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| b as char).collect())
}

fn decode_windows1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize],
            _ => Some(b as char),
        })
        .collect()
}

/// 0x80..=0x9F; `None` marks the five undefined code points
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let (enc, text) = decode("Grüße aus Köln".as_bytes()).unwrap();
        assert_eq!(enc, TextEncoding::Utf8);
        assert_eq!(text, "Grüße aus Köln");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"hello");
        assert_eq!(extract(&bytes).unwrap(), "hello");
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hi Jörg".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (enc, text) = decode(&bytes).unwrap();
        assert_eq!(enc, TextEncoding::Utf16);
        assert_eq!(text, "Hi Jörg");
    }

    #[test]
    fn test_utf16_be_with_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Hello".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(extract(&bytes).unwrap(), "Hello");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in Latin-1: 0xE9 is invalid UTF-8 on its own
        let bytes = [b'c', b'a', b'f', 0xE9];
        let (enc, text) = decode(&bytes).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "café");
    }

    #[test]
    fn test_windows1252_fallback() {
        // curly quotes 0x93 / 0x94 around "ok"
        let bytes = [0x93, b'o', b'k', 0x94, b' ', 0x80];
        let (enc, text) = decode(&bytes).unwrap();
        assert_eq!(enc, TextEncoding::Windows1252);
        assert_eq!(text, "\u{201C}ok\u{201D} \u{20AC}");
    }

    #[test]
    fn test_undecodable() {
        // 0x81 is undefined in Windows-1252 and a C1 control in Latin-1
        assert_eq!(extract(&[b'a', 0x81]), Err(ExtractFailure::Undecodable));
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(extract(&[]), Err(ExtractFailure::Empty));
        assert_eq!(extract(b"   \n "), Err(ExtractFailure::NoText));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(extract(b"\n\n  Dear Ana,\nThanks.  \n").unwrap(), "Dear Ana,\nThanks.");
    }
}
