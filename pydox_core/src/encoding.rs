use crate::PydoxError;
use crate::PydoxResult;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Encodings accepted from a PEP 263 declaration when the bytes are not
/// valid utf-8.
const LATIN1_NAMES: [&str; 4] = ["latin-1", "latin1", "iso-8859-1", "iso8859-1"];

/// Turn raw source bytes into text.
///
/// Byte order marks for utf-8, utf-16 and utf-32 are honoured and removed.
/// Without a mark the bytes must be utf-8, unless one of the first two lines
/// declares a latin-1 coding.
pub fn decode(bytes: &[u8]) -> PydoxResult<String> {
	// The utf-32 little endian mark starts with the utf-16 one.
	if let Some(rest) = bytes.strip_prefix(UTF32_LE_BOM) {
		return decode_utf32(rest, u32::from_le_bytes);
	}

	if let Some(rest) = bytes.strip_prefix(UTF32_BE_BOM) {
		return decode_utf32(rest, u32::from_be_bytes);
	}

	if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
		return String::from_utf8(rest.to_vec())
			.map_err(|e| PydoxError::Encoding(format!("invalid utf-8 after byte order mark: {e}")));
	}

	if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
		return decode_utf16(rest, u16::from_le_bytes);
	}

	if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
		return decode_utf16(rest, u16::from_be_bytes);
	}

	match std::str::from_utf8(bytes) {
		Ok(text) => Ok(text.to_string()),
		Err(error) => {
			if declares_latin1(bytes) {
				return Ok(bytes.iter().map(|&byte| char::from(byte)).collect());
			}

			Err(PydoxError::Encoding(format!(
				"invalid utf-8 at byte {}",
				error.valid_up_to()
			)))
		}
	}
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> PydoxResult<String> {
	if bytes.len() % 2 != 0 {
		return Err(PydoxError::Encoding(
			"utf-16 input has an odd number of bytes".to_string(),
		));
	}

	let units = bytes.chunks_exact(2).map(|pair| read([pair[0], pair[1]]));

	char::decode_utf16(units)
		.collect::<Result<String, _>>()
		.map_err(|e| PydoxError::Encoding(format!("invalid utf-16: {e}")))
}

fn decode_utf32(bytes: &[u8], read: fn([u8; 4]) -> u32) -> PydoxResult<String> {
	if bytes.len() % 4 != 0 {
		return Err(PydoxError::Encoding(
			"utf-32 input is not a multiple of four bytes".to_string(),
		));
	}

	bytes
		.chunks_exact(4)
		.map(|quad| {
			let value = read([quad[0], quad[1], quad[2], quad[3]]);
			char::from_u32(value)
				.ok_or_else(|| PydoxError::Encoding(format!("invalid utf-32 code point {value:#x}")))
		})
		.collect()
}

/// Look for `coding: latin-1` (or `coding=latin-1`) in a comment on the first
/// two lines.
fn declares_latin1(bytes: &[u8]) -> bool {
	bytes
		.split(|&byte| byte == b'\n')
		.take(2)
		.filter_map(|line| std::str::from_utf8(line).ok())
		.filter(|line| line.trim_start().starts_with('#'))
		.filter_map(|line| {
			let index = line.find("coding")?;
			let rest = line[index + "coding".len()..].strip_prefix([':', '='])?;
			rest.split_whitespace()
				.next()
				.map(|name| name.to_ascii_lowercase())
		})
		.any(|name| LATIN1_NAMES.contains(&name.as_str()))
}
