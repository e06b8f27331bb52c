/*!
  Byte sequences become code points here. The encoding in effect is an
  explicit parameter carried by the machine that owns the keys, never a
  process-wide setting.
*/

use super::*;
use error::MachineError;


/// How byte-string transition keys are decoded into code points.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Encoding {
  /// Standard 1-4 byte UTF-8 with strict continuation-byte validation.
  Utf8,
  /// A single-byte encoding in which the byte value is the code point.
  Narrow,
}

impl Default for Encoding {
  fn default() -> Self {
    Encoding::Utf8
  }
}


/**
  Decodes exactly one character from `bytes`. Trailing bytes beyond the first
  character are an error, as is an empty or truncated input. In the narrow
  encoding any multi-byte input fails.
*/
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<CodePoint, MachineError> {
  let (code_point, consumed) = decode_prefix(bytes, encoding)?;

  if consumed != bytes.len() {
    return Err(MachineError::InvalidEncoding(
      format!("{} bytes for a single character", bytes.len())
    ));
  }

  Ok(code_point)
}


/// Decodes a whole byte string into its code-point sequence.
pub fn decode_all(bytes: &[u8], encoding: Encoding) -> Result<Vec<CodePoint>, MachineError> {
  let mut code_points: Vec<CodePoint> = Vec::new();
  let mut start = 0;

  while start < bytes.len() {
    let (code_point, consumed) = decode_prefix(&bytes[start..], encoding)?;
    code_points.push(code_point);
    start += consumed;
  }

  Ok(code_points)
}


/// Decodes the first character of `bytes`, reporting how many bytes it spanned.
fn decode_prefix(bytes: &[u8], encoding: Encoding) -> Result<(CodePoint, usize), MachineError> {
  if bytes.is_empty() {
    return Err(MachineError::InvalidEncoding("empty input".to_string()));
  }

  if encoding == Encoding::Narrow {
    return Ok((bytes[0] as CodePoint, 1));
  }

  let lead = bytes[0];

  // Sequence length and the value bits of the lead byte.
  let (length, mut code_point): (usize, CodePoint) = match lead {
    0x00..=0x7F => (1, lead as CodePoint),
    0xC0..=0xDF => (2, (lead & 0x1F) as CodePoint),
    0xE0..=0xEF => (3, (lead & 0x0F) as CodePoint),
    0xF0..=0xF7 => (4, (lead & 0x07) as CodePoint),
    _           => {
      return Err(MachineError::InvalidEncoding(format!("lead byte 0x{:02X}", lead)));
    }
  };

  if bytes.len() < length {
    return Err(MachineError::InvalidEncoding(
      format!("truncated {}-byte sequence", length)
    ));
  }

  for &byte in &bytes[1..length] {
    if byte & 0xC0 != 0x80 {
      return Err(MachineError::InvalidEncoding(format!("continuation byte 0x{:02X}", byte)));
    }
    code_point = (code_point << 6) | (byte & 0x3F) as CodePoint;
  }

  // The shortest-form requirement: a value this small must have used fewer bytes.
  static MIN_FOR_LENGTH: [CodePoint; 5] = [0, 0, 0x80, 0x800, 0x10000];
  if length > 1 && code_point < MIN_FOR_LENGTH[length] {
    return Err(MachineError::InvalidEncoding(format!("overlong encoding of U+{:04X}", code_point)));
  }

  if (0xD800..=0xDFFF).contains(&code_point) || code_point > limits::MAX_CODE_POINT {
    return Err(MachineError::InvalidEncoding(format!("code point U+{:04X}", code_point)));
  }

  Ok((code_point, length))
}


#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn ascii() {
    assert_eq!(decode(b"A", Encoding::Utf8).unwrap(), 0x41);
    assert_eq!(decode(b"A", Encoding::Narrow).unwrap(), 0x41);
  }

  #[test]
  fn multibyte_utf8() {
    assert_eq!(decode("é".as_bytes(), Encoding::Utf8).unwrap(), 0xE9);
    assert_eq!(decode("€".as_bytes(), Encoding::Utf8).unwrap(), 0x20AC);
    assert_eq!(decode("𝄞".as_bytes(), Encoding::Utf8).unwrap(), 0x1D11E);
  }

  #[test]
  fn narrow_is_single_byte() {
    assert_eq!(decode(&[0xE9], Encoding::Narrow).unwrap(), 0xE9);
    assert!(decode("é".as_bytes(), Encoding::Narrow).is_err());
  }

  #[test]
  fn bad_continuation() {
    // 0xC3 expects a 10xxxxxx continuation.
    assert!(decode(&[0xC3, 0x41], Encoding::Utf8).is_err());
    assert!(decode(&[0xC3], Encoding::Utf8).is_err());
  }

  #[test]
  fn overlong_and_surrogates() {
    // Overlong encoding of '/' and an encoded surrogate half.
    assert!(decode(&[0xC0, 0xAF], Encoding::Utf8).is_err());
    assert!(decode(&[0xED, 0xA0, 0x80], Encoding::Utf8).is_err());
  }

  #[test]
  fn trailing_bytes_rejected() {
    assert!(decode(b"ab", Encoding::Utf8).is_err());
  }

  #[test]
  fn decode_whole_strings() {
    let decoded = decode_all("a€b".as_bytes(), Encoding::Utf8).unwrap();
    assert_eq!(decoded, vec![0x61, 0x20AC, 0x62]);

    let decoded = decode_all(&[0x61, 0xE9, 0x62], Encoding::Narrow).unwrap();
    assert_eq!(decoded, vec![0x61, 0xE9, 0x62]);
  }
}
