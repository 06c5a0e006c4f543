//! Status sequence decoding for verifiers

use std::io::Read;

use base64ct::{Base64UrlUnpadded, Encoding};
use flate2::read::GzDecoder;

use crate::{Error, Result};

/// Decode an encoded status sequence into one byte per slot.
///
/// # Errors
///
/// Returns an error if the value is not base64url or gzip data.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let compressed = Base64UrlUnpadded::decode_vec(encoded.trim_end_matches('='))
        .map_err(|e| Error::Encoding(e.to_string()))?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut sequence = Vec::new();
    decoder.read_to_end(&mut sequence).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(sequence)
}

/// Check whether the slot at `index` is marked revoked.
///
/// # Errors
///
/// Returns an error if decoding fails or the index is outside the list.
pub fn is_revoked(encoded: &str, index: usize) -> Result<bool> {
    let sequence = decode(encoded)?;
    let length = sequence.len();
    sequence.get(index).map(|slot| *slot == 1).ok_or(Error::IndexOutOfRange { index, length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    #[test]
    fn revoked_slot() {
        let encoded = encode([1], 3).expect("should encode");

        assert!(!is_revoked(&encoded, 0).expect("should check"));
        assert!(is_revoked(&encoded, 1).expect("should check"));
        assert!(!is_revoked(&encoded, 2).expect("should check"));
    }

    #[test]
    fn outside_list() {
        let encoded = encode(std::iter::empty(), 3).expect("should encode");
        assert!(is_revoked(&encoded, 3).is_err());
    }

    #[test]
    fn garbage() {
        assert!(matches!(decode("not!base64"), Err(Error::Encoding(_))));
        assert!(matches!(decode("AAAA"), Err(Error::Encoding(_))));
    }
}
