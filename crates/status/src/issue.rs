//! Status sequence encoding for issuers

use std::io::Write;

use base64ct::{Base64UrlUnpadded, Encoding};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::{Error, Result};

/// Build the encoded status sequence for a list of `length` slots with the
/// slots at `revoked` set.
///
/// Each slot occupies one byte: `1` when revoked, `0` otherwise. The raw
/// sequence is gzip compressed and base64url-encoded without padding.
///
/// # Errors
///
/// Returns an error when any index falls outside the list or compression
/// fails.
pub fn encode(revoked: impl IntoIterator<Item = usize>, length: usize) -> Result<String> {
    let mut sequence = vec![0u8; length];
    for index in revoked {
        let Some(slot) = sequence.get_mut(index) else {
            return Err(Error::IndexOutOfRange { index, length });
        };
        *slot = 1;
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&sequence).map_err(|e| Error::Encoding(e.to_string()))?;
    let compressed = encoder.finish().map_err(|e| Error::Encoding(e.to_string()))?;

    tracing::debug!("encoded status sequence of {length} slots");
    Ok(Base64UrlUnpadded::encode_string(&compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    #[test]
    fn no_revocations() {
        let encoded = encode(std::iter::empty(), 16).expect("should encode");
        assert!(!encoded.contains('='));
        assert_eq!(decode(&encoded).expect("should decode"), vec![0u8; 16]);
    }

    #[test]
    fn some_revoked() {
        let encoded = encode([1, 5], 8).expect("should encode");
        assert_eq!(decode(&encoded).expect("should decode"), vec![0, 1, 0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn all_revoked() {
        let encoded = encode(0..4, 4).expect("should encode");
        assert_eq!(decode(&encoded).expect("should decode"), vec![1, 1, 1, 1]);
    }

    #[test]
    fn default_length() {
        let encoded = encode([9_999], crate::DEFAULT_LENGTH).expect("should encode");
        let sequence = decode(&encoded).expect("should decode");
        assert_eq!(sequence.len(), 10_000);
        assert_eq!(sequence[9_999], 1);
        assert_eq!(sequence.iter().filter(|b| **b == 1).count(), 1);
    }

    #[test]
    fn index_out_of_range() {
        let Err(err) = encode([10], 10) else {
            panic!("should fail");
        };
        assert_eq!(err, Error::IndexOutOfRange { index: 10, length: 10 });
    }
}
