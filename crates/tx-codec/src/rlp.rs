//! Recursive length-prefix items.
//!
//! A single byte `<= 0x7f` encodes as itself, longer byte strings carry a
//! length prefix, and lists carry the encoded length of their concatenated
//! payload. Decoding accepts only the canonical form: minimal length
//! prefixes, minimal scalars, and no trailing input.

use {
    alloy::primitives::U256,
    thiserror::Error,
};

/// Codec-level failures. All of them mean the input is not a valid canonical
/// encoding; none are retryable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("input ends before the announced item length")]
    Truncated,
    #[error("declared length does not match the consumed bytes")]
    LengthMismatch,
    #[error("non-canonical length or scalar encoding")]
    NonCanonical,
    #[error("expected a byte string, found a list")]
    ExpectedBytes,
    #[error("expected a list, found a byte string")]
    ExpectedList,
    #[error("expected {expected} fields, found {found}")]
    WrongFieldCount { expected: usize, found: usize },
    #[error("scalar does not fit the target width")]
    ScalarOverflow,
    #[error("address field must be empty or 20 bytes")]
    InvalidAddress,
    #[error("fixed-width field has the wrong length")]
    BadFieldWidth,
}

/// A decoded item: either a byte string or a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    pub fn bytes(data: impl AsRef<[u8]>) -> Self {
        Item::Bytes(data.as_ref().to_vec())
    }

    /// Minimal big-endian scalar. Zero encodes as the empty byte string.
    pub fn uint(value: U256) -> Self {
        Item::Bytes(value.to_be_bytes_trimmed_vec())
    }

    pub fn uint64(value: u64) -> Self {
        Self::uint(U256::from(value))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Item::Bytes(data) => {
                if data.len() == 1 && data[0] <= 0x7f {
                    out.push(data[0]);
                } else {
                    encode_length(out, data.len(), 0x80);
                    out.extend_from_slice(data);
                }
            }
            Item::List(items) => {
                let mut payload = Vec::new();
                for item in items {
                    item.encode_into(&mut payload);
                }
                encode_length(out, payload.len(), 0xc0);
                out.extend_from_slice(&payload);
            }
        }
    }

    /// Decodes exactly one item; trailing input is an error.
    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let (item, rest) = decode_item(input)?;
        if !rest.is_empty() {
            return Err(CodecError::LengthMismatch);
        }
        Ok(item)
    }

    pub fn as_bytes(&self) -> Result<&[u8], CodecError> {
        match self {
            Item::Bytes(data) => Ok(data),
            Item::List(_) => Err(CodecError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[Item], CodecError> {
        match self {
            Item::Bytes(_) => Err(CodecError::ExpectedList),
            Item::List(items) => Ok(items),
        }
    }

    pub fn into_list(self) -> Result<Vec<Item>, CodecError> {
        match self {
            Item::Bytes(_) => Err(CodecError::ExpectedList),
            Item::List(items) => Ok(items),
        }
    }

    /// Interprets the item as a minimal big-endian scalar.
    pub fn to_u256(&self) -> Result<U256, CodecError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(CodecError::NonCanonical);
        }
        U256::try_from_be_slice(bytes).ok_or(CodecError::ScalarOverflow)
    }

    pub fn to_u64(&self) -> Result<u64, CodecError> {
        let value = self.to_u256()?;
        u64::try_from(value).map_err(|_| CodecError::ScalarOverflow)
    }

    /// Interprets the item as an exactly `N`-byte string.
    pub fn to_fixed<const N: usize>(&self) -> Result<[u8; N], CodecError> {
        let bytes = self.as_bytes()?;
        bytes.try_into().map_err(|_| CodecError::BadFieldWidth)
    }
}

fn encode_length(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len <= 55 {
        out.push(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let skip = len_bytes.iter().take_while(|&&b| b == 0).count();
        let len_bytes = &len_bytes[skip..];
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

fn decode_item(input: &[u8]) -> Result<(Item, &[u8]), CodecError> {
    let (&prefix, rest) = input.split_first().ok_or(CodecError::Truncated)?;
    match prefix {
        0x00..=0x7f => Ok((Item::Bytes(vec![prefix]), rest)),
        0x80..=0xb7 => {
            let (data, rest) = split_checked(rest, usize::from(prefix - 0x80))?;
            if data.len() == 1 && data[0] <= 0x7f {
                return Err(CodecError::NonCanonical);
            }
            Ok((Item::Bytes(data.to_vec()), rest))
        }
        0xb8..=0xbf => {
            let (len, rest) = decode_long_length(rest, usize::from(prefix - 0xb7))?;
            let (data, rest) = split_checked(rest, len)?;
            Ok((Item::Bytes(data.to_vec()), rest))
        }
        0xc0..=0xf7 => {
            let (payload, rest) = split_checked(rest, usize::from(prefix - 0xc0))?;
            Ok((Item::List(decode_list_payload(payload)?), rest))
        }
        0xf8..=0xff => {
            let (len, rest) = decode_long_length(rest, usize::from(prefix - 0xf7))?;
            let (payload, rest) = split_checked(rest, len)?;
            Ok((Item::List(decode_list_payload(payload)?), rest))
        }
    }
}

fn decode_list_payload(mut payload: &[u8]) -> Result<Vec<Item>, CodecError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, rest) = decode_item(payload)?;
        items.push(item);
        payload = rest;
    }
    Ok(items)
}

/// Long-form lengths must be minimal and must actually need the long form.
fn decode_long_length(input: &[u8], len_of_len: usize) -> Result<(usize, &[u8]), CodecError> {
    let (len_bytes, rest) = split_checked(input, len_of_len)?;
    if len_bytes.first() == Some(&0) {
        return Err(CodecError::NonCanonical);
    }
    let mut len = 0usize;
    for &byte in len_bytes {
        len = len
            .checked_mul(256)
            .and_then(|l| l.checked_add(usize::from(byte)))
            .ok_or(CodecError::ScalarOverflow)?;
    }
    if len <= 55 {
        return Err(CodecError::NonCanonical);
    }
    Ok((len, rest))
}

fn split_checked(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), CodecError> {
    if input.len() < len {
        return Err(CodecError::Truncated);
    }
    Ok(input.split_at(len))
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    fn roundtrip(item: &Item) -> Vec<u8> {
        let encoded = item.encode();
        assert_eq!(&Item::decode(&encoded).unwrap(), item);
        encoded
    }

    #[test]
    fn encodes_byte_strings() {
        assert_eq!(roundtrip(&Item::bytes(b"")), hex!("80"));
        assert_eq!(roundtrip(&Item::bytes(b"\x0f")), hex!("0f"));
        assert_eq!(roundtrip(&Item::bytes(b"dog")), hex!("83646f67"));
        assert_eq!(
            roundtrip(&Item::bytes([0x04, 0x00])),
            hex!("820400").to_vec(),
        );

        let long = vec![0xaa; 56];
        let encoded = roundtrip(&Item::bytes(&long));
        assert_eq!(encoded[..2], hex!("b838"));
        assert_eq!(encoded[2..], long);
    }

    #[test]
    fn encodes_lists() {
        assert_eq!(roundtrip(&Item::List(vec![])), hex!("c0"));
        assert_eq!(
            roundtrip(&Item::List(vec![
                Item::bytes(b"cat"),
                Item::bytes(b"dog"),
            ])),
            hex!("c88363617483646f67").to_vec(),
        );
        // [ [], [[]], [ [], [[]] ] ]
        let nested = Item::List(vec![
            Item::List(vec![]),
            Item::List(vec![Item::List(vec![])]),
            Item::List(vec![Item::List(vec![]), Item::List(vec![Item::List(vec![])])]),
        ]);
        assert_eq!(roundtrip(&nested), hex!("c7c0c1c0c3c0c1c0"));
    }

    #[test]
    fn scalar_zero_is_empty_string() {
        assert_eq!(Item::uint64(0).encode(), hex!("80"));
        assert_eq!(Item::uint64(15).encode(), hex!("0f"));
        assert_eq!(Item::uint64(1024).encode(), hex!("820400"));
        assert_eq!(Item::decode(&hex!("80")).unwrap().to_u64().unwrap(), 0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let item = Item::List(vec![Item::uint64(7), Item::bytes(b"payload")]);
        assert_eq!(item.encode(), item.encode());
    }

    #[test]
    fn rejects_single_byte_in_long_form() {
        // "a" must encode as 0x61, not 0x81 0x61.
        assert_eq!(Item::decode(&hex!("8161")), Err(CodecError::NonCanonical));
    }

    #[test]
    fn rejects_truncated_input() {
        assert_eq!(Item::decode(&hex!("83646f")), Err(CodecError::Truncated));
        assert_eq!(Item::decode(&hex!("b8")), Err(CodecError::Truncated));
        assert_eq!(Item::decode(&hex!("c8836361")), Err(CodecError::Truncated));
        assert_eq!(Item::decode(&[]), Err(CodecError::Truncated));
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(
            Item::decode(&hex!("83646f6700")),
            Err(CodecError::LengthMismatch),
        );
    }

    #[test]
    fn rejects_non_minimal_long_lengths() {
        // 3-byte payload announced through the long form.
        assert_eq!(
            Item::decode(&hex!("b803646f67")),
            Err(CodecError::NonCanonical),
        );
        // Length bytes with a leading zero.
        let mut input = hex!("b90038").to_vec();
        input.extend_from_slice(&[0xaa; 56]);
        assert_eq!(Item::decode(&input), Err(CodecError::NonCanonical));
    }

    #[test]
    fn rejects_padded_scalars() {
        let item = Item::Bytes(vec![0x00, 0x01]);
        assert_eq!(item.to_u64(), Err(CodecError::NonCanonical));
    }

    #[test]
    fn scalar_width_is_enforced() {
        let item = Item::Bytes(vec![0xff; 9]);
        assert_eq!(item.to_u64(), Err(CodecError::ScalarOverflow));
        assert!(item.to_u256().is_ok());
        let item = Item::Bytes(vec![0xff; 33]);
        assert_eq!(item.to_u256(), Err(CodecError::ScalarOverflow));
    }
}
