//! Signed and unsigned transaction records.
//!
//! A signed transaction is its unsigned payload plus `(v, r, s)`. The unsigned
//! projection re-encodes byte-identically whether it was decoded out of a
//! signed transaction or constructed directly; the unlock flow signs and later
//! re-hashes exactly these bytes.

use {
    crate::rlp::{CodecError, Item},
    alloy::primitives::{Address, B256, Bytes, U256, keccak256},
};

/// The six-field unsigned form. `to = None` denotes contract creation and
/// encodes as the empty byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl UnsignedTransaction {
    fn fields(&self) -> Vec<Item> {
        vec![
            Item::uint64(self.nonce),
            Item::uint(self.gas_price),
            Item::uint64(self.gas_limit),
            match self.to {
                Some(address) => Item::bytes(address),
                None => Item::bytes([]),
            },
            Item::uint(self.value),
            Item::bytes(&self.data),
        ]
    }

    fn from_fields(fields: &[Item]) -> Result<Self, CodecError> {
        Ok(Self {
            nonce: fields[0].to_u64()?,
            gas_price: fields[1].to_u256()?,
            gas_limit: fields[2].to_u64()?,
            to: decode_to(&fields[3])?,
            value: fields[4].to_u256()?,
            data: Bytes::copy_from_slice(fields[5].as_bytes()?),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        Item::List(self.fields()).encode()
    }

    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let fields = Item::decode(input)?.into_list()?;
        if fields.len() != 6 {
            return Err(CodecError::WrongFieldCount {
                expected: 6,
                found: fields.len(),
            });
        }
        Self::from_fields(&fields)
    }

    /// The hash a signature over this transaction commits to.
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

/// The nine-field signed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub payload: UnsignedTransaction,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl SignedTransaction {
    pub fn encode(&self) -> Vec<u8> {
        let mut fields = self.payload.fields();
        fields.push(Item::uint64(self.v));
        fields.push(Item::uint(self.r));
        fields.push(Item::uint(self.s));
        Item::List(fields).encode()
    }

    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let fields = Item::decode(input)?.into_list()?;
        if fields.len() != 9 {
            return Err(CodecError::WrongFieldCount {
                expected: 9,
                found: fields.len(),
            });
        }
        Ok(Self {
            payload: UnsignedTransaction::from_fields(&fields[..6])?,
            v: fields[6].to_u64()?,
            r: fields[7].to_u256()?,
            s: fields[8].to_u256()?,
        })
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

fn decode_to(item: &Item) -> Result<Option<Address>, CodecError> {
    let bytes = item.as_bytes()?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(bytes))),
        _ => Err(CodecError::InvalidAddress),
    }
}
