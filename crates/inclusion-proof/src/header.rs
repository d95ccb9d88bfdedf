//! Block header codec.
//!
//! The fifteen header fields in their canonical order. The header hash is the
//! hash of the encoded field list; a verifier recomputes it from the fields
//! shipped inside a proof blob instead of trusting the submitter.

use {
    alloy::primitives::{Address, B64, B256, Bloom, Bytes, U256, keccak256},
    tx_codec::{CodecError, Item},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: B256,
    pub ommers_hash: B256,
    pub beneficiary: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub mix_hash: B256,
    pub nonce: B64,
}

impl BlockHeader {
    pub(crate) fn to_item(&self) -> Item {
        Item::List(vec![
            Item::bytes(self.parent_hash),
            Item::bytes(self.ommers_hash),
            Item::bytes(self.beneficiary),
            Item::bytes(self.state_root),
            Item::bytes(self.transactions_root),
            Item::bytes(self.receipts_root),
            Item::bytes(self.logs_bloom),
            Item::uint(self.difficulty),
            Item::uint64(self.number),
            Item::uint64(self.gas_limit),
            Item::uint64(self.gas_used),
            Item::uint64(self.timestamp),
            Item::bytes(&self.extra_data),
            Item::bytes(self.mix_hash),
            Item::bytes(self.nonce),
        ])
    }

    pub(crate) fn from_item(item: &Item) -> Result<Self, CodecError> {
        let fields = item.as_list()?;
        if fields.len() != 15 {
            return Err(CodecError::WrongFieldCount {
                expected: 15,
                found: fields.len(),
            });
        }
        Ok(Self {
            parent_hash: B256::from(fields[0].to_fixed::<32>()?),
            ommers_hash: B256::from(fields[1].to_fixed::<32>()?),
            beneficiary: Address::from(fields[2].to_fixed::<20>()?),
            state_root: B256::from(fields[3].to_fixed::<32>()?),
            transactions_root: B256::from(fields[4].to_fixed::<32>()?),
            receipts_root: B256::from(fields[5].to_fixed::<32>()?),
            logs_bloom: Bloom::from(fields[6].to_fixed::<256>()?),
            difficulty: fields[7].to_u256()?,
            number: fields[8].to_u64()?,
            gas_limit: fields[9].to_u64()?,
            gas_used: fields[10].to_u64()?,
            timestamp: fields[11].to_u64()?,
            extra_data: Bytes::copy_from_slice(fields[12].as_bytes()?),
            mix_hash: B256::from(fields[13].to_fixed::<32>()?),
            nonce: B64::from(fields[14].to_fixed::<8>()?),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_item().encode()
    }

    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        Self::from_item(&Item::decode(input)?)
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }
}
