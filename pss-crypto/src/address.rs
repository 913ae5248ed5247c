//! Address derivation.

use pss_core::constants::{ETH_ADDRESS_SIZE, OVERLAY_NONCE_SIZE};
use pss_core::types::{ChunkAddress, EthAddress};

use crate::hash::{keccak256, keccak256_multi};
use crate::keys::PublicKey;

/// Derives the Ethereum address of a public key.
///
/// `keccak256(x || y)[12..32]`, where `x || y` is the uncompressed point
/// without its `0x04` tag.
pub fn ethereum_address(public_key: &PublicKey) -> EthAddress {
    let uncompressed = public_key.to_uncompressed();
    let hash = keccak256(&uncompressed[1..]);

    let mut bytes = [0u8; ETH_ADDRESS_SIZE];
    bytes.copy_from_slice(&hash[hash.len() - ETH_ADDRESS_SIZE..]);
    EthAddress::from_array(bytes)
}

/// Derives a node's overlay address on a given network.
///
/// `keccak256(eth_address || u64_le(network_id) || nonce)`. The same key gets
/// unrelated overlay addresses on different networks or with different nonces.
pub fn overlay_address(
    public_key: &PublicKey,
    network_id: u64,
    nonce: &[u8; OVERLAY_NONCE_SIZE],
) -> ChunkAddress {
    let eth = ethereum_address(public_key);
    ChunkAddress::from_array(keccak256_multi(&[
        eth.as_bytes(),
        &network_id.to_le_bytes(),
        nonce,
    ]))
}
