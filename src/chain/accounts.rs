//! Deterministic test accounts.

use alloy::primitives::{Address, U256};
use alloy::signers::local::{coins_bip39::English, LocalSignerError, MnemonicBuilder};

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Derive `count` addresses from `phrase` along `m/44'/60'/0'/0/i`.
pub fn derive_accounts(phrase: &str, count: u32) -> Result<Vec<Address>, LocalSignerError> {
    (0..count)
        .map(|index| {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase)
                .index(index)?
                .build()?;
            Ok(signer.address())
        })
        .collect()
}

/// Convert a whole-ether amount to wei.
pub fn ether_to_wei(ether: u64) -> U256 {
    U256::from(ether) * U256::from(WEI_PER_ETHER)
}
