// This file is part of Opcannon.
//
// Opcannon is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Opcannon is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Opcannon.
// If not, see https://www.gnu.org/licenses/.

use alloy_primitives::{address, Address};

/// v0.7 entry point, deployed at the same address on every supported network.
pub const ENTRY_POINT_ADDRESS_V0_7: Address =
    address!("0x0000000071727De22E5E9d8BAf0edAc6f37da032");

/// Simple account factory used to derive and deploy the ephemeral accounts.
pub const SIMPLE_ACCOUNT_FACTORY_ADDRESS: Address =
    address!("0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985");

/// Names of the networks with a hardcoded chain spec.
pub const HARDCODED_CHAIN_SPECS: &[&str] = &["base-sepolia", "sepolia"];

/// Static description of a supported network.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainSpec {
    /// Network name, as accepted by the `--network` flag
    pub name: &'static str,
    /// Chain id, also used to template the bundler URL
    pub id: u64,
    /// v0.7 entry point address
    pub entry_point_address: Address,
    /// Simple account factory address
    pub factory_address: Address,
    /// Default node HTTP URL when none is supplied
    pub node_http: &'static str,
}

impl ChainSpec {
    /// Resolve a hardcoded chain spec by network name.
    pub fn resolve(network: &str) -> Option<Self> {
        match network {
            "base-sepolia" => Some(Self::base_sepolia()),
            "sepolia" => Some(Self::sepolia()),
            _ => None,
        }
    }

    /// Base Sepolia testnet.
    pub fn base_sepolia() -> Self {
        Self {
            name: "base-sepolia",
            id: 84532,
            entry_point_address: ENTRY_POINT_ADDRESS_V0_7,
            factory_address: SIMPLE_ACCOUNT_FACTORY_ADDRESS,
            node_http: "https://84532.rpc.thirdweb.com",
        }
    }

    /// Ethereum Sepolia testnet.
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia",
            id: 11155111,
            entry_point_address: ENTRY_POINT_ADDRESS_V0_7,
            factory_address: SIMPLE_ACCOUNT_FACTORY_ADDRESS,
            node_http: "https://11155111.rpc.thirdweb.com",
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::base_sepolia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_hardcoded() {
        for name in HARDCODED_CHAIN_SPECS {
            let cs = ChainSpec::resolve(name).unwrap();
            assert_eq!(cs.name, *name);
            assert_eq!(cs.entry_point_address, ENTRY_POINT_ADDRESS_V0_7);
        }
        assert!(ChainSpec::resolve("mainnet").is_none());
    }

    #[test]
    fn test_default_is_base_sepolia() {
        assert_eq!(ChainSpec::default().id, 84532);
    }
}
