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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Opcannon providers
//!
//! A provider is a type that gives access to one of the external
//! collaborators: the chain node, the bundler, or the paymaster.

mod alloy;
pub use alloy::{
    new_alloy_bundler_provider, new_alloy_evm_provider, new_alloy_paymaster_provider,
    new_alloy_provider,
};

mod traits;
#[cfg(feature = "test-utils")]
pub use traits::{MockBundlerProvider, MockEvmProvider, MockPaymasterProvider};
pub use traits::{
    BundlerProvider, EvmProvider, PaymasterProvider, ProviderError, ProviderResult,
};

mod types;
pub use types::{
    GasPriceFees, RpcUserOperation, SponsorUserOperationResult, UserOperationGasPrice,
    UserOperationReceipt,
};
