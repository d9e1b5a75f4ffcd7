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

//! Simple smart account setup.
//!
//! Each account is backed by a freshly generated private key and lives at
//! the counterfactual address reported by the account factory. The factory
//! calldata to deploy it rides along in the first user operation.

use alloy_primitives::{aliases::U192, bytes, Address, Bytes, B256, U128, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use opcannon_provider::{
    BundlerProvider, EvmProvider, PaymasterProvider, RpcUserOperation,
};
use opcannon_types::{
    contracts::{IEntryPoint, ISimpleAccount, ISimpleAccountFactory},
    ChainSpec, UserOperation, UserOperationBuilder, UserOperationRequiredFields,
};
use tracing::debug;

use crate::Result;

/// An ephemeral simple smart account: a random owner key plus the
/// counterfactual account address derived from it.
pub struct SimpleAccount {
    signer: PrivateKeySigner,
    address: Address,
}

impl SimpleAccount {
    /// Generate a fresh owner key and resolve the counterfactual account
    /// address through the factory.
    pub async fn generate<E: EvmProvider>(factory: Address, evm: &E) -> Result<Self> {
        let signer = PrivateKeySigner::random();
        let call = ISimpleAccountFactory::getAddressCall {
            owner: signer.address(),
            salt: U256::ZERO,
        };
        let out = evm
            .call(&call_request(factory, call.abi_encode()), None)
            .await?;
        let address = ISimpleAccountFactory::getAddressCall::abi_decode_returns(&out, false)?
            .account;
        Ok(Self { signer, address })
    }

    /// The counterfactual account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The owner EOA address.
    pub fn owner(&self) -> Address {
        self.signer.address()
    }

    /// Factory calldata deploying this account.
    pub fn factory_data(&self) -> Bytes {
        ISimpleAccountFactory::createAccountCall {
            owner: self.signer.address(),
            salt: U256::ZERO,
        }
        .abi_encode()
        .into()
    }

    /// Read this account's entry point nonce on key zero.
    pub async fn nonce<E: EvmProvider>(&self, entry_point: Address, evm: &E) -> Result<U256> {
        let call = IEntryPoint::getNonceCall {
            sender: self.address,
            key: U192::ZERO,
        };
        let out = evm
            .call(&call_request(entry_point, call.abi_encode()), None)
            .await?;
        Ok(IEntryPoint::getNonceCall::abi_decode_returns(&out, false)?.nonce)
    }

    /// Calldata for the account's `execute` function.
    pub fn execute_call_data(dest: Address, value: U256, func: Bytes) -> Bytes {
        ISimpleAccount::executeCall { dest, value, func }
            .abi_encode()
            .into()
    }

    /// Sign a user operation hash with the owner key (EIP-191 message
    /// signature, as the simple account's validation expects).
    pub async fn sign_user_operation_hash(&self, hash: B256) -> Result<Bytes> {
        let signature = self.signer.sign_message(hash.as_slice()).await?;
        Ok(Bytes::from(signature.as_bytes()))
    }
}

/// Placeholder ECDSA signature with maximal fee impact, sent in sponsorship
/// requests so gas estimation reflects a real signature.
pub fn dummy_signature() -> Bytes {
    bytes!("fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe1c")
}

/// Build one fully sponsored and signed user operation performing the demo
/// call: `execute(address(0), 0, "")` from a brand new account.
pub async fn build_signed_user_operation<E, B, P>(
    chain_spec: &ChainSpec,
    evm: &E,
    bundler: &B,
    paymaster: &P,
) -> Result<UserOperation>
where
    E: EvmProvider,
    B: BundlerProvider,
    P: PaymasterProvider,
{
    let account = SimpleAccount::generate(chain_spec.factory_address, evm).await?;
    let nonce = account.nonce(chain_spec.entry_point_address, evm).await?;
    let call_data = SimpleAccount::execute_call_data(Address::ZERO, U256::ZERO, Bytes::new());
    let fees = bundler.get_user_operation_gas_price().await?.fast;

    let sponsor_request = RpcUserOperation {
        sender: account.address(),
        nonce,
        factory: Some(chain_spec.factory_address),
        factory_data: Some(account.factory_data()),
        call_data: call_data.clone(),
        call_gas_limit: U128::ZERO,
        verification_gas_limit: U128::ZERO,
        pre_verification_gas: U256::ZERO,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        max_fee_per_gas: fees.max_fee_per_gas,
        paymaster: None,
        paymaster_verification_gas_limit: None,
        paymaster_post_op_gas_limit: None,
        paymaster_data: None,
        signature: dummy_signature(),
    };
    let sponsorship = paymaster
        .sponsor_user_operation(&sponsor_request, chain_spec.entry_point_address)
        .await?;

    let op = UserOperationBuilder::new(
        chain_spec.entry_point_address,
        chain_spec.id,
        UserOperationRequiredFields {
            sender: account.address(),
            nonce,
            call_data,
            call_gas_limit: sponsorship.call_gas_limit.to::<u128>(),
            verification_gas_limit: sponsorship.verification_gas_limit.to::<u128>(),
            pre_verification_gas: sponsorship.pre_verification_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas.to::<u128>(),
            max_fee_per_gas: fees.max_fee_per_gas.to::<u128>(),
        },
    )
    .factory(chain_spec.factory_address, account.factory_data())
    .paymaster(
        sponsorship.paymaster,
        sponsorship.paymaster_verification_gas_limit.to::<u128>(),
        sponsorship.paymaster_post_op_gas_limit.to::<u128>(),
        sponsorship.paymaster_data,
    )
    .build();

    let signature = account.sign_user_operation_hash(op.hash()).await?;
    debug!(sender = %account.address(), hash = %op.hash(), "built user operation");
    Ok(op.with_signature(signature))
}

fn call_request(to: Address, input: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(to.into()),
        input: TransactionInput::new(input.into()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Signature};
    use alloy_sol_types::SolValue;
    use opcannon_provider::{
        GasPriceFees, MockBundlerProvider, MockEvmProvider, MockPaymasterProvider,
        SponsorUserOperationResult, UserOperationGasPrice,
    };

    use super::*;

    const ACCOUNT_ADDRESS: Address = address!("0x0909090909090909090909090909090909090909");

    fn mock_evm() -> MockEvmProvider {
        let mut evm = MockEvmProvider::new();
        evm.expect_call().returning(|tx, _| {
            let input = tx.input.input().expect("call should have input");
            if input.starts_with(&ISimpleAccountFactory::getAddressCall::SELECTOR) {
                Ok(ACCOUNT_ADDRESS.abi_encode().into())
            } else {
                Ok(U256::ZERO.abi_encode().into())
            }
        });
        evm
    }

    fn gas_price() -> UserOperationGasPrice {
        let fees = |max: u64, prio: u64| GasPriceFees {
            max_fee_per_gas: U128::from(max),
            max_priority_fee_per_gas: U128::from(prio),
        };
        UserOperationGasPrice {
            slow: fees(100, 50),
            standard: fees(200, 100),
            fast: fees(400, 200),
        }
    }

    fn sponsorship() -> SponsorUserOperationResult {
        SponsorUserOperationResult {
            paymaster: address!("0x0303030303030303030303030303030303030303"),
            paymaster_data: bytes!("a1b2"),
            paymaster_verification_gas_limit: U128::from(60_000),
            paymaster_post_op_gas_limit: U128::from(70_000),
            pre_verification_gas: U256::from(50_000),
            verification_gas_limit: U128::from(200_000),
            call_gas_limit: U128::from(100_000),
        }
    }

    #[tokio::test]
    async fn test_generate_resolves_counterfactual_address() {
        let factory = address!("0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985");
        let mut evm = MockEvmProvider::new();
        evm.expect_call()
            .withf(move |tx, _| tx.to == Some(factory.into()))
            .returning(|_, _| Ok(ACCOUNT_ADDRESS.abi_encode().into()));

        let account = SimpleAccount::generate(factory, &evm).await.unwrap();
        assert_eq!(account.address(), ACCOUNT_ADDRESS);
        assert_ne!(account.owner(), ACCOUNT_ADDRESS);
    }

    #[tokio::test]
    async fn test_execute_call_data_selector() {
        let call_data =
            SimpleAccount::execute_call_data(Address::ZERO, U256::ZERO, Bytes::new());
        assert_eq!(&call_data[..4], &ISimpleAccount::executeCall::SELECTOR);
    }

    #[tokio::test]
    async fn test_signature_recovers_owner() {
        let evm = mock_evm();
        let account = SimpleAccount::generate(Address::ZERO, &evm).await.unwrap();

        let hash = B256::repeat_byte(0x42);
        let signature_bytes = account.sign_user_operation_hash(hash).await.unwrap();
        assert_eq!(signature_bytes.len(), 65);

        let signature = Signature::try_from(signature_bytes.as_ref()).unwrap();
        let recovered = signature
            .recover_address_from_msg(hash.as_slice())
            .unwrap();
        assert_eq!(recovered, account.owner());
    }

    #[tokio::test]
    async fn test_build_signed_user_operation() {
        let chain_spec = ChainSpec::base_sepolia();
        let evm = mock_evm();

        let mut bundler = MockBundlerProvider::new();
        bundler
            .expect_get_user_operation_gas_price()
            .returning(|| Ok(gas_price()));

        let mut paymaster = MockPaymasterProvider::new();
        paymaster
            .expect_sponsor_user_operation()
            .withf(|op, entry_point| {
                op.paymaster.is_none()
                    && op.signature == dummy_signature()
                    && *entry_point == ChainSpec::base_sepolia().entry_point_address
            })
            .returning(|_, _| Ok(sponsorship()));

        let op = build_signed_user_operation(&chain_spec, &evm, &bundler, &paymaster)
            .await
            .unwrap();

        assert_eq!(op.sender, ACCOUNT_ADDRESS);
        assert_eq!(op.factory, Some(chain_spec.factory_address));
        assert_eq!(op.paymaster, Some(sponsorship().paymaster));
        assert_eq!(op.paymaster_verification_gas_limit, 60_000);
        assert_eq!(op.paymaster_post_op_gas_limit, 70_000);
        assert_eq!(op.call_gas_limit, 100_000);
        assert_eq!(op.verification_gas_limit, 200_000);
        assert_eq!(op.max_fee_per_gas, 400);
        assert_eq!(op.max_priority_fee_per_gas, 200);
        assert_eq!(op.signature.len(), 65);
        assert_ne!(op.hash(), B256::ZERO);
    }
}
