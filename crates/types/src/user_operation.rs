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

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use crate::contracts::PackedUserOperation;

/// User Operation
///
/// v0.7 offchain version, must be packed before hashing or sending onchain.
///
/// The user operation hash is computed once at build time. The signature is
/// not part of the hash preimage, so it may be attached after building
/// without invalidating the hash.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserOperation {
    /// Smart account address
    pub sender: Address,
    /// Entry point nonce
    pub nonce: U256,
    /// Account factory, set when the account is not yet deployed
    pub factory: Option<Address>,
    /// Factory calldata, empty unless `factory` is set
    pub factory_data: Bytes,
    /// Calldata executed by the account
    pub call_data: Bytes,
    /// Execution gas limit
    pub call_gas_limit: u128,
    /// Verification gas limit
    pub verification_gas_limit: u128,
    /// Gas to compensate the bundler for pre-verification work
    pub pre_verification_gas: U256,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: u128,
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: u128,
    /// Sponsoring paymaster, if any
    pub paymaster: Option<Address>,
    /// Paymaster verification gas limit, zero unless `paymaster` is set
    pub paymaster_verification_gas_limit: u128,
    /// Paymaster post-op gas limit, zero unless `paymaster` is set
    pub paymaster_post_op_gas_limit: u128,
    /// Paymaster calldata, empty unless `paymaster` is set
    pub paymaster_data: Bytes,
    /// Account owner signature over the user operation hash
    pub signature: Bytes,
    hash: B256,
}

impl UserOperation {
    /// The user operation hash, as computed at build time from the packed
    /// fields plus the entry point address and chain id.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Attach a signature. The signature is outside the hash preimage, so
    /// the precomputed hash stays valid.
    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }

    /// Pack into the onchain representation.
    pub fn pack(&self) -> PackedUserOperation {
        pack_user_operation(self)
    }
}

/// Builder for a v0.7 [`UserOperation`]
pub struct UserOperationBuilder {
    // required fields for hash
    entry_point: Address,
    chain_id: u64,

    // required fields
    required: UserOperationRequiredFields,

    // optional fields
    factory: Option<Address>,
    factory_data: Bytes,
    paymaster: Option<Address>,
    paymaster_verification_gas_limit: u128,
    paymaster_post_op_gas_limit: u128,
    paymaster_data: Bytes,
}

/// Required fields of a v0.7 user operation
pub struct UserOperationRequiredFields {
    /// Smart account address
    pub sender: Address,
    /// Entry point nonce
    pub nonce: U256,
    /// Calldata executed by the account
    pub call_data: Bytes,
    /// Execution gas limit
    pub call_gas_limit: u128,
    /// Verification gas limit
    pub verification_gas_limit: u128,
    /// Gas to compensate the bundler for pre-verification work
    pub pre_verification_gas: U256,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: u128,
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: u128,
}

impl UserOperationBuilder {
    /// Create a builder. The entry point and chain id are only used to
    /// compute the hash and are not part of the resulting operation.
    pub fn new(entry_point: Address, chain_id: u64, required: UserOperationRequiredFields) -> Self {
        Self {
            entry_point,
            chain_id,
            required,
            factory: None,
            factory_data: Bytes::new(),
            paymaster: None,
            paymaster_verification_gas_limit: 0,
            paymaster_post_op_gas_limit: 0,
            paymaster_data: Bytes::new(),
        }
    }

    /// Set the factory and factory data.
    pub fn factory(mut self, factory: Address, factory_data: Bytes) -> Self {
        self.factory = Some(factory);
        self.factory_data = factory_data;
        self
    }

    /// Set the paymaster and associated fields.
    pub fn paymaster(
        mut self,
        paymaster: Address,
        paymaster_verification_gas_limit: u128,
        paymaster_post_op_gas_limit: u128,
        paymaster_data: Bytes,
    ) -> Self {
        self.paymaster = Some(paymaster);
        self.paymaster_verification_gas_limit = paymaster_verification_gas_limit;
        self.paymaster_post_op_gas_limit = paymaster_post_op_gas_limit;
        self.paymaster_data = paymaster_data;
        self
    }

    /// Build the operation, computing its hash. The signature is left
    /// empty; attach it with [`UserOperation::with_signature`].
    pub fn build(self) -> UserOperation {
        let uo = UserOperation {
            sender: self.required.sender,
            nonce: self.required.nonce,
            factory: self.factory,
            factory_data: self.factory_data,
            call_data: self.required.call_data,
            call_gas_limit: self.required.call_gas_limit,
            verification_gas_limit: self.required.verification_gas_limit,
            pre_verification_gas: self.required.pre_verification_gas,
            max_priority_fee_per_gas: self.required.max_priority_fee_per_gas,
            max_fee_per_gas: self.required.max_fee_per_gas,
            paymaster: self.paymaster,
            paymaster_verification_gas_limit: self.paymaster_verification_gas_limit,
            paymaster_post_op_gas_limit: self.paymaster_post_op_gas_limit,
            paymaster_data: self.paymaster_data,
            signature: Bytes::new(),
            hash: B256::ZERO,
        };

        let packed = pack_user_operation(&uo);
        let hash = hash_packed_user_operation(&packed, self.entry_point, self.chain_id);

        UserOperation { hash, ..uo }
    }
}

fn pack_user_operation(uo: &UserOperation) -> PackedUserOperation {
    let init_code = if let Some(factory) = uo.factory {
        let mut init_code = factory.to_vec();
        init_code.extend_from_slice(&uo.factory_data);
        Bytes::from(init_code)
    } else {
        Bytes::new()
    };

    let account_gas_limits = concat_u128_be(uo.verification_gas_limit, uo.call_gas_limit);
    let gas_fees = concat_u128_be(uo.max_priority_fee_per_gas, uo.max_fee_per_gas);

    let paymaster_and_data = if let Some(paymaster) = uo.paymaster {
        let mut paymaster_and_data = paymaster.to_vec();
        paymaster_and_data
            .extend_from_slice(&uo.paymaster_verification_gas_limit.to_be_bytes());
        paymaster_and_data.extend_from_slice(&uo.paymaster_post_op_gas_limit.to_be_bytes());
        paymaster_and_data.extend_from_slice(&uo.paymaster_data);
        Bytes::from(paymaster_and_data)
    } else {
        Bytes::new()
    };

    PackedUserOperation {
        sender: uo.sender,
        nonce: uo.nonce,
        initCode: init_code,
        callData: uo.call_data.clone(),
        accountGasLimits: account_gas_limits.into(),
        preVerificationGas: uo.pre_verification_gas,
        gasFees: gas_fees.into(),
        paymasterAndData: paymaster_and_data,
        signature: uo.signature.clone(),
    }
}

fn hash_packed_user_operation(
    puo: &PackedUserOperation,
    entry_point: Address,
    chain_id: u64,
) -> B256 {
    let hashed = keccak256(
        (
            puo.sender,
            puo.nonce,
            keccak256(&puo.initCode),
            keccak256(&puo.callData),
            puo.accountGasLimits,
            puo.preVerificationGas,
            puo.gasFees,
            keccak256(&puo.paymasterAndData),
        )
            .abi_encode(),
    );

    keccak256((hashed, entry_point, U256::from(chain_id)).abi_encode())
}

fn concat_u128_be(a: u128, b: u128) -> [u8; 32] {
    let a = a.to_be_bytes();
    let b = b.to_be_bytes();
    std::array::from_fn(|i| {
        if let Some(i) = i.checked_sub(a.len()) {
            b[i]
        } else {
            a[i]
        }
    })
}
