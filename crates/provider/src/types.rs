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

//! Wire types for the bundler and paymaster JSON-RPC methods.

use alloy_primitives::{Address, Bytes, B256, U128, U256};
use alloy_rpc_types_eth::Log;
use opcannon_types::UserOperation;
use serde::{Deserialize, Serialize};

/// v0.7 user operation, JSON-RPC form.
///
/// Also used for sponsorship requests, where the paymaster fields are unset
/// and the gas limits are placeholders for the paymaster to fill in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RpcUserOperation {
    /// Smart account address
    pub sender: Address,
    /// Entry point nonce
    pub nonce: U256,
    /// Account factory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    /// Factory calldata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,
    /// Calldata executed by the account
    pub call_data: Bytes,
    /// Execution gas limit
    pub call_gas_limit: U128,
    /// Verification gas limit
    pub verification_gas_limit: U128,
    /// Pre-verification gas
    pub pre_verification_gas: U256,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: U128,
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: U128,
    /// Sponsoring paymaster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// Paymaster verification gas limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
    /// Paymaster post-op gas limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U128>,
    /// Paymaster calldata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// Signature over the user operation hash
    pub signature: Bytes,
}

impl From<&UserOperation> for RpcUserOperation {
    fn from(op: &UserOperation) -> Self {
        let factory_data = op.factory.is_some().then(|| op.factory_data.clone());
        let (paymaster_data, paymaster_verification_gas_limit, paymaster_post_op_gas_limit) =
            if op.paymaster.is_some() {
                (
                    Some(op.paymaster_data.clone()),
                    Some(U128::from(op.paymaster_verification_gas_limit)),
                    Some(U128::from(op.paymaster_post_op_gas_limit)),
                )
            } else {
                (None, None, None)
            };

        RpcUserOperation {
            sender: op.sender,
            nonce: op.nonce,
            factory: op.factory,
            factory_data,
            call_data: op.call_data.clone(),
            call_gas_limit: U128::from(op.call_gas_limit),
            verification_gas_limit: U128::from(op.verification_gas_limit),
            pre_verification_gas: op.pre_verification_gas,
            max_priority_fee_per_gas: U128::from(op.max_priority_fee_per_gas),
            max_fee_per_gas: U128::from(op.max_fee_per_gas),
            paymaster: op.paymaster,
            paymaster_verification_gas_limit,
            paymaster_post_op_gas_limit,
            paymaster_data,
            signature: op.signature.clone(),
        }
    }
}

/// EIP-1559 fee pair at one priority level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceFees {
    /// Max fee per gas
    pub max_fee_per_gas: U128,
    /// Max priority fee per gas
    pub max_priority_fee_per_gas: U128,
}

/// Result of `pimlico_getUserOperationGasPrice`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationGasPrice {
    /// Slow inclusion fees
    pub slow: GasPriceFees,
    /// Standard inclusion fees
    pub standard: GasPriceFees,
    /// Fast inclusion fees
    pub fast: GasPriceFees,
}

/// Result of `pm_sponsorUserOperation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SponsorUserOperationResult {
    /// Sponsoring paymaster address
    pub paymaster: Address,
    /// Paymaster calldata
    pub paymaster_data: Bytes,
    /// Paymaster verification gas limit
    pub paymaster_verification_gas_limit: U128,
    /// Paymaster post-op gas limit
    pub paymaster_post_op_gas_limit: U128,
    /// Pre-verification gas validated by the paymaster
    pub pre_verification_gas: U256,
    /// Verification gas limit validated by the paymaster
    pub verification_gas_limit: U128,
    /// Execution gas limit validated by the paymaster
    pub call_gas_limit: U128,
}

/// User operation receipt, as reported by `eth_getUserOperationReceipt`.
///
/// Only the fields the demo reads are deserialized; the embedded
/// transaction receipt is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    /// The hash of the user operation
    pub user_op_hash: B256,
    /// The entry point address this operation was sent to
    pub entry_point: Address,
    /// The sender of this user operation
    pub sender: Address,
    /// The nonce of this user operation
    pub nonce: U256,
    /// The paymaster used by this operation, if any
    #[serde(default)]
    pub paymaster: Option<Address>,
    /// The gas cost of this operation
    pub actual_gas_cost: U256,
    /// The gas used by this operation
    pub actual_gas_used: U256,
    /// Whether this operation's execution was successful
    pub success: bool,
    /// If not successful, the revert reason string
    #[serde(default)]
    pub reason: String,
    /// Logs emitted by this operation
    #[serde(default)]
    pub logs: Vec<Log>,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes};
    use opcannon_types::{UserOperationBuilder, UserOperationRequiredFields};
    use serde_json::json;

    use super::*;

    fn signed_op(with_paymaster: bool) -> UserOperation {
        let mut builder = UserOperationBuilder::new(
            address!("0x0000000071727De22E5E9d8BAf0edAc6f37da032"),
            84532,
            UserOperationRequiredFields {
                sender: address!("0x0101010101010101010101010101010101010101"),
                nonce: U256::ZERO,
                call_data: bytes!("b61d27f6"),
                call_gas_limit: 100_000,
                verification_gas_limit: 200_000,
                pre_verification_gas: U256::from(50_000),
                max_priority_fee_per_gas: 1_000_000,
                max_fee_per_gas: 2_000_000,
            },
        )
        .factory(
            address!("0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985"),
            bytes!("5fbfb9cf"),
        );
        if with_paymaster {
            builder = builder.paymaster(
                address!("0x0303030303030303030303030303030303030303"),
                60_000,
                70_000,
                bytes!("0102"),
            );
        }
        builder.build().with_signature(bytes!("deadbeef"))
    }

    #[test]
    fn test_rpc_user_operation_serializes_camel_case() {
        let rpc_op = RpcUserOperation::from(&signed_op(true));
        let value = serde_json::to_value(&rpc_op).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "sender",
            "nonce",
            "factory",
            "factoryData",
            "callData",
            "callGasLimit",
            "verificationGasLimit",
            "preVerificationGas",
            "maxPriorityFeePerGas",
            "maxFeePerGas",
            "paymaster",
            "paymasterVerificationGasLimit",
            "paymasterPostOpGasLimit",
            "paymasterData",
            "signature",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["signature"], json!("0xdeadbeef"));
    }

    #[test]
    fn test_rpc_user_operation_omits_unset_paymaster() {
        let rpc_op = RpcUserOperation::from(&signed_op(false));
        let value = serde_json::to_value(&rpc_op).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("paymaster"));
        assert!(!obj.contains_key("paymasterData"));
        assert!(!obj.contains_key("paymasterVerificationGasLimit"));
        assert!(!obj.contains_key("paymasterPostOpGasLimit"));
    }

    #[test]
    fn test_gas_price_deserializes() {
        let value = json!({
            "slow": { "maxFeePerGas": "0x64", "maxPriorityFeePerGas": "0x32" },
            "standard": { "maxFeePerGas": "0xc8", "maxPriorityFeePerGas": "0x64" },
            "fast": { "maxFeePerGas": "0x190", "maxPriorityFeePerGas": "0xc8" },
        });
        let price: UserOperationGasPrice = serde_json::from_value(value).unwrap();
        assert_eq!(price.fast.max_fee_per_gas, U128::from(0x190));
        assert_eq!(price.slow.max_priority_fee_per_gas, U128::from(0x32));
    }

    #[test]
    fn test_receipt_ignores_unknown_fields() {
        let value = json!({
            "userOpHash": B256::repeat_byte(1),
            "entryPoint": Address::repeat_byte(2),
            "sender": Address::repeat_byte(3),
            "nonce": "0x0",
            "paymaster": Address::repeat_byte(4),
            "actualGasCost": "0x100",
            "actualGasUsed": "0x80",
            "success": true,
            "reason": "",
            "logs": [],
            "receipt": { "transactionHash": B256::repeat_byte(5) },
        });
        let receipt: UserOperationReceipt = serde_json::from_value(value).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.user_op_hash, B256::repeat_byte(1));
        assert!(receipt.logs.is_empty());
    }
}
