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

//! Minimal interface bindings for the contracts the demo touches.

use alloy_sol_types::sol;

sol! {
    /// v0.7 user operation in its onchain packed form, used as the hash preimage.
    #[derive(Debug, Default, Eq, PartialEq)]
    struct PackedUserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes paymasterAndData;
        bytes signature;
    }

    interface ISimpleAccount {
        function execute(address dest, uint256 value, bytes calldata func) external;
    }

    interface ISimpleAccountFactory {
        function createAccount(address owner, uint256 salt) external returns (address account);
        function getAddress(address owner, uint256 salt) external view returns (address account);
    }

    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}
