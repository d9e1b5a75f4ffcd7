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

use opcannon_provider::ProviderError;

/// Error type for the account crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Contract call returned undecodable data
    #[error("contract call error: {0}")]
    ContractCall(String),
    /// Signing error
    #[error("signing error: {0}")]
    Signing(String),
    /// Provider error
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for the account crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<alloy_signer::Error> for Error {
    fn from(value: alloy_signer::Error) -> Self {
        Error::Signing(value.to_string())
    }
}

impl From<alloy_sol_types::Error> for Error {
    fn from(value: alloy_sol_types::Error) -> Self {
        Error::ContractCall(value.to_string())
    }
}
