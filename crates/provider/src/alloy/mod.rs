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

use alloy_provider::{Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_client::ClientBuilder;
use alloy_transport::layers::{RetryBackoffLayer, RetryBackoffService};
use alloy_transport_http::Http;
use anyhow::Context;
use reqwest::Client;
use url::Url;

mod bundler;
mod evm;
mod paymaster;

use bundler::AlloyBundlerProvider;
use evm::AlloyEvmProvider;
use paymaster::AlloyPaymasterProvider;

use crate::{BundlerProvider, EvmProvider, PaymasterProvider};

/// Create a new alloy evm provider from a given RPC URL
pub fn new_alloy_evm_provider(rpc_url: &str) -> anyhow::Result<impl EvmProvider + Clone> {
    Ok(AlloyEvmProvider::new(new_alloy_provider(rpc_url)?))
}

/// Create a new alloy bundler provider from a given bundler RPC URL
pub fn new_alloy_bundler_provider(
    bundler_url: &str,
) -> anyhow::Result<impl BundlerProvider + Clone> {
    Ok(AlloyBundlerProvider::new(new_alloy_provider(bundler_url)?))
}

/// Create a new alloy paymaster provider from a given bundler RPC URL
///
/// Pimlico serves the paymaster methods on the same endpoint as the bundler.
pub fn new_alloy_paymaster_provider(
    bundler_url: &str,
) -> anyhow::Result<impl PaymasterProvider + Clone> {
    Ok(AlloyPaymasterProvider::new(new_alloy_provider(
        bundler_url,
    )?))
}

/// Create a new alloy provider from a given RPC URL
pub fn new_alloy_provider(
    rpc_url: &str,
) -> anyhow::Result<impl AlloyProvider<RetryBackoffService<Http<Client>>> + Clone> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    let retry_layer = RetryBackoffLayer::new(10, 500, 1_000_000);
    let client = ClientBuilder::default().layer(retry_layer).http(url);
    let provider = ProviderBuilder::new().on_client(client);
    Ok(provider)
}
