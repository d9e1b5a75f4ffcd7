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

use std::time::Duration;

use anyhow::Context;
use clap::{builder::PossibleValuesParser, Args, Parser};
use opcannon_provider::{
    new_alloy_bundler_provider, new_alloy_evm_provider, new_alloy_paymaster_provider,
};
use opcannon_runner::{Runner, Settings};
use opcannon_types::{ChainSpec, HARDCODED_CHAIN_SPECS};
use secrecy::{ExposeSecret, SecretString};

mod tracing;

/// Main entry point for the CLI
///
/// Parses the CLI arguments, wires up the providers, and runs one dispatch
/// cycle to completion.
pub async fn run() -> anyhow::Result<()> {
    let opt = Cli::parse();
    let _guard = tracing::configure_logging(&opt.logs)?;
    ::tracing::info!("Parsed CLI options: {:#?}", opt);

    let chain_spec = ChainSpec::resolve(&opt.common.network)
        .context("network should have a hardcoded chain spec")?;
    ::tracing::info!("Chain spec: {:#?}", chain_spec);

    let node_http = opt
        .common
        .node_http
        .clone()
        .unwrap_or_else(|| chain_spec.node_http.to_string());
    let bundler_url = format!(
        "https://api.pimlico.io/v2/{}/rpc?apikey={}",
        chain_spec.id,
        opt.common.pimlico_key.expose_secret()
    );

    let evm = new_alloy_evm_provider(&node_http).context("should create node provider")?;
    let bundler =
        new_alloy_bundler_provider(&bundler_url).context("should create bundler provider")?;
    let paymaster =
        new_alloy_paymaster_provider(&bundler_url).context("should create paymaster provider")?;

    let settings = Settings {
        op_count: opt.common.count,
        jitter_max: Duration::from_millis(opt.common.jitter_max_millis),
        receipt_delay: Duration::from_millis(opt.common.receipt_delay_millis),
        poll_interval: Duration::from_millis(opt.common.poll_interval_millis),
    };

    let report = Runner::new(chain_spec, settings, evm, bundler, paymaster)
        .run()
        .await?;
    println!("{report}");
    Ok(())
}

/// CLI common options
#[derive(Debug, Args)]
#[command(next_help_heading = "Common")]
struct CommonArgs {
    /// Network flag
    #[arg(
        long = "network",
        name = "network",
        env = "NETWORK",
        value_parser = PossibleValuesParser::new(HARDCODED_CHAIN_SPECS),
        default_value = "base-sepolia"
    )]
    network: String,

    /// EVM Node HTTP URL to use
    ///
    /// If not provided, the network's default public node is used
    #[arg(long = "node_http", name = "node_http", env = "NODE_HTTP")]
    node_http: Option<String>,

    /// Pimlico API key, used for both the bundler and the paymaster
    #[arg(
        long = "pimlico_key",
        name = "pimlico_key",
        env = "PIMLICO_KEY",
        hide_env_values = true
    )]
    pimlico_key: SecretString,

    /// Number of user operations to send
    #[arg(long = "count", name = "count", env = "COUNT", default_value = "5")]
    count: usize,

    /// Maximum random delay before each send, in milliseconds
    #[arg(
        long = "jitter_max_millis",
        name = "jitter_max_millis",
        env = "JITTER_MAX_MILLIS",
        default_value = "50"
    )]
    jitter_max_millis: u64,

    /// Delay between dispatch and receipt queries, in milliseconds
    #[arg(
        long = "receipt_delay_millis",
        name = "receipt_delay_millis",
        env = "RECEIPT_DELAY_MILLIS",
        default_value = "10000"
    )]
    receipt_delay_millis: u64,

    /// Block number polling interval, in milliseconds
    #[arg(
        long = "poll_interval_millis",
        name = "poll_interval_millis",
        env = "POLL_INTERVAL_MILLIS",
        default_value = "50"
    )]
    poll_interval_millis: u64,
}

/// CLI options for the logging
#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
struct LogsArgs {
    /// Log file
    ///
    /// If not provided, logs will be written to stdout
    #[arg(
        long = "log.file",
        name = "log.file",
        env = "LOG_FILE",
        default_value = None
    )]
    file: Option<String>,

    /// Log JSON
    ///
    /// If set, logs will be written in JSON format
    #[arg(
        long = "log.json",
        name = "log.json",
        env = "LOG_JSON",
        required = false,
        num_args = 0
    )]
    json: bool,
}

#[derive(Debug, Parser)]
#[command(version, about = "Fires a batch of sponsored user operations at a bundler")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    logs: LogsArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["opcannon", "--pimlico_key", "pim_test"]).unwrap();
        assert_eq!(cli.common.network, "base-sepolia");
        assert_eq!(cli.common.count, 5);
        assert_eq!(cli.common.jitter_max_millis, 50);
        assert_eq!(cli.common.receipt_delay_millis, 10_000);
        assert_eq!(cli.common.poll_interval_millis, 50);
        assert!(cli.common.node_http.is_none());
        assert!(!cli.logs.json);
    }

    #[test]
    fn test_cli_rejects_unknown_network() {
        let result = Cli::try_parse_from([
            "opcannon",
            "--pimlico_key",
            "pim_test",
            "--network",
            "mainnet",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
