//!

use std::io::Write;
use std::path::PathBuf;

use deploy_networks::config::{self, NetworksFile};
use deploy_networks::secret;
use deploy_networks::{CompilerOptions, NetworkConfigError, NetworkId, OptimizerSettings, Secret};
use ethers::prelude::*;

const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

fn bundled_networks_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(deploy_networks::constants::DEFAULT_NETWORKS_FILE_NAME)
}

fn write_networks_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test_log::test]
fn bundled_networks_file_resolves() {
    std::env::set_var("INFURA_PROJECT_ID", "test-project");
    let registry = config::load_registry(bundled_networks_file()).unwrap();

    let names: Vec<&str> = registry.list().collect();
    assert_eq!(names, vec!["development", "ropsten"]);

    let secrets = secret::from_fn(|| Ok(Some(Secret::new(TEST_MNEMONIC))));

    let development = registry.resolve("development", &secrets).unwrap();
    assert_eq!(development.endpoint().direct(), Some(("127.0.0.1", 7545)));
    assert_eq!(development.network_id(), NetworkId::Any);
    assert_eq!(development.compiler_options(), Some(&CompilerOptions::optimized(200)));

    let ropsten = registry.resolve("ropsten", &secrets).unwrap();
    assert_eq!(ropsten.network_id(), NetworkId::Id(3));
    assert_eq!(ropsten.gas_limit(), Some(4_000_000));
    let provider = ropsten.endpoint().provider().unwrap();
    let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
    assert_eq!(provider.signer_address(), expected);
    assert_eq!(provider.client().signer().chain_id(), 3);
}

#[test]
fn network_level_solc_overrides_defaults() {
    let file = write_networks_file(
        r#"
        [networks.development]
        host = "127.0.0.1"
        port = 7545
        network_id = "*"
        solc = { optimizer = { enabled = false } }

        [solc.optimizer]
        enabled = true
        runs = 200
        "#,
    );
    let registry = config::load_registry(file.path()).unwrap();
    let resolved = registry
        .resolve("development", &secret::from_fn(|| Ok(None)))
        .unwrap();
    let expected = CompilerOptions {
        optimizer: Some(OptimizerSettings {
            enabled: Some(false),
            runs: None,
        }),
    };
    assert_eq!(resolved.compiler_options(), Some(&expected));
}

#[test]
fn host_and_provider_together_are_rejected() {
    let file = write_networks_file(
        r#"
        [networks.confused]
        host = "127.0.0.1"
        port = 7545
        network_id = 3
        provider = { url = "https://ropsten.example.org" }
        "#,
    );
    let err = config::load_registry(file.path()).unwrap_err();
    assert!(matches!(err, NetworkConfigError::InvalidDefinition { name, .. } if name == "confused"));
}

#[test]
fn negative_network_id_is_rejected() {
    let file = write_networks_file(
        r#"
        [networks.development]
        host = "127.0.0.1"
        port = 7545
        network_id = -1
        "#,
    );
    let err = config::load_registry(file.path()).unwrap_err();
    assert!(matches!(err, NetworkConfigError::InvalidDefinition { .. }));
}

#[test]
fn unset_url_variable_is_reported() {
    let file = NetworksFile::from_toml(
        r#"
        [networks.ropsten]
        network_id = 3
        provider = { url = "https://ropsten.infura.io/v3/${NETWORKS_TEST_UNSET_PROJECT_ID}" }
        "#,
    )
    .unwrap();
    let err = file.into_registry().unwrap_err();
    assert!(matches!(err, NetworkConfigError::MissingVariable(var) if var == "NETWORKS_TEST_UNSET_PROJECT_ID"));
}

#[test]
fn missing_file_is_a_load_error() {
    let err = config::load_registry("configs/does-not-exist.toml").unwrap_err();
    assert!(matches!(err, NetworkConfigError::ConfigLoad(_)));
}

#[test]
fn resolving_without_mnemonic_fails_for_provider_networks() {
    let file = NetworksFile::from_toml(
        r#"
        [networks.ropsten]
        network_id = 3
        provider = { url = "https://ropsten.example.org" }
        "#,
    )
    .unwrap();
    let registry = file.into_registry().unwrap();
    let err = registry
        .resolve("ropsten", &secret::from_fn(|| Ok(None)))
        .unwrap_err();
    assert!(matches!(err, NetworkConfigError::SecretRequired(_)));
}

#[test]
fn wildcard_provider_network_is_rejected() {
    let file = NetworksFile::from_toml(
        r#"
        [networks.anychain]
        network_id = "*"
        provider = { url = "https://ropsten.example.org" }
        "#,
    )
    .unwrap();
    let err = file.into_registry().unwrap_err();
    match err {
        NetworkConfigError::InvalidDefinition { name, reason } => {
            assert_eq!(name, "anychain");
            assert!(reason.contains("numeric network_id"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
