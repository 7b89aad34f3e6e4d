//! Command-level tests driving the dispatcher against a temporary layout.

use kpm_cli::commands::checksum::ChecksumAction;
use kpm_cli::commands::install::InstallArgs;
use kpm_cli::commands::uninstall::UninstallArgs;
use kpm_cli::commands::versions::VersionsArgs;
use kpm_cli::commands::execute;
use kpm_cli::{CommandEnv, Commands, exit_code_for};
use kpm_core::RunContext;
use kpm_core::cli::{ExitCode, OutputFormat};
use kpm_store::{ChecksumStore, IdentifierRegistry};
use std::fs;
use tempfile::TempDir;

const STRIPE_DIR: &str = "org/kill-bill/billing/plugin/java/stripe-plugin";
const STRIPE_COORDINATE: &str = "org.kill-bill.billing.plugin.java:stripe-plugin:jar:3.0.2";

fn setup() -> (TempDir, CommandEnv) {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repository");
    for version in ["3.0.1", "3.0.2"] {
        let dir = repo.join(STRIPE_DIR).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("stripe-plugin-{version}.jar")),
            format!("stripe {version}"),
        )
        .unwrap();
    }

    let env = CommandEnv::new(
        RunContext::new(temp.path().join("bundles")),
        repo,
        OutputFormat::Json,
    );
    (temp, env)
}

fn install(key: &str) -> Commands {
    Commands::Install(InstallArgs {
        key: key.to_string(),
        group: None,
        artifact: None,
        packaging: None,
        classifier: None,
        version: "latest".to_string(),
    })
}

fn uninstall(target: &str) -> Commands {
    Commands::Uninstall(UninstallArgs {
        target: target.to_string(),
        version: None,
    })
}

#[test]
fn test_install_list_uninstall_cycle() {
    let (_temp, env) = setup();

    assert_eq!(execute(&install("stripe"), &env, None).unwrap(), ExitCode::SUCCESS);

    let registry = IdentifierRegistry::load(env.ctx().registry_file()).unwrap();
    assert_eq!(registry.get("stripe").unwrap().version, "3.0.2");

    assert_eq!(execute(&Commands::List, &env, None).unwrap(), ExitCode::SUCCESS);

    assert_eq!(
        execute(&uninstall("stripe-plugin"), &env, None).unwrap(),
        ExitCode::SUCCESS
    );
    let registry = IdentifierRegistry::load(env.ctx().registry_file()).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_versions_command() {
    let (_temp, env) = setup();

    let command = Commands::Versions(VersionsArgs {
        key: "stripe".to_string(),
        group: None,
        artifact: None,
        packaging: None,
    });
    assert_eq!(execute(&command, &env, None).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_uninstall_unknown_target_maps_to_not_found() {
    let (_temp, env) = setup();
    execute(&install("stripe"), &env, None).unwrap();

    let err = execute(&uninstall("avatax"), &env, None).unwrap_err();

    assert_eq!(exit_code_for(&err), ExitCode::NOT_FOUND);
}

#[test]
fn test_install_unknown_key_is_invalid_input() {
    let (_temp, env) = setup();

    let err = execute(&install("nonexistent"), &env, None).unwrap_err();

    assert_eq!(exit_code_for(&err), ExitCode::INVALID_INPUT);
    assert!(!env.ctx().bundles_dir().exists());
}

#[test]
fn test_tampered_artifact_maps_to_integrity_failure() {
    let (_temp, env) = setup();
    execute(&install("stripe"), &env, None).unwrap();

    fs::write(
        env.repository()
            .join(STRIPE_DIR)
            .join("3.0.2/stripe-plugin-3.0.2.jar"),
        "tampered",
    )
    .unwrap();
    let err = execute(&install("stripe"), &env, None).unwrap_err();

    assert_eq!(exit_code_for(&err), ExitCode::INTEGRITY_FAILURE);
}

#[test]
fn test_checksum_list_and_remove() {
    let (_temp, env) = setup();
    execute(&install("stripe"), &env, None).unwrap();

    let list = Commands::Checksum {
        action: ChecksumAction::List,
    };
    assert_eq!(execute(&list, &env, None).unwrap(), ExitCode::SUCCESS);

    let remove = Commands::Checksum {
        action: ChecksumAction::Remove {
            coordinate: STRIPE_COORDINATE.to_string(),
            yes: true,
        },
    };
    assert_eq!(execute(&remove, &env, None).unwrap(), ExitCode::SUCCESS);

    let store = ChecksumStore::open(env.ctx().checksum_file()).unwrap();
    assert!(store.lookup(STRIPE_COORDINATE).is_none());

    assert_eq!(execute(&remove, &env, None).unwrap(), ExitCode::NOT_FOUND);
}

#[test]
fn test_list_on_empty_bundles_dir() {
    let (_temp, env) = setup();

    assert_eq!(execute(&Commands::List, &env, None).unwrap(), ExitCode::SUCCESS);
    assert!(!env.ctx().registry_file().exists());
}
