//! Facade tests: the command the server launches and its lifecycle.

mod common;

use std::sync::Arc;

use common::fakes::{CountingLauncher, FakeAccounts, RecordingExecutor};
use nvserve_core::{EnsureOutcome, InstanceStatus, OptionValues, ServerConfig};
use nvserve_runtime::{
    HttpArtifactFetcher, InstallerConfig, Installer, InstanceSupervisor, MemoryLockStore,
    NeovimServer, ServerError, SupervisorError,
};
use tempfile::TempDir;

fn server(
    temp: &TempDir,
    config: ServerConfig,
) -> NeovimServer<MemoryLockStore, CountingLauncher> {
    let installer = Installer::new(
        Arc::new(HttpArtifactFetcher::new().unwrap()),
        Arc::new(RecordingExecutor::default()),
        Arc::new(FakeAccounts::new(temp.path().join("home"))),
        InstallerConfig {
            bin_dir: temp.path().join("bin"),
            ..InstallerConfig::default()
        },
    );
    let supervisor = InstanceSupervisor::new(MemoryLockStore::new(), CountingLauncher::new());
    NeovimServer::new(config, installer, supervisor)
}

#[test]
fn test_start_launches_headless_listener_in_workspace() {
    let temp = TempDir::new().unwrap();
    let server = server(&temp, ServerConfig::with_defaults());

    let outcome = server.start(temp.path()).unwrap();
    assert!(outcome.started());

    let specs = server.supervisor().launcher().specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(
        specs[0].argv(),
        vec!["sh", "-c", "nvim --listen 0.0.0.0:9251 --headless"]
    );
    assert_eq!(specs[0].working_dir.as_deref(), Some(temp.path()));
    assert!(specs[0].env.is_empty());
    assert!(temp.path().join("home/nvim").is_dir());
}

#[test]
fn test_second_start_reports_running_instance() {
    let temp = TempDir::new().unwrap();
    let server = server(&temp, ServerConfig::with_defaults());

    let first = server.start(temp.path()).unwrap();
    let second = server.start(temp.path()).unwrap();

    assert_eq!(second, EnsureOutcome::AlreadyRunning { pid: first.pid() });
    assert_eq!(server.supervisor().launcher().launches(), 1);
}

#[test]
fn test_running_instance_skips_launch_preparation() {
    let temp = TempDir::new().unwrap();
    let server = server(&temp, ServerConfig::with_defaults());

    let first = server.start(temp.path()).unwrap();

    // The workspace check and command assembly belong to the launch itself,
    // so a live instance answers before either runs.
    let second = server.start(&temp.path().join("missing")).unwrap();

    assert_eq!(second, EnsureOutcome::AlreadyRunning { pid: first.pid() });
    assert_eq!(server.supervisor().launcher().specs().len(), 1);
    assert_eq!(server.supervisor().launcher().launches(), 1);
}

#[test]
fn test_user_host_port_and_config_directory_shape_the_command() {
    let temp = TempDir::new().unwrap();
    let options: OptionValues = [("CONFIG_DIRECTORY", "/workspaces/.config")]
        .into_iter()
        .collect();
    let config =
        ServerConfig::resolve(Some("vscode"), Some("127.0.0.1"), Some("10000"), options).unwrap();
    let server = server(&temp, config);

    server.start(temp.path()).unwrap();

    let spec = &server.supervisor().launcher().specs()[0];
    assert_eq!(
        spec.argv(),
        vec!["su", "vscode", "-c", "nvim --listen 127.0.0.1:10000 --headless"]
    );
    assert_eq!(
        spec.env,
        vec![("XDG_CONFIG_HOME".to_string(), "/workspaces/.config".to_string())]
    );
    assert_eq!(server.listen_address(), "127.0.0.1:10000");
}

#[test]
fn test_missing_workspace_fails_without_launch() {
    let temp = TempDir::new().unwrap();
    let server = server(&temp, ServerConfig::with_defaults());

    let err = server.start(&temp.path().join("missing")).unwrap_err();

    assert!(matches!(
        err,
        ServerError::Supervisor(SupervisorError::Launch { .. })
    ));
    assert_eq!(server.supervisor().launcher().launches(), 0);
    assert_eq!(server.status().unwrap(), InstanceStatus::NotRunning);
}

#[test]
fn test_status_and_stop_follow_the_instance() {
    let temp = TempDir::new().unwrap();
    let server = server(&temp, ServerConfig::with_defaults());

    let pid = server.start(temp.path()).unwrap().pid();
    assert!(matches!(server.status().unwrap(), InstanceStatus::Running(r) if r.pid == pid));

    assert_eq!(server.stop().unwrap(), Some(pid));
    assert_eq!(server.status().unwrap(), InstanceStatus::NotRunning);
    assert_eq!(server.stop().unwrap(), None);
}
