//! Contract migration runner.
//!
//! # Responsibilities
//! - Spawn the migration executable in the contracts project root
//! - Inherit stdio and environment so migration output shows up live
//! - Map the exit status to success or a typed [`DeploymentError`]
//!
//! # Design Decisions
//! - One attempt, no retry: a failed migration aborts the orchestration run
//! - The child is killed if the deploy future is dropped or times out

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::ContractsConfig;
use crate::error::DeploymentError;

/// Runs the migration executable against the local chain.
#[derive(Debug, Clone)]
pub struct ContractDeployer {
    project_dir: PathBuf,
    executable: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ContractDeployer {
    pub fn new(config: &ContractsConfig) -> Self {
        Self {
            project_dir: config.project_dir.clone(),
            executable: config.executable.clone(),
            args: config.args.clone(),
            timeout: None,
        }
    }

    /// Give up (and kill the child) after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the migration to completion.
    pub async fn deploy(&self) -> Result<(), DeploymentError> {
        let spawn_error = |source| DeploymentError::Spawn {
            program: self.executable.clone(),
            source,
        };
        let cwd = std::env::current_dir().map_err(spawn_error)?;
        let program = resolve_program(&cwd, &self.project_dir, &self.executable);

        tracing::info!(
            program = %program.display(),
            args = ?self.args,
            cwd = %self.project_dir.display(),
            "Deploying contracts"
        );

        let mut child = Command::new(&program)
            .args(&self.args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(error = %e, "Failed to kill timed out migration");
                    }
                    return Err(DeploymentError::TimedOut(limit));
                }
            },
            None => child.wait().await,
        }
        .map_err(spawn_error)?;

        if status.success() {
            tracing::info!("Contract migration finished OK");
            Ok(())
        } else {
            tracing::error!(code = ?status.code(), "Contract migration failed");
            Err(DeploymentError::Exit {
                code: status.code(),
            })
        }
    }
}

/// Relative paths with a separator are anchored at the project root, made
/// absolute against `cwd` since the child runs inside the project root; bare
/// names are looked up on `PATH`.
fn resolve_program(cwd: &Path, project_dir: &Path, executable: &str) -> PathBuf {
    let path = Path::new(executable);
    if path.is_relative() && path.components().count() > 1 {
        cwd.join(project_dir).join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(project_dir: &Path, script: &str) -> ContractDeployer {
        ContractDeployer::new(&ContractsConfig {
            project_dir: project_dir.to_path_buf(),
            executable: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        })
    }

    #[test]
    fn resolves_relative_executables_against_project() {
        let cwd = Path::new("/work/app");
        let dir = Path::new("/work/contracts");
        assert_eq!(
            resolve_program(cwd, dir, "./node_modules/.bin/truffle"),
            PathBuf::from("/work/contracts/./node_modules/.bin/truffle")
        );
        assert_eq!(resolve_program(cwd, dir, "truffle"), PathBuf::from("truffle"));
        assert_eq!(resolve_program(cwd, dir, "/usr/bin/env"), PathBuf::from("/usr/bin/env"));
    }

    #[test]
    fn relative_project_dir_is_applied_once() {
        let cwd = Path::new("/work/app");
        assert_eq!(
            resolve_program(cwd, Path::new("contracts"), "./bin/migrate"),
            PathBuf::from("/work/app/contracts/./bin/migrate")
        );
        assert_eq!(
            resolve_program(cwd, Path::new("../contracts"), "bin/migrate"),
            PathBuf::from("/work/app/../contracts/bin/migrate")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn relative_project_dir_runs_project_executable() {
        let cwd = std::env::current_dir().unwrap();
        let root = tempfile::tempdir_in(&cwd).unwrap();
        let project = root.path().join("proj");
        std::fs::create_dir_all(project.join("bin")).unwrap();
        std::os::unix::fs::symlink("/bin/sh", project.join("bin/migrate")).unwrap();
        std::fs::write(project.join("truffle-config.js"), "").unwrap();

        let relative = project.strip_prefix(&cwd).unwrap().to_path_buf();
        assert!(relative.is_relative());

        let deployer = ContractDeployer::new(&ContractsConfig {
            project_dir: relative,
            executable: "./bin/migrate".to_string(),
            args: vec!["-c".to_string(), "test -f truffle-config.js".to_string()],
        });
        deployer.deploy().await.unwrap();
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        shell(dir.path(), "exit 0").deploy().await.unwrap();
    }

    #[tokio::test]
    async fn runs_in_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("truffle-config.js"), "").unwrap();
        shell(dir.path(), "test -f truffle-config.js").deploy().await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = shell(dir.path(), "exit 3").deploy().await.unwrap_err();
        assert!(matches!(err, DeploymentError::Exit { code: Some(3) }));
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = ContractDeployer::new(&ContractsConfig {
            project_dir: dir.path().to_path_buf(),
            executable: "./node_modules/.bin/truffle".to_string(),
            args: Vec::new(),
        });
        let err = deployer.deploy().await.unwrap_err();
        assert!(matches!(err, DeploymentError::Spawn { .. }));
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let err = shell(dir.path(), "sleep 30")
            .with_timeout(Some(Duration::from_millis(200)))
            .deploy()
            .await
            .unwrap_err();
        assert!(matches!(err, DeploymentError::TimedOut(_)));
    }
}
