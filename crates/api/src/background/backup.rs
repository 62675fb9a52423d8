//! Nightly best-effort database backup.
//!
//! Spawns a background task that dumps the whole database to a file via
//! a containerized `pg_dump` once every 24 hours, then prunes dumps
//! older than the retention period. Entirely independent of request
//! handling: failures are logged and never affect request-serving.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// How often the backup job runs.
const BACKUP_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Default retention period in days.
const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Default directory dumps are written to.
const DEFAULT_BACKUP_DIR: &str = "./backups";

/// Connection parameters handed to the containerized `pg_dump`.
#[derive(Debug, Clone)]
pub struct BackupDatabase {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub name: String,
}

/// Nightly backup settings.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory dump files land in (mounted into the container).
    pub dir: PathBuf,
    /// Dumps older than this many days are pruned after each run.
    pub retention_days: i64,
    /// Database connection parameters; `None` disables the job.
    pub database: Option<BackupDatabase>,
}

impl BackupConfig {
    /// Load backup configuration from environment variables.
    ///
    /// The job is disabled (no task work done) unless all `PGDB_*`
    /// variables are present.
    ///
    /// | Env Var                 | Required | Default     |
    /// |-------------------------|----------|-------------|
    /// | `BACKUP_DIR`            | no       | `./backups` |
    /// | `BACKUP_RETENTION_DAYS` | no       | `7`         |
    /// | `PGDB_USER`             | yes      | --          |
    /// | `PGDB_PASS`             | yes      | --          |
    /// | `PGDB_HOST`             | yes      | --          |
    /// | `PGDB_PORT`             | yes      | --          |
    /// | `PGDB_NAME`             | yes      | --          |
    pub fn from_env() -> Self {
        let dir = PathBuf::from(
            std::env::var("BACKUP_DIR").unwrap_or_else(|_| DEFAULT_BACKUP_DIR.into()),
        );

        let retention_days: i64 = std::env::var("BACKUP_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETENTION_DAYS);

        let database = match (
            std::env::var("PGDB_USER"),
            std::env::var("PGDB_PASS"),
            std::env::var("PGDB_HOST"),
            std::env::var("PGDB_PORT"),
            std::env::var("PGDB_NAME"),
        ) {
            (Ok(user), Ok(password), Ok(host), Ok(port), Ok(name)) => Some(BackupDatabase {
                user,
                password,
                host,
                port,
                name,
            }),
            _ => None,
        };

        Self {
            dir,
            retention_days,
            database,
        }
    }
}

/// Run the nightly backup loop until `cancel` is triggered.
pub async fn run(config: BackupConfig, cancel: CancellationToken) {
    let Some(db) = config.database.clone() else {
        tracing::info!("Backup job disabled (PGDB_* variables not set)");
        return;
    };

    if let Err(e) = std::fs::create_dir_all(&config.dir) {
        tracing::error!(error = %e, dir = %config.dir.display(), "Cannot create backup dir, backup job disabled");
        return;
    }

    tracing::info!(
        dir = %config.dir.display(),
        retention_days = config.retention_days,
        "Backup job started"
    );

    let mut interval = tokio::time::interval(BACKUP_INTERVAL);
    // The first tick fires immediately; skip it so startup does not dump.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Backup job stopping");
                break;
            }
            _ = interval.tick() => {
                if !docker_available().await {
                    tracing::error!("Docker is not available. Skipping backup.");
                    continue;
                }

                match run_backup(&config, &db).await {
                    Ok(filename) => {
                        tracing::info!(filename, "Backup completed");
                        prune_old_backups(&config);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Backup failed");
                    }
                }
            }
        }
    }
}

/// Check whether the docker CLI can reach a daemon.
async fn docker_available() -> bool {
    Command::new("docker")
        .arg("info")
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Dump the database to a timestamped file inside the backup dir.
async fn run_backup(config: &BackupConfig, db: &BackupDatabase) -> Result<String, String> {
    let timestamp = chrono::Utc::now()
        .format("%Y-%m-%dT%H-%M-%S")
        .to_string();
    let filename = format!("backup-{timestamp}.sql");

    let mount = format!("{}:/backups", config.dir.display());
    let dump = format!(
        "pg_dump -U {} -h {} -p {} {} > /backups/{filename}",
        db.user, db.host, db.port, db.name
    );

    let output = Command::new("docker")
        .args([
            "run",
            "--rm",
            "-v",
            &mount,
            "-e",
            &format!("PGPASSWORD={}", db.password),
            "postgres",
            "bash",
            "-c",
            &dump,
        ])
        .output()
        .await
        .map_err(|e| format!("failed to spawn docker: {e}"))?;

    if output.status.success() {
        Ok(filename)
    } else {
        Err(format!(
            "pg_dump exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Delete dump files older than the retention period.
fn prune_old_backups(config: &BackupConfig) {
    let entries = match std::fs::read_dir(&config.dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "Cannot read backup dir for pruning");
            return;
        }
    };

    let max_age = Duration::from_secs(config.retention_days as u64 * 24 * 3600);

    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        let Ok(modified) = metadata.modified() else { continue };
        let Ok(age) = modified.elapsed() else { continue };

        if age > max_age {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::info!(file = %entry.path().display(), "Deleted old backup");
                }
                Err(e) => {
                    tracing::error!(error = %e, file = %entry.path().display(), "Failed to delete old backup");
                }
            }
        }
    }
}
