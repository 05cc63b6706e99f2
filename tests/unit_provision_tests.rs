use variant_matrix::config::DatabaseConfig;
use variant_matrix::core::provision::{PostgresProvisioner, Provisioner};
use variant_matrix::error::ProvisionError;

mod common;
use common::{FakeExecutor, Scripted, database_config, postgres, sqlite};

const FULL_PLAN: [&str; 6] = [
    "sudo apt-get update",
    "sudo apt-get --yes remove postgresql*",
    "sudo apt-get --yes install postgresql-11 postgresql-client-11",
    "sudo sed -i s/^#\\?port = [0-9]\\+/port = 5432/ /etc/postgresql/11/main/postgresql.conf",
    "sudo cp /etc/postgresql/9.6/main/pg_hba.conf /etc/postgresql/11/main/pg_hba.conf",
    "sudo service postgresql restart 11",
];

/// SQLite variants need no host setup, so nothing may be executed.
/// SQLite 变体不需要主机配置，因此不得执行任何命令。
#[tokio::test]
async fn test_sqlite_variant_is_a_no_op() {
    let executor = FakeExecutor::new();
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    provisioner.prepare(&sqlite(1, "3.7", "2.2")).await.unwrap();

    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_postgres_plan_runs_in_order() {
    let executor = FakeExecutor::new();
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap();

    assert_eq!(executor.command_lines(), FULL_PLAN);
}

/// A second PostgreSQL variant only restarts the already installed service.
/// 第二个 PostgreSQL 变体只会重启已安装的服务。
#[tokio::test]
async fn test_second_prepare_only_restarts_the_service() {
    let executor = FakeExecutor::new();
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap();
    provisioner.prepare(&sqlite(2, "3.7", "2.2")).await.unwrap();
    provisioner.prepare(&postgres(3, "3.8", "2.2")).await.unwrap();

    let lines = executor.command_lines();
    assert_eq!(lines.len(), FULL_PLAN.len() + 1);
    assert_eq!(lines.last().map(String::as_str), Some("sudo service postgresql restart 11"));
}

#[tokio::test]
async fn test_failed_install_stops_the_plan() {
    let executor = FakeExecutor::new().respond(
        "install postgresql-11",
        Scripted::fail(100, "E: Unable to locate package postgresql-11"),
    );
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    let err = provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap_err();
    match err {
        ProvisionError::StepFailed {
            step,
            exit_code,
            output,
        } => {
            assert_eq!(step, "install server");
            assert_eq!(exit_code, 100);
            assert_eq!(output, vec!["E: Unable to locate package postgresql-11"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(executor.calls().len(), 3);
    assert!(!executor.command_lines().iter().any(|l| l.contains("restart")));
}

/// After a failed installation the next variant retries the full plan.
/// 安装失败后，下一个变体会重新执行完整计划。
#[tokio::test]
async fn test_failed_install_is_retried_in_full() {
    let executor = FakeExecutor::new()
        .respond("install postgresql-11", Scripted::fail(100, "E: network"))
        .respond("install postgresql-11", Scripted::Exit(0, vec![]));
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    assert!(provisioner.prepare(&postgres(1, "3.7", "2.2")).await.is_err());
    provisioner.prepare(&postgres(2, "3.8", "2.2")).await.unwrap();

    let lines = executor.command_lines();
    assert_eq!(&lines[3..], FULL_PLAN);
}

#[tokio::test]
async fn test_removing_an_absent_server_is_tolerated() {
    let executor = FakeExecutor::new().respond(
        "remove postgresql*",
        Scripted::fail(100, "E: Unable to locate package postgresql*"),
    );
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap();

    assert_eq!(executor.command_lines(), FULL_PLAN);
}

#[tokio::test]
async fn test_missing_package_manager_is_a_spawn_error() {
    let executor = FakeExecutor::new().respond("apt-get update", Scripted::NotFound);
    let mut provisioner = PostgresProvisioner::new(executor.clone(), database_config());

    let err = provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Spawn { ref step, .. } if step == "refresh package index"));
}

#[tokio::test]
async fn test_plan_follows_database_settings() {
    let db = DatabaseConfig {
        server_version: "12".to_string(),
        port: 5433,
        service: "postgresql@12-main".to_string(),
        auth_template_version: Some("12".to_string()),
        use_sudo: false,
        refresh_package_index: false,
        ..DatabaseConfig::default()
    };
    let executor = FakeExecutor::new();
    let mut provisioner = PostgresProvisioner::new(executor.clone(), db);

    provisioner.prepare(&postgres(1, "3.7", "2.2")).await.unwrap();

    assert_eq!(
        executor.command_lines(),
        vec![
            "apt-get --yes remove postgresql*",
            "apt-get --yes install postgresql-12 postgresql-client-12",
            "sed -i s/^#\\?port = [0-9]\\+/port = 5433/ /etc/postgresql/12/main/postgresql.conf",
            "service postgresql@12-main restart 12",
        ]
    );
}

#[test]
fn test_full_plan_marks_only_removal_as_tolerant() {
    let provisioner = PostgresProvisioner::new(FakeExecutor::new(), database_config());
    let tolerant: Vec<_> = provisioner
        .full_plan()
        .into_iter()
        .filter(|step| step.tolerate_failure)
        .map(|step| step.name)
        .collect();
    assert_eq!(tolerant, vec!["remove existing server"]);
}
