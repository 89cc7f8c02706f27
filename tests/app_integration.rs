use coinfolio::core::TokenCatalog;
use coinfolio::core::snapshot;
use coinfolio::store::Ledger;
use coinfolio::{AppCommand, WatchlistAction, run_command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Adds automatic logging to test
mod test_utils {
    use super::*;

    pub struct TestEnv {
        pub dir: TempDir,
        pub config_path: PathBuf,
    }

    impl TestEnv {
        pub fn config(&self) -> Option<&str> {
            self.config_path.to_str()
        }

        pub fn database_path(&self) -> PathBuf {
            self.dir.path().join("data").join("portfolio.db")
        }
    }

    /// Writes a config that points every price source at `server`.
    pub fn create_env(server: &MockServer) -> TestEnv {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
price_sources: [coingecko, cryptocompare, livecoinwatch, coincap]
data_path: "{data}"
providers:
  coingecko:
    base_url: "{uri}"
  cryptocompare:
    base_url: "{uri}"
    api_key: "test-key"
  livecoinwatch:
    base_url: "{uri}"
  coincap:
    base_url: "{uri}"
tokens:
  - name: "Brett"
    symbol: "BRETT"
    id: "based-brett"
"#,
            data = dir.path().join("data").display(),
            uri = server.uri()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        TestEnv { dir, config_path }
    }

    pub async fn mount_coingecko(server: &MockServer, id: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", id))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_cryptocompare(server: &MockServer, symbol: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/data/price"))
            .and(query_param("fsym", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn open_ledger(path: &Path) -> Ledger {
        Ledger::open(path).await.expect("Failed to open ledger")
    }
}

#[test_log::test(tokio::test)]
async fn test_add_uses_first_source_and_accumulates() {
    let server = MockServer::start().await;
    test_utils::mount_coingecko(&server, "dogecoin", 200, r#"{"dogecoin":{"usd":0.2}}"#).await;
    let env = test_utils::create_env(&server);

    for quantity in [100.0, 50.0] {
        let result = run_command(
            AppCommand::Add {
                token: "Dogecoin".to_string(),
                quantity,
            },
            env.config(),
        )
        .await;
        assert!(result.is_ok(), "Add failed with: {:?}", result.err());
    }

    let ledger = test_utils::open_ledger(&env.database_path()).await;
    let holding = ledger.holding("DOGE").await.unwrap().expect("holding");
    info!(?holding, "Stored holding");
    assert_eq!(holding.quantity, 150.0);
    assert!((holding.value - 30.0).abs() < 1e-9);

    let transactions = ledger.transactions(Some("DOGE")).await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].quantity, 100.0);
    assert_eq!(transactions[1].quantity, 50.0);
}

#[test_log::test(tokio::test)]
async fn test_add_falls_back_when_first_source_fails() {
    let server = MockServer::start().await;
    test_utils::mount_coingecko(&server, "shiba-inu", 500, "").await;
    test_utils::mount_cryptocompare(&server, "SHIB", r#"{"USD":0.00001}"#).await;
    let env = test_utils::create_env(&server);

    let result = run_command(
        AppCommand::Add {
            token: "SHIB".to_string(),
            quantity: 1_000_000.0,
        },
        env.config(),
    )
    .await;
    assert!(result.is_ok(), "Add failed with: {:?}", result.err());

    let ledger = test_utils::open_ledger(&env.database_path()).await;
    let tx = &ledger.transactions(None).await.unwrap()[0];
    assert_eq!(tx.price, 0.00001);
    assert!((tx.total_value - 10.0).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_add_with_coincap_as_last_resort_for_custom_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/assets/based-brett"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data":{"priceUsd":"0.05"}}"#),
        )
        .mount(&server)
        .await;
    let env = test_utils::create_env(&server);

    let result = run_command(
        AppCommand::Add {
            token: "brett".to_string(),
            quantity: 20.0,
        },
        env.config(),
    )
    .await;
    assert!(result.is_ok(), "Add failed with: {:?}", result.err());

    let ledger = test_utils::open_ledger(&env.database_path()).await;
    let holding = ledger.holding("BRETT").await.unwrap().expect("holding");
    assert!((holding.value - 1.0).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_add_fails_when_every_source_fails() {
    let server = MockServer::start().await;
    let env = test_utils::create_env(&server);

    let result = run_command(
        AppCommand::Add {
            token: "BONK".to_string(),
            quantity: 5.0,
        },
        env.config(),
    )
    .await;

    let err = result.expect_err("add should fail without prices");
    assert!(err.to_string().starts_with("All price sources failed for BONK"));

    let ledger = test_utils::open_ledger(&env.database_path()).await;
    assert!(ledger.holdings().await.unwrap().is_empty());
    assert!(ledger.transactions(None).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_reporting_and_watchlist_commands() {
    let server = MockServer::start().await;
    test_utils::mount_coingecko(&server, "bonk", 200, r#"{"bonk":{"usd":0.00002}}"#).await;
    let env = test_utils::create_env(&server);
    let config = env.config();

    let commands = vec![
        AppCommand::Summary { live: false },
        AppCommand::Add {
            token: "bonk".to_string(),
            quantity: 1_000_000.0,
        },
        AppCommand::Summary { live: true },
        AppCommand::History { token: None },
        AppCommand::History {
            token: Some("BONK".to_string()),
        },
        AppCommand::Price {
            token: "BONK".to_string(),
        },
        AppCommand::Watchlist(WatchlistAction::Add("bonk".to_string())),
        AppCommand::Watchlist(WatchlistAction::Add("Dogecoin".to_string())),
        AppCommand::Watchlist(WatchlistAction::List),
        AppCommand::Watchlist(WatchlistAction::Remove("DOGE".to_string())),
        AppCommand::Tokens,
        AppCommand::ClearCache,
    ];

    for command in commands {
        let result = run_command(command.clone(), config).await;
        assert!(
            result.is_ok(),
            "{:?} failed with: {:?}",
            command,
            result.err()
        );
    }

    let ledger = test_utils::open_ledger(&env.database_path()).await;
    assert_eq!(ledger.watchlist().await.unwrap(), vec!["BONK"]);
    assert_eq!(ledger.holdings().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_export_and_import_round_trip() {
    let server = MockServer::start().await;
    test_utils::mount_coingecko(&server, "dogecoin", 200, r#"{"dogecoin":{"usd":0.1}}"#).await;
    let source_env = test_utils::create_env(&server);
    let target_env = test_utils::create_env(&server);
    let export_path = source_env.dir.path().join("portfolio.json");

    run_command(
        AppCommand::Add {
            token: "DOGE".to_string(),
            quantity: 42.0,
        },
        source_env.config(),
    )
    .await
    .expect("add");
    run_command(
        AppCommand::Export {
            path: export_path.clone(),
        },
        source_env.config(),
    )
    .await
    .expect("export");

    let exported =
        snapshot::read_snapshot(&export_path, &TokenCatalog::builtin()).expect("snapshot");
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].token, "DOGE");

    run_command(
        AppCommand::Import { path: export_path },
        target_env.config(),
    )
    .await
    .expect("import");

    let ledger = test_utils::open_ledger(&target_env.database_path()).await;
    assert_eq!(ledger.holdings().await.unwrap(), exported);
}

#[test_log::test(tokio::test)]
async fn test_missing_config_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    let result = run_command(AppCommand::Tokens, missing.to_str()).await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .starts_with("Failed to read config file")
    );
}
