use anyhow::Context;
use tokio::sync::watch;

use weekly_scores::{WeeklyScoreAggregator, WeeklyScoreReport};
use weekly_scores::config::RunConfig;
use weekly_scores::middleware::LoggingStore;
use weekly_scores::refresh::{Clock, FixedClock, LocalClock, run_weekly_refresh};
use wellness_store::auth::{FirebaseAuth, Session};
use wellness_store::config::{Credentials, StoreConfig};
use wellness_store::firestore::FirestoreStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `WEEKLY_SCORES_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("WEEKLY_SCORES_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    // Keep HTTP internals quiet by default
    let combined_filter = format!("{},hyper=warn,reqwest=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("weekly_scores: log filter: {}", log_env);

    let store_config = StoreConfig::from_env()?;
    let run_config = RunConfig::from_env()?;

    let session = match store_config.credentials {
        Credentials::Password { email, password } => {
            let api_key = store_config
                .api_key
                .clone()
                .context("WELLNESS_FIREBASE_API_KEY missing")?;
            FirebaseAuth::new(&store_config.auth_base_url, api_key)
                .sign_in_with_password(&email, &password)
                .await
                .context("sign-in failed")?
        }
        Credentials::Token { user_id, id_token } => Session::new(user_id, id_token),
    };

    let store = FirestoreStore::new(
        &store_config.firestore_base_url,
        store_config.project_id,
        session.id_token.clone(),
    );
    let aggregator = WeeklyScoreAggregator::new(LoggingStore::new(store));
    let clock: Box<dyn Clock> = match run_config.reference_date {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(LocalClock),
    };

    if !run_config.watch {
        let report = aggregator
            .compute_for_current_user(&session, clock.today())
            .await?;
        for item in report.progress_items() {
            tracing::info!(label = item.label.as_str(), value = ?item.value, score = ?item.score, "weekly_scores: metric");
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    tracing::info!(
        period_secs = run_config.refresh_period.as_secs(),
        "weekly_scores: watching for new weeks"
    );
    let (report_tx, mut report_rx) = watch::channel(WeeklyScoreReport::default());
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        while report_rx.changed().await.is_ok() {
            let report = report_rx.borrow_and_update().clone();
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "weekly_scores: could not encode report"),
            }
        }
    });
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("weekly_scores: shutting down");
        }
        let _ = cancel_tx.send(true);
    });

    run_weekly_refresh(
        &aggregator,
        &session,
        clock.as_ref(),
        run_config.refresh_period,
        &report_tx,
        cancel_rx,
    )
    .await;

    Ok(())
}
