use clap::Parser;
use geodb_sync::utils::error::ErrorSeverity;
use geodb_sync::utils::logger::{init_logger, LogFormat};
use geodb_sync::utils::validation::Validate;
use geodb_sync::{
    CliArgs, CountrySync, GeoDbProvider, InMemoryCountryRepo, InMemoryCurrencyRepo, LocalStorage,
    SyncContext, SyncError, SyncReport, SyncSnapshot,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let format = LogFormat::from_flag(args.json_logs || config.json_logging());
    if let Err(e) = init_logger(format, args.verbose || config.verbose_logging()) {
        eprintln!("⚠️  {}", e);
    }

    tracing::info!("Starting geodb-sync");
    tracing::debug!(
        base_url = %config.geodb.base_url,
        endpoint = %config.geodb.country_endpoint,
        page_limit = config.geodb.page_limit,
        rate_limit_sleep = ?config.geodb.rate_limit_sleep,
        "Loaded configuration"
    );

    if let Err(e) = config.validate().and_then(|_| args.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let ctx = match args.timeout_secs {
        Some(secs) => SyncContext::with_timeout(Duration::from_secs(secs)),
        None => SyncContext::new(),
    };

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling sync");
            interrupt.cancel();
        }
    });

    let currency_repo = Arc::new(InMemoryCurrencyRepo::new());
    let country_repo = Arc::new(InMemoryCountryRepo::new());
    let provider = Arc::new(GeoDbProvider::new(&config.geodb, currency_repo.clone())?);
    let sync = CountrySync::new(provider, currency_repo, country_repo.clone());

    if args.count_only {
        match sync.status(&ctx).await {
            Ok(status) => {
                println!("🌍 Remote countries: {}", status.remote_total);
                println!("💾 Local countries:  {}", status.local_total);
                return Ok(());
            }
            Err(e) => exit_with(&e),
        }
    }

    let (report, failure) = match sync.run(&ctx).await {
        Ok(report) => (report, None),
        Err(failure) => (failure.report, Some(failure.source)),
    };
    print_report(&report);

    if let Some(dir) = &args.output_path {
        let storage = LocalStorage::new(dir.clone());
        let snapshot = SyncSnapshot::new(report, failure.is_none(), country_repo.all().await);
        if let Err(e) = snapshot.write_to(&storage, "countries.json").await {
            exit_with(&e);
        }
        println!("📁 Output saved to: {}", storage.full_path("countries.json").display());
    }

    match failure {
        None => {
            tracing::info!("✅ Country sync completed successfully");
            Ok(())
        }
        Some(e) => exit_with(&e),
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "✅ Synced {} countries ({} fetched over {} pages, {} skipped, {} placeholder currencies)",
        report.saved, report.fetched, report.pages, report.skipped, report.placeholders
    );
    if report.failed_saves > 0 {
        println!("⚠️  {} countries could not be saved", report.failed_saves);
    }
}

fn exit_with(e: &SyncError) -> ! {
    tracing::error!(
        "❌ Country sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 130,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
