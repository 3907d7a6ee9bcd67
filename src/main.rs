use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::config::retry::RetryConfig;
use aws_sdk_bedrockruntime::config::timeout::TimeoutConfig;
use clap::Parser;
use course_forge::adapters::bedrock::InferenceParams;
use course_forge::app::{build_router, AppState};
use course_forge::config::{ServiceConfig, StorageKind};
use course_forge::domain::ports::Storage;
use course_forge::utils::error::{CourseError, ErrorSeverity};
use course_forge::utils::{logger, validation::Validate};
use course_forge::{
    BedrockGenerator, CliArgs, ContentGenerator, CourseEngine, CourseGateway, LocalStorage,
    S3Storage, StorageBackend, VideoCurator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("Starting course-forge");

    // 載入並驗證配置
    let config = match args.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_on_startup_error(e),
    };
    tracing::info!("✅ Configuration validation passed");
    if args.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws.region.clone()))
        .load()
        .await;

    // 重試由 ContentGenerator 負責，SDK 端關閉
    let bedrock_config = aws_sdk_bedrockruntime::config::Builder::from(&sdk_config)
        .retry_config(RetryConfig::disabled())
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_secs(config.generation.timeout_seconds))
                .build(),
        )
        .build();
    let bedrock = BedrockGenerator::new(
        aws_sdk_bedrockruntime::Client::from_conf(bedrock_config),
        InferenceParams::from(&config.generation),
    );

    let generator = ContentGenerator::new(
        Arc::new(bedrock),
        config.generation.retry_policy(),
        config.generation.models.clone(),
    );
    let curator = VideoCurator::new(config.youtube.clone(), config.ranking.clone())
        .context("failed to build YouTube client")?;
    let engine = CourseEngine::new(generator, curator);

    let storage = build_storage(&config, &sdk_config);
    tracing::info!(
        "📦 Storage backend: {}",
        storage.location(&format!("{}/", config.storage.folder))
    );
    let gateway = CourseGateway::new(storage, config.storage.folder.clone());

    let state = AppState::new(engine, gateway, config.request_timeout());
    let router = build_router(state, &config.server.allowed_origins);

    let addr = config.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    tracing::info!("👋 course-forge stopped");
    Ok(())
}

fn build_storage(config: &ServiceConfig, sdk_config: &aws_config::SdkConfig) -> StorageBackend {
    match config.storage.backend {
        StorageKind::S3 => {
            let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
                .force_path_style(config.aws.s3_force_path_style)
                .build();
            StorageBackend::S3(S3Storage::new(
                aws_sdk_s3::Client::from_conf(s3_config),
                config.storage.bucket.clone(),
            ))
        }
        StorageKind::Local => {
            StorageBackend::Local(LocalStorage::new(config.storage.local_path.clone()))
        }
    }
}

fn exit_on_startup_error(e: CourseError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received, draining connections");
}
