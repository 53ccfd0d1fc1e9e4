use anyhow::Context;
use cart_export::config::SourceType;
use cart_export::core::{CartSource, DocumentRenderer, Pipeline, Storage};
use cart_export::utils::error::{ErrorSeverity, ExportError};
use cart_export::utils::{logger, validation::Validate};
use cart_export::{
    CliArgs, ExportConfig, ExportEngine, LocalStorage, ShoppingCartPipeline, UserIdentity,
};
use clap::Parser;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入 TOML 配置
    let mut config = match ExportConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting cart-export");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 字型等資源在這裡載入，失敗即終止
    let renderer = match config.build_renderer() {
        Ok(renderer) => renderer,
        Err(e) => exit_with(e),
    };

    let storage = LocalStorage::new(config.output.path.clone());

    let result = match config.source.r#type {
        SourceType::Api => match config.build_http_source() {
            Ok(source) => {
                // 一律以 token 擁有者的身分匯出
                match source.resolve_user(args.user.as_deref()).await {
                    Ok(user) => export(source, renderer, &config, &user, &storage, args.dry_run).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        },
        SourceType::Snapshot => match (config.build_snapshot_store(), &args.user) {
            (Ok(store), Some(username)) => {
                let user = UserIdentity::new(username.clone());
                export(store, renderer, &config, &user, &storage, args.dry_run).await
            }
            (Ok(_), None) => Err(ExportError::MissingConfigError {
                field: "--user".to_string(),
            }),
            (Err(e), _) => Err(e),
        },
    };

    match result {
        Ok(Outcome::Written(path)) => {
            tracing::info!("✅ Shopping cart exported successfully!");
            println!("✅ Shopping cart exported successfully!");
            println!("📁 Output saved to: {}", path);
        }
        Ok(Outcome::Printed(listing)) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(listing.as_bytes())
                .context("failed to print shopping list")?;
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

enum Outcome {
    Written(String),
    Printed(String),
}

async fn export<S: CartSource>(
    source: S,
    renderer: Box<dyn DocumentRenderer>,
    config: &ExportConfig,
    user: &UserIdentity,
    storage: &LocalStorage,
    dry_run: bool,
) -> cart_export::Result<Outcome> {
    let pipeline = ShoppingCartPipeline::new(source, renderer)
        .with_filename_suffix(config.export.filename_suffix.clone());
    let engine = ExportEngine::new(pipeline);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let lines = engine.pipeline().extract(user).await?;
        let report = engine.pipeline().transform(lines).await?;
        let listing = cart_export::core::layout::report_lines(&report, &config.document).join("\n");
        return Ok(Outcome::Printed(format!("{}\n", listing)));
    }

    let attachment = engine.run(user).await?;
    tracing::debug!("Content-Disposition: {}", attachment.content_disposition());

    let path = storage
        .write_file(&attachment.filename, &attachment.body)
        .await?;

    Ok(Outcome::Written(path.display().to_string()))
}

fn exit_with(e: ExportError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
