use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use backdrop::api;
use backdrop::models::AppConfig;
use backdrop::rendering::{decode_png, label_color, pick_color};
use backdrop::server;
use backdrop::services::{BackdropService, BackgroundOutcome, BackgroundPreset, PresetList};

#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Backdrop - dominant-color backgrounds for standalone images")]
struct Cli {
    /// Configuration file (defaults to $CONFIG_FILE)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print the dominant color of a PNG image
    Analyze {
        /// PNG file to analyse
        file: PathBuf,
    },
    /// Print the color at a point of a PNG image
    Pick {
        /// PNG file to read
        file: PathBuf,

        /// Column
        #[arg(short)]
        x: u32,

        /// Row
        #[arg(short)]
        y: u32,
    },
    /// List background presets
    Presets,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backdrop API",
        description = "Dominant-color and preset backgrounds for standalone images",
        version = "0.4.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_analyze,
        api::handle_pick,
        api::handle_presets,
        api::handle_select_preset,
    ),
    components(schemas(
        api::AnalyzeResponse,
        api::PickResponse,
        api::PresetEntry,
        api::PresetsResponse,
        api::SelectPresetRequest,
    )),
    tags(
        (name = "Analysis", description = "Dominant color and color picking"),
        (name = "Presets", description = "Background presets")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));

    match cli.command {
        Some(Commands::Serve) => run_server(config_path.as_deref()).await,
        Some(Commands::Analyze { file }) => {
            init_cli_logging();
            run_analyze_command(config_path.as_deref(), &file).await
        }
        Some(Commands::Pick { file, x, y }) => {
            init_cli_logging();
            run_pick_command(&file, x, y)
        }
        Some(Commands::Presets) => {
            init_cli_logging();
            run_presets_command(config_path.as_deref());
            Ok(())
        }
        None => {
            run_status_command(config_path.as_deref());
            Ok(())
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backdrop=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

async fn run_analyze_command(config_path: Option<&Path>, file: &Path) -> anyhow::Result<()> {
    let config = Arc::new(AppConfig::load(config_path));
    let bytes = std::fs::read(file)?;

    let service = BackdropService::new(config)?;
    let (correlation_id, outcome) = service.analyze_png(&bytes).await?;

    match outcome {
        BackgroundOutcome::Applied(color) => {
            tracing::info!(file = %file.display(), %correlation_id, %color, "Analyzed image");
            println!("{color}");
            Ok(())
        }
        BackgroundOutcome::TimedOut => anyhow::bail!(
            "No result within {} ms",
            service.config().result_timeout_ms
        ),
        other => anyhow::bail!("Analysis did not complete: {other:?}"),
    }
}

fn run_pick_command(file: &Path, x: u32, y: u32) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let bitmap = decode_png(&bytes)?;
    let color = pick_color(&bitmap, x, y).ok_or_else(|| {
        anyhow::anyhow!(
            "Point {x},{y} is outside the {}x{} image",
            bitmap.width(),
            bitmap.height()
        )
    })?;

    println!("{color} (label: {})", label_color(color));
    Ok(())
}

fn run_presets_command(config_path: Option<&Path>) {
    let config = AppConfig::load(config_path);
    let presets = PresetList::from_config(&config.presets);
    print_presets(&presets);
}

fn print_presets(presets: &PresetList) {
    for (index, preset) in presets.presets().iter().enumerate() {
        let marker = if index == presets.selected_index() {
            "*"
        } else {
            " "
        };
        let value = match preset {
            BackgroundPreset::Css(css) => css.as_str(),
            BackgroundPreset::DominantColor => "(dominant color)",
        };
        println!("{marker} {index:>2}  {value}");
    }
}

/// Show configuration and available commands
fn run_status_command(config_path: Option<&Path>) {
    let config = AppConfig::load(config_path);

    println!("Backdrop v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "Config:        {}",
        config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );
    println!("Bind address:  {}", config.bind_addr);
    println!("Timeout:       {} ms", config.result_timeout_ms);
    println!("Max dimension: {} px", config.sampler.max_dimension);
    println!(
        "Clustering:    threshold {}, strides {}/{}",
        config.clustering.threshold, config.clustering.long_stride, config.clustering.short_stride
    );
    println!();
    println!("Presets:");
    print_presets(&PresetList::from_config(&config.presets));
    println!();
    println!("Commands:");
    println!("  backdrop serve            Start the HTTP server");
    println!("  backdrop analyze <PNG>    Print the dominant color");
    println!("  backdrop pick <PNG> -x -y Print the color at a point");
    println!("  backdrop presets          List background presets");
}

async fn run_server(config_path: Option<&Path>) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backdrop=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::load(config_path));
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| config.bind_addr.clone());

    let state = server::create_app_state(config)?;

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Backdrop server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
