use anyhow::Context;
use groundwork::cli::commands::{load_config, CommandContext, IndexArgs};
use groundwork::cli::init::{self, InitConfig, InitResult};
use groundwork::cli::output::Output;
use groundwork::cli::{Cli, Commands};
use groundwork::utils::toml_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let command = match cli.command {
        Commands::Init {
            path,
            force,
            provider,
        } => {
            return match init::run(
                InitConfig {
                    path,
                    force,
                    provider,
                },
                output,
            ) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            };
        }
        other => other,
    };

    let config = load_config(&cli.config, output)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging, cli.verbose);

    let context = CommandContext::new(
        config,
        Output {
            colored: output.colored,
        },
    );

    match command {
        Commands::Init { .. } => Ok(()),
        Commands::Index {
            inputs,
            out,
            backend,
            no_split,
            language,
        } => context
            .index(IndexArgs {
                inputs,
                out,
                backend,
                no_split,
                language,
            })
            .await
            .context("Indexing failed"),
        Commands::Search { query, index, k } => context
            .search(&query, index, k)
            .await
            .context("Search failed"),
        Commands::Ask {
            question,
            index,
            mode,
        } => context
            .ask(&question, index, mode)
            .await
            .context("Question failed"),
        Commands::Chat { index, mode } => context.chat(index, mode).await.context("Chat failed"),
        Commands::Inspect { index } => context.inspect(index).await.context("Inspect failed"),
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
