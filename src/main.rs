use clap::{Parser, Subcommand};
use selector_bridge::{
    propagate, translate, BridgeConfig, BridgeError, ChromeBrowser, Locator, ScriptBridge,
    ScriptSession, SelectorLanguage,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "selector-bridge", about = "Translate locators and run scripts in Chrome")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the CSS selector for a locator such as "By.id: main"
    Css { locator: String },
    /// Print the XPath expression for a locator such as "By.linkText: Home"
    Xpath { locator: String },
    /// Load a page and run a named script resource in it
    Run {
        #[arg(long)]
        url: String,
        #[arg(long)]
        script: String,
        /// Inject the glue library first
        #[arg(long)]
        glue: bool,
        /// Script arguments; JSON values, or plain strings
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };

    match cli.command {
        Command::Css { locator } => print_translation(&locator, SelectorLanguage::Css),
        Command::Xpath { locator } => print_translation(&locator, SelectorLanguage::XPath),
        Command::Run {
            url,
            script,
            glue,
            args,
        } => run_script(&config, &url, &script, glue, &args).await,
    }
}

fn print_translation(locator: &str, language: SelectorLanguage) -> anyhow::Result<ExitCode> {
    let locator: Locator = locator.parse()?;
    match translate(&locator, language) {
        Some(selector) => {
            println!("{}", selector);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{} has no {} equivalent", locator, language);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn parse_argument(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn run_script(
    config: &BridgeConfig,
    url: &str,
    script_name: &str,
    glue: bool,
    raw_args: &[String],
) -> anyhow::Result<ExitCode> {
    let bridge = ScriptBridge::from_config(&config.scripts);
    let script = bridge.get_script_resource(script_name)?;
    let args: Vec<Value> = raw_args.iter().map(|raw| parse_argument(raw)).collect();

    let browser = ChromeBrowser::launch(&config.browser)?;
    let tab = browser.new_tab()?;
    info!("Navigating to {}", url);
    tab.navigate(url)?;
    info!("Loaded {}", tab.url());

    let session = ScriptSession::new(tab);
    if glue {
        bridge.inject_glue_lib(&session).await?;
    }

    let value = bridge
        .run_and_return(&session, &script, &args)
        .await
        .map_err(|e| match e {
            BridgeError::Remote(remote) => propagate(remote),
            other => other,
        })?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(ExitCode::SUCCESS)
}
