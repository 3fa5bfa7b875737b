//! qb-solver: exam portal answer assistant
//!
//! Drives a visible browser over the exam page, extracts each question,
//! asks the configured LLM for the answer, and reports it to the operator,
//! who selects the answer and advances the page by hand between cycles.
//!
//! Usage:
//!   qb-solver            - Run an answer session
//!   qb-solver --help     - Show help
//!   qb-solver --version  - Show version

mod report;

use std::path::Path;

use qb_browser::{BrowserConfig, BrowserSession, TabSnapshot};
use qb_core::{ChatClient, Config, QuestionExtractor, SessionRunner, SessionSettings};
use tracing_subscriber::EnvFilter;

use report::{RunReporter, StdinCheckpoint};

/// Run mode
enum RunMode {
    /// Run an answer session
    Run,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("qb-solver {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Run => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting qb-solver...");
    tracing::info!("Model: {}", config.llm.model);
    tracing::info!("Expected questions: {}", config.session.total_questions);

    let client = ChatClient::new(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    run_session(config, client).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Run
}

/// Print help message
fn print_help() {
    println!("qb-solver - exam portal answer assistant");
    println!();
    println!("Usage:");
    println!("  qb-solver            Run an answer session");
    println!("  qb-solver --help     Show this help message");
    println!("  qb-solver --version  Show version");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY          API key (required)");
    println!("  LLM_MODEL            Model name (default: glm-4.6)");
    println!("  LLM_PROVIDER         Provider: openai or claude (default: openai)");
    println!("  LLM_BASE_URL         Custom API endpoint");
    println!("  LLM_TEMPERATURE      Sampling temperature (default: 0.1)");
    println!("  LLM_MAX_TOKENS       Output token cap (default: 5)");
    println!("  TOTAL_QUESTIONS      Questions expected in the run (default: 1)");
    println!("  BROWSER_HEADLESS     Launch the browser headless (default: false)");
    println!("  BROWSER_DEBUG_WS_URL Attach to a running Chrome debug endpoint");
    println!();
    println!("Settings can also be placed in quizbench.toml; ${{VAR}} values");
    println!("inside the file are expanded from the environment.");
}

/// Run one answer session over the active browser tab
async fn run_session(config: Config, client: ChatClient) -> anyhow::Result<()> {
    let browser_config = {
        let mut builder = BrowserConfig::builder().headless(config.browser.headless);
        if let Some(url) = &config.browser.debug_ws_url {
            builder = builder.debug_ws_url(url);
        }
        builder.build()
    };

    let browser = BrowserSession::connect_or_launch(browser_config)
        .map_err(|e| anyhow::anyhow!("Failed to open browser: {}", e))?;

    // Screenshot of the page at run start; non-fatal if it fails
    let screenshot_path = Path::new(&config.output.screenshot_path);
    if let Err(e) = browser.screenshot_to_file(screenshot_path) {
        tracing::warn!("Screenshot failed: {}", e);
    } else {
        println!("考试页面截图已保存: {}", screenshot_path.display());
    }

    // Missing snapshot capability is the one fatal precondition of a run
    let tab = browser
        .active_tab()
        .map_err(|e| anyhow::anyhow!("No usable exam page: {}", e))?;
    let snapshot = TabSnapshot::new(tab);

    let mut checkpoint = StdinCheckpoint;
    let mut reporter = RunReporter::new(
        Path::new(&config.output.content_path),
        Path::new(&config.output.answers_path),
        config.session.preview_chars,
    )
    .map_err(|e| anyhow::anyhow!("Failed to open run logs: {}", e))?;

    let mut runner = SessionRunner::new(
        &snapshot,
        QuestionExtractor::binary(),
        &client,
        &mut checkpoint,
        &mut reporter,
        SessionSettings::from(&config.session),
    );

    let session = runner
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Session aborted: {}", e))?;

    println!(
        "自动答题完成，共处理 {} 道题目（识别出答案 {} 道）",
        session.answered_count(),
        session.resolved_count()
    );
    println!("结果已保存到:");
    println!("  - {} (题目内容)", config.output.content_path);
    println!("  - {} (题目和答案)", config.output.answers_path);

    // An attached browser survives this process; the operator keeps
    // working in it
    tracing::info!("Session finished, releasing browser");

    Ok(())
}
