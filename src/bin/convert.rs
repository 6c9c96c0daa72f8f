//! Terminal front-end: convert one file (or stdin) and print the result
//!
//! Usage:
//!   cargo run --bin convert -- --from python --to rust main.py
//!   cat main.py | cargo run --bin convert -- --from py --to go --copy
//!   cargo run --bin convert -- --list script
//!
//! Language names may be abbreviated as long as they match a single
//! catalog entry ("rus" -> Rust). Ctrl-C aborts an in-flight request.
//!
//! On X11/Wayland the copied text is served by this process, so `--copy`
//! keeps running after printing the result until Ctrl-C is pressed.
//!
//! Required environment variables:
//! - ANTHROPIC_API_KEY
//!
//! Optional:
//! - ANTHROPIC_API_URL, ANTHROPIC_MODEL, MAX_TOKENS, REQUEST_TIMEOUT_SECS,
//!   CONVERT_MAX_ATTEMPTS

use anyhow::{bail, Context, Result};
use codeverter::{
    clipboard::{SystemClipboard, SELECTION_OWNED_BY_PROCESS},
    config::Config,
    controller::ConversionController,
    languages::{LanguageCatalog, LanguagePicker},
    translation::TranslationService,
};
use futures::future::AbortHandle;
use std::io::Read;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    from: Option<String>,
    to: Option<String>,
    copy: bool,
    list: Option<String>,
    file: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--from" => parsed.from = Some(iter.next().context("--from needs a language")?.clone()),
            "--to" => parsed.to = Some(iter.next().context("--to needs a language")?.clone()),
            "--copy" => parsed.copy = true,
            "--list" => parsed.list = Some(iter.next().cloned().unwrap_or_default()),
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            file => {
                if parsed.file.is_some() {
                    bail!("Only one input file can be given");
                }
                parsed.file = Some(file.to_string());
            }
        }
    }

    Ok(parsed)
}

/// Pick a catalog language the way the dropdown would: exact name first,
/// otherwise the only entry matching the typed query.
fn pick_language(catalog: &LanguageCatalog, typed: &str) -> Result<String> {
    let mut picker = LanguagePicker::new(catalog, "");

    if let Some(exact) = catalog.resolve(typed) {
        picker.select(exact);
        return Ok(picker.value().to_string());
    }

    picker.set_query(typed.trim());
    match picker.options().as_slice() {
        [only] => {
            let only = only.to_string();
            picker.select(only);
            Ok(picker.value().to_string())
        }
        [] => bail!("No languages found matching '{}'", typed),
        many => bail!("'{}' is ambiguous: {}", typed, many.join(", ")),
    }
}

fn read_source(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path)),
        None => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read stdin")?;
            Ok(code)
        }
    }
}

fn log_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("codeverter=warn".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it reaches the filter
    dotenvy::dotenv().ok();

    // Initialize logging (stderr, so stdout carries only the converted code)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter()?)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;
    let catalog = LanguageCatalog::get();

    if let Some(query) = &args.list {
        for name in catalog.filter(query) {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut controller = ConversionController::new();
    if let Some(from) = &args.from {
        controller.set_source_language(pick_language(catalog, from)?);
    }
    if let Some(to) = &args.to {
        controller.set_target_language(pick_language(catalog, to)?);
    }
    controller.set_source_code(read_source(args.file.as_deref())?);

    let config = Config::from_env()?;
    let service = TranslationService::new(&config)?;

    let (abort, registration) = AbortHandle::new_pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.abort();
        }
    });

    info!(
        "Converting {} -> {} with {}",
        controller.source_language(),
        controller.target_language(),
        service.model()
    );

    let outcome = controller.convert_abortable(&service, registration).await;
    interrupt.abort();

    if outcome.is_err() {
        eprintln!("{}", controller.error().unwrap_or("Conversion failed"));
        std::process::exit(1);
    }

    println!("{}", controller.converted_code());

    if args.copy {
        let mut clipboard = SystemClipboard::new();
        if !controller.copy(&mut clipboard) {
            warn!("Converted code was not copied to the clipboard");
            return Ok(());
        }

        eprintln!("{}", copied_notice(SELECTION_OWNED_BY_PROCESS));
        if SELECTION_OWNED_BY_PROCESS {
            tokio::signal::ctrl_c()
                .await
                .context("Failed to wait for Ctrl-C")?;
        }
        drop(clipboard);
    }

    Ok(())
}

fn copied_notice(held_by_process: bool) -> &'static str {
    if held_by_process {
        "Copied! Press Ctrl-C to exit (the clipboard empties when this process stops)"
    } else {
        "Copied!"
    }
}
