mod config;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use smartcat_contracts::payload::{parse_chat_messages, VisionPayload};
use smartcat_contracts::sampling::{ReasoningEffort, SamplingParams};
use smartcat_engine::transport::{HttpTransport, HttpTransportConfig};
use smartcat_engine::{Outcome, Relay, RelayOptions};

use crate::config::{EnvSource, ProcessEnv, TimeoutPolicy};

#[derive(Debug, Parser)]
#[command(
    name = "smartcat-relay",
    version,
    about = "Relay vision and chat requests to a local OpenAI-compatible server"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read `{imageBase64, prompt, language, mimeType}` from stdin.
    Vision(VisionArgs),
    /// Read a JSON array of chat messages from stdin.
    Chat(ChatArgs),
}

#[derive(Debug, Args)]
struct ServerArgs {
    /// Model identifier registered with the server.
    #[arg(long)]
    model: String,
    #[arg(long)]
    base_url: Option<String>,
    /// Optional bearer token.
    #[arg(long)]
    api_key: Option<String>,
    /// Request timeout in seconds (0 to disable).
    #[arg(long)]
    timeout: Option<f64>,
    /// Append a JSONL diagnostic trail to this file.
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct VisionArgs {
    #[command(flatten)]
    server: ServerArgs,
    #[arg(long, alias = "max_tokens")]
    max_tokens: Option<i64>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    top_p: Option<f64>,
    /// Longest image side sent to the server.
    #[arg(long)]
    max_image_side: Option<i64>,
    /// Print the composed completion instead of the rendered verdict.
    #[arg(long)]
    raw: bool,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[command(flatten)]
    server: ServerArgs,
    #[arg(long, alias = "max_tokens")]
    max_tokens: Option<i64>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    top_p: Option<f64>,
    #[arg(long)]
    top_k: Option<i64>,
    #[arg(long)]
    min_p: Option<f64>,
    #[arg(long, conflicts_with = "disable_thinking")]
    enable_thinking: bool,
    #[arg(long)]
    disable_thinking: bool,
    #[arg(long)]
    reasoning_effort: Option<ReasoningEffort>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("smartcat-relay error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let env = ProcessEnv;
    match cli.command {
        Command::Vision(args) => run_vision(args, &env),
        Command::Chat(args) => run_chat(args, &env),
    }
}

fn run_vision(args: VisionArgs, env: &dyn EnvSource) -> Result<i32> {
    let payload = VisionPayload::parse(&read_stdin()?)?;
    let mut options = RelayOptions::new(args.server.model.trim());
    options.sampling = SamplingParams {
        max_tokens: args
            .max_tokens
            .or_else(|| config::env_int(env, "LOCAL_VISION_MAX_TOKENS")),
        temperature: args
            .temperature
            .or_else(|| config::env_float(env, "LOCAL_VISION_TEMPERATURE")),
        top_p: args
            .top_p
            .or_else(|| config::env_float(env, "LOCAL_VISION_TOP_P")),
        ..SamplingParams::default()
    };
    options.max_image_side = config::resolve_max_image_side(args.max_image_side, env);
    options.raw_output = args.raw;

    let relay = build_relay(
        args.server,
        env,
        config::VISION_BASE_URL_ENV,
        config::VISION_API_KEY_ENV,
        config::VISION_TIMEOUT,
        options,
    )?;
    emit(relay.run_vision(&payload)?)
}

fn run_chat(args: ChatArgs, env: &dyn EnvSource) -> Result<i32> {
    let messages: Vec<Value> = parse_chat_messages(&read_stdin()?)?;
    let mut options = RelayOptions::new(args.server.model.trim());
    options.sampling = SamplingParams {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        top_p: args.top_p,
        top_k: args.top_k,
        min_p: args.min_p,
        enable_thinking: thinking_switch(args.enable_thinking, args.disable_thinking),
        reasoning_effort: args.reasoning_effort,
    };

    let relay = build_relay(
        args.server,
        env,
        config::CHAT_BASE_URL_ENV,
        config::CHAT_API_KEY_ENV,
        config::CHAT_TIMEOUT,
        options,
    )?;
    emit(relay.run_chat(messages)?)
}

fn build_relay(
    server: ServerArgs,
    env: &dyn EnvSource,
    base_url_keys: &[&str],
    api_key_keys: &[&str],
    timeout: TimeoutPolicy,
    options: RelayOptions,
) -> Result<Relay> {
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: config::resolve_base_url(server.base_url, env, base_url_keys),
        api_key: config::resolve_string(server.api_key, env, api_key_keys),
        timeout: config::resolve_timeout(server.timeout, env, timeout)?,
        debug_raw: config::env_flag(env, config::DEBUG_RAW_ENV),
    })?;
    log::debug!(
        "relay endpoint={} model={}",
        transport.endpoint(),
        options.model
    );
    let relay = Relay::new(Box::new(transport), options);
    Ok(match server.events {
        Some(path) => relay.with_events(path),
        None => relay,
    })
}

fn thinking_switch(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn read_stdin() -> Result<String> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read stdin")?;
    Ok(raw)
}

/// Completed answers and quality refusals both go to stdout with status 0.
fn emit(outcome: Outcome) -> Result<i32> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", outcome.text().trim()).context("failed to write stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(0)
}
