use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use uuid::Uuid;

const ROLE_HEADER: &str = "x-ecoclear-role";
const ACTOR_HEADER: &str = "x-ecoclear-actor";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing identity; pass --role and --actor or set ECOCLEAR_ROLE / ECOCLEAR_ACTOR")]
    MissingIdentity,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("cannot read {path}: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "ecoclear-cli", about = "EcoClear marketplace API CLI")]
struct Cli {
    #[arg(long, env = "ECOCLEAR_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Dashboard role, e.g. CLIENT, DRIVER, DISPOSAL.
    #[arg(long, env = "ECOCLEAR_ROLE")]
    role: Option<String>,

    #[arg(long, env = "ECOCLEAR_ACTOR")]
    actor: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    role: Option<String>,
    actor: Option<Uuid>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Classify(ClassifyCommand),
    Copilot {
        message: String,
        #[arg(long)]
        context: Option<String>,
    },
    Orders(OrdersCommand),
    Dashboard,
}

#[derive(Args, Debug)]
struct ClassifyCommand {
    #[arg(value_enum)]
    kind: ClassifyKind,
    /// Image or video file to send.
    file: String,
    #[arg(long)]
    note: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ClassifyKind {
    Waste,
    Product,
}

#[derive(Args, Debug)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrdersSubcommand {
    List {
        /// all, mine, driver_pool, fleet_pool, fleet_dispatch, worker_hall, facility_queue
        #[arg(long, default_value = "all")]
        view: String,
        #[arg(long)]
        status: Option<String>,
    },
    Get {
        order_id: Uuid,
    },
    Create {
        file: String,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Confirm {
        order_id: Uuid,
    },
    Accept {
        order_id: Uuid,
    },
    Advance {
        order_id: Uuid,
        /// Target status, e.g. ARRIVED_PICKUP.
        to: String,
        #[arg(long)]
        loading_photo: Option<String>,
    },
    DisposalEntry {
        order_id: Uuid,
        #[arg(long)]
        entry_photo: String,
    },
    Manifest {
        order_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, role: cli.role, actor: cli.actor };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Classify(cmd) => run_classify(&ctx, cmd).await,
        Command::Copilot { message, context } => {
            let body = json!({ "message": message, "contextSummary": context });
            let json = api_request(&ctx, reqwest::Method::POST, "/api/copilot/chat", Some(body)).await?;
            print_json(&json)
        }
        Command::Orders(cmd) => run_orders(&ctx, cmd).await,
        Command::Dashboard => {
            let json = api_request(&ctx, reqwest::Method::GET, "/api/dashboard", None).await?;
            print_json(&json)
        }
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_classify(cli: &CliContext, cmd: ClassifyCommand) -> Result<(), CliError> {
    let media = read_data_url(&cmd.file)?;
    let (path, body) = match cmd.kind {
        ClassifyKind::Waste => ("/api/ai/waste", json!({ "media": media, "note": cmd.note })),
        ClassifyKind::Product => ("/api/ai/product", json!({ "image": media })),
    };
    let json = api_request(cli, reqwest::Method::POST, path, Some(body)).await?;
    print_json(&json)
}

async fn run_orders(cli: &CliContext, cmd: OrdersCommand) -> Result<(), CliError> {
    use reqwest::Method;

    let (method, path, body) = match cmd.command {
        OrdersSubcommand::List { view, status } => {
            let mut path = format!("/api/orders?view={view}");
            if let Some(status) = status {
                path.push_str(&format!("&status={status}"));
            }
            (Method::GET, path, None)
        }
        OrdersSubcommand::Get { order_id } => (Method::GET, format!("/api/orders/{order_id}"), None),
        OrdersSubcommand::Create { file, lat, lng, address, note } => {
            let body = json!({
                "media": read_data_url(&file)?,
                "note": note,
                "location": { "lat": lat, "lng": lng, "address": address },
            });
            (Method::POST, "/api/orders".to_owned(), Some(body))
        }
        OrdersSubcommand::Confirm { order_id } => (Method::POST, format!("/api/orders/{order_id}/confirm"), None),
        OrdersSubcommand::Accept { order_id } => (Method::POST, format!("/api/orders/{order_id}/accept"), None),
        OrdersSubcommand::Advance { order_id, to, loading_photo } => {
            let body = json!({ "to": to.to_ascii_uppercase(), "loadingPhoto": loading_photo });
            (Method::POST, format!("/api/orders/{order_id}/advance"), Some(body))
        }
        OrdersSubcommand::DisposalEntry { order_id, entry_photo } => {
            let body = json!({ "entryPhoto": entry_photo });
            (Method::POST, format!("/api/orders/{order_id}/disposal-entry"), Some(body))
        }
        OrdersSubcommand::Manifest { order_id } => (Method::GET, format!("/api/orders/{order_id}/manifest"), None),
    };

    let json = api_request(cli, method, &path, body).await?;
    print_json(&json)
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let (Some(role), Some(actor)) = (cli.role.as_deref(), cli.actor) else {
        return Err(CliError::MissingIdentity);
    };

    let mut headers = HeaderMap::new();
    headers.insert(ROLE_HEADER, HeaderValue::from_str(&role.to_ascii_uppercase())?);
    headers.insert(ACTOR_HEADER, HeaderValue::from_str(&actor.to_string())?);

    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let url = format!("{}{}", cli.base_url.trim_end_matches('/'), path);

    let request = client.request(method, &url);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), str::to_owned);
        return Err(CliError::ServerError { status: status.as_u16(), message });
    }

    Ok(value)
}

fn read_data_url(path: &str) -> Result<String, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })?;
    Ok(data_url(mime_for(path), &bytes))
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

fn mime_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "image/jpeg",
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
