//! prequal-engine CLI
//!
//! Run pre-qualification calculations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Calculate locally from a JSON request
//! prequal-engine calculate --input request.json
//!
//! # Output as JSON
//! prequal-engine calculate --input request.json --format json
//!
//! # Run the calculation service
//! prequal-engine serve --addr 127.0.0.1:8001
//!
//! # Submit to a running service and save the certificate
//! prequal-engine submit --input request.json --certificate ./certs
//! ```

use chrono::{NaiveDate, Utc};
use prequal_engine::client::http::HttpCalculationClient;
use prequal_engine::client::Prequalifier;
use prequal_engine::config::Config;
use prequal_engine::core::certificate::CertificateStamp;
use prequal_engine::core::request::{CalculationRequest, CalculationRequestWire};
use prequal_engine::engine::calculator::Calculator;
use prequal_engine::service;
use std::fs;
use std::path::PathBuf;
use std::process;

fn print_usage() {
    eprintln!(
        r#"prequal-engine: mortgage pre-qualification certificates

USAGE:
    prequal-engine <COMMAND> [OPTIONS]

COMMANDS:
    calculate   Compute a pre-qualification locally
    serve       Run the calculation service
    submit      Send a request to a calculation service
    help        Show this message

OPTIONS (calculate):
    --input <FILE>          Path to JSON request file
    --format <FORMAT>       Output format: text (default) or json
    --issue-date <DATE>     Issue date YYYY-MM-DD (default: today, UTC)

OPTIONS (serve):
    --addr <HOST:PORT>      Listen address (default: PREQUAL_BIND_ADDR or 127.0.0.1:8001)

OPTIONS (submit):
    --input <FILE>          Path to JSON request file
    --url <URL>             Service root (default: PREQUAL_SERVICE_URL)
    --certificate <DIR>     Also download the certificate into DIR

ENVIRONMENT:
    PREQUAL_BIND_ADDR, PREQUAL_SERVICE_URL, PREQUAL_REQUEST_TIMEOUT_SECS,
    PREQUAL_API_TOKEN, PREQUAL_LOG (read from .env when present)

EXAMPLES:
    prequal-engine calculate --input request.json
    prequal-engine calculate --input request.json --format json --issue-date 2025-06-01
    prequal-engine serve --addr 0.0.0.0:8001
    prequal-engine submit --input request.json --url http://127.0.0.1:8001 --certificate ."#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Value following a flag, or exit.
fn flag_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

/// Output format for `calculate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_format(raw: &str) -> Option<OutputFormat> {
    match raw {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

fn load_request(path: &str) -> CalculationRequest {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));

    let wire: CalculationRequestWire = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "calculation_type": "PAYMENT",
  "applicant": {{ "name": "Jane Doe", "email": "jane@example.com" }},
  "currency": "TTD",
  "validity_days": 90,
  "payment_input": {{
    "principal_amount": "250000",
    "annual_interest_rate": "0.045",
    "term_years": 20,
    "stress_rate_bps": 200
  }}
}}"#
        );
        process::exit(1);
    });

    CalculationRequest::try_from(wire).unwrap_or_else(|e| fail(format!("invalid request: {}", e)))
}

fn cmd_calculate(args: &[String]) {
    let mut input_path = None;
    let mut format = OutputFormat::Text;
    let mut issue_date = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(flag_value(args, i, "--input", "a file path"));
            }
            "--format" => {
                i += 1;
                let raw = flag_value(args, i, "--format", "'text' or 'json'");
                format = parse_format(&raw).unwrap_or_else(|| {
                    fail(format!("unknown format '{}': expected 'text' or 'json'", raw))
                });
            }
            "--issue-date" => {
                i += 1;
                let raw = flag_value(args, i, "--issue-date", "a date YYYY-MM-DD");
                issue_date = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .unwrap_or_else(|e| fail(format!("invalid date '{}': {}", raw, e))),
                );
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let request = load_request(&path);
    let issue_date = issue_date.unwrap_or_else(|| Utc::now().date_naive());
    let result = Calculator::calculate(&request, CertificateStamp::issue(issue_date, request.validity()))
        .unwrap_or_else(|e| fail(format!("calculation failed: {}", e)));

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| fail(format!("serializing result: {}", e)));
            println!("{}", json);
        }
        OutputFormat::Text => println!("{}", result),
    }
}

async fn cmd_serve(args: &[String], config: &Config) {
    let mut addr = config.bind_addr.to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" => {
                i += 1;
                addr = flag_value(args, i, "--addr", "HOST:PORT");
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    if let Err(e) = service::run(&addr).await {
        fail(e);
    }
}

async fn cmd_submit(args: &[String], config: &Config) {
    let mut input_path = None;
    let mut url = config.service_url.clone();
    let mut certificate_dir: Option<PathBuf> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(flag_value(args, i, "--input", "a file path"));
            }
            "--url" => {
                i += 1;
                url = flag_value(args, i, "--url", "a service URL");
            }
            "--certificate" => {
                i += 1;
                certificate_dir = Some(PathBuf::from(flag_value(
                    args,
                    i,
                    "--certificate",
                    "a directory",
                )));
            }
            _ => fail(format!("unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let request = load_request(&path);

    let client = HttpCalculationClient::new(url, config.request_timeout).unwrap_or_else(|e| fail(e));
    let prequalifier = Prequalifier::new(client);
    let credential = config.credential.as_ref();

    let result = prequalifier
        .submit(&request, credential)
        .await
        .unwrap_or_else(|e| fail(e));
    println!("{}", result);

    if let Some(dir) = certificate_dir {
        let document = prequalifier
            .download_certificate(&result, credential)
            .await
            .unwrap_or_else(|e| fail(e));
        let target = dir.join(&document.file_name);
        fs::write(&target, &document.bytes)
            .unwrap_or_else(|e| fail(format!("writing '{}': {}", target.display(), e)));
        eprintln!("Certificate saved → {}", target.display());
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let config = Config::from_env().unwrap_or_else(|e| fail(e));
    if let Err(e) = config.init_logging() {
        eprintln!("Warning: {}", e);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "calculate" => cmd_calculate(rest),
        "serve" => cmd_serve(rest, &config).await,
        "submit" => cmd_submit(rest, &config).await,
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
