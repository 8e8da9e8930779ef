//! auto-check CLI
//!
//! Validates one value the way an attached `<auto-check>` element would and
//! prints every notification it dispatches.

use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use autocheck::{AutoCheckElement, CheckDetail, CheckEventKind, CheckOptions, CheckState};
use autocheck_dom::{EventTarget, InputElement, InputType, ValidationConstraints};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: autocheck <value> [--name NAME] [--type TYPE] [--required] \
[--pattern REGEX] [--minlength N] [--maxlength N] [--endpoint URL] [--base URL] \
[--message-spec TEXT] [--debounce-ms N]";

/// Give up on a remote check after this long
const DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Args {
    value: String,
    name: String,
    input_type: InputType,
    required: bool,
    pattern: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    endpoint: Option<String>,
    base_url: Option<String>,
    message_spec: Option<String>,
    debounce_ms: Option<u64>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        name: "value".to_string(),
        ..Default::default()
    };
    let mut value = None;
    let mut argv = std::env::args().skip(1);

    while let Some(arg) = argv.next() {
        let mut next = |flag: &str| argv.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--name" => args.name = next("--name")?,
            "--type" => args.input_type = InputType::parse(&next("--type")?),
            "--required" => args.required = true,
            "--pattern" => args.pattern = Some(next("--pattern")?),
            "--minlength" => args.min_length = Some(next("--minlength")?.parse()?),
            "--maxlength" => args.max_length = Some(next("--maxlength")?.parse()?),
            "--endpoint" => args.endpoint = Some(next("--endpoint")?),
            "--base" => args.base_url = Some(next("--base")?),
            "--message-spec" => args.message_spec = Some(next("--message-spec")?),
            "--debounce-ms" => args.debounce_ms = Some(next("--debounce-ms")?.parse()?),
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown flag {other}\n{USAGE}"),
            other => {
                if value.replace(other.to_string()).is_some() {
                    bail!("only one value can be checked\n{USAGE}");
                }
            }
        }
    }

    args.value = value.with_context(|| USAGE.to_string())?;
    Ok(args)
}

fn describe(detail: &CheckDetail) -> String {
    match detail {
        CheckDetail::None => String::new(),
        CheckDetail::Message(message) => format!("message={message:?}"),
        CheckDetail::Response(response) => format!(
            "status={} body={:?}",
            response.status(),
            response.text().unwrap_or_default()
        ),
        CheckDetail::Request(request) => format!("{} {}", request.init.method.as_str(), request.url),
        CheckDetail::NetworkError(error) => format!("error={error}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let mut constraints = ValidationConstraints::new(args.input_type)
        .required(args.required)
        .length(args.min_length, args.max_length);
    if let Some(pattern) = &args.pattern {
        constraints = constraints.pattern(pattern)?;
    }
    let input = InputElement::new(&args.name)
        .with_constraints(constraints)
        .with_value(&args.value)
        .into_shared();

    let mut options = CheckOptions::default();
    if let Some(debounce_ms) = args.debounce_ms {
        options.debounce_ms = debounce_ms;
    }

    let document = Arc::new(EventTarget::new());
    let mut builder = AutoCheckElement::builder()
        .input(input)
        .parent(Arc::clone(&document))
        .options(options);
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(endpoint) = &args.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(spec) = &args.message_spec {
        builder = builder.message_spec(spec);
    }
    let element = builder.build()?;

    let (tx, rx) = mpsc::channel();
    for kind in CheckEventKind::ALL {
        let tx = tx.clone();
        document.add_event_listener(kind.name(), move |event| {
            let _ = tx.send((kind, event.detail.clone()));
        });
    }

    tracing::info!(value = %args.value, endpoint = ?element.endpoint(), "validating");
    element.attach();
    element.dispatch_input();

    let started = Instant::now();
    let mut valid = true;
    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok((kind, detail)) => {
                println!("{:<28} {}", kind.name(), describe(&detail));
                if matches!(kind, CheckEventKind::Error | CheckEventKind::NetworkError) {
                    valid = false;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if element.state() == CheckState::Idle {
                    break;
                }
                if started.elapsed() > DEADLINE {
                    bail!("remote check did not finish within {DEADLINE:?}");
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    element.detach();
    if !valid {
        std::process::exit(1);
    }
    Ok(())
}
