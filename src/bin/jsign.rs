//! Sign a PDF from the command line
//!
//! Usage:
//!   jsign <input.pdf> <keystore.p12> -o <output.pdf> [options]
//!
//! Options:
//!   -o, --output <path>        Where to write the signed PDF (required)
//!   -p, --password <pass>      Keystore passphrase
//!   --password-env <VAR>       Read the passphrase from an environment variable
//!   --options <file.json>      Signing options as JSON
//!   --timeout-ms <n>           Override the tool timeout
//!   -v, --verbose              Debug logging (otherwise RUST_LOG applies)

use jsign_oxide::{PdfSigner, SignOptions, SigningRequest};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "Usage: jsign <input.pdf> <keystore.p12> -o <output.pdf> \
[--password <pass> | --password-env <VAR>] [--options <file.json>] [--timeout-ms <n>] [--verbose]";

struct CliArgs {
    input: PathBuf,
    keystore: PathBuf,
    output: PathBuf,
    password: Option<String>,
    options: Option<PathBuf>,
    timeout_ms: Option<u64>,
    verbose: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut positional = Vec::new();
        let mut output = None;
        let mut password = None;
        let mut options = None;
        let mut timeout_ms = None;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-o" | "--output" => {
                    output = Some(PathBuf::from(value_of(args, &mut i)?));
                },
                "-p" | "--password" => {
                    password = Some(value_of(args, &mut i)?.to_string());
                },
                "--password-env" => {
                    let var = value_of(args, &mut i)?;
                    password = Some(
                        std::env::var(var)
                            .map_err(|_| format!("environment variable {} is not set", var))?,
                    );
                },
                "--options" => {
                    options = Some(PathBuf::from(value_of(args, &mut i)?));
                },
                "--timeout-ms" => {
                    let raw = value_of(args, &mut i)?;
                    timeout_ms = Some(
                        raw.parse::<u64>()
                            .map_err(|_| format!("invalid --timeout-ms value: {}", raw))?,
                    );
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                flag if flag.starts_with('-') => {
                    return Err(format!("unknown option: {}", flag));
                },
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        if positional.len() != 2 {
            return Err("expected <input.pdf> and <keystore.p12>".to_string());
        }
        let keystore = positional.pop().unwrap_or_default();
        let input = positional.pop().unwrap_or_default();

        Ok(Self {
            input,
            keystore,
            output: output.ok_or("missing --output")?,
            password,
            options,
            timeout_ms,
            verbose,
        })
    }
}

fn value_of<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn load_options(cli: &CliArgs) -> Result<Option<SignOptions>, String> {
    let mut options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            let parsed: SignOptions = serde_json::from_str(&json)
                .map_err(|e| format!("invalid options in {}: {}", path.display(), e))?;
            Some(parsed)
        },
        None => None,
    };

    if let Some(ms) = cli.timeout_ms {
        options = Some(
            options
                .unwrap_or_default()
                .with_timeout(Duration::from_millis(ms)),
        );
    }
    Ok(options)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("Error: {}\n{}", msg, USAGE);
            return ExitCode::from(2);
        },
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(2);
        },
    };

    let (document, credential) = match (fs::read(&cli.input), fs::read(&cli.keystore)) {
        (Ok(d), Ok(c)) => (d, c),
        (Err(e), _) => {
            eprintln!("Error: cannot read {}: {}", cli.input.display(), e);
            return ExitCode::from(2);
        },
        (_, Err(e)) => {
            eprintln!("Error: cannot read {}: {}", cli.keystore.display(), e);
            return ExitCode::from(2);
        },
    };

    let request = SigningRequest {
        document,
        credential,
        passphrase: cli.password.clone(),
        options,
    };

    match PdfSigner::from_env().sign(&request) {
        Ok(signed) => {
            if let Err(e) = fs::write(&cli.output, signed.as_bytes()) {
                eprintln!("Error: cannot write {}: {}", cli.output.display(), e);
                return ExitCode::from(1);
            }
            println!(
                "Signed {} -> {} ({} bytes)",
                cli.input.display(),
                cli.output.display(),
                signed.len()
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        },
    }
}
