use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Emit the tokens as a JSON array instead of one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },
}

/// Backing storage for a source file.  Empty files cannot be mapped.
enum SourceBuf {
    Mapped(Mmap),
    Empty,
}

impl SourceBuf {
    fn as_bytes(&self) -> &[u8] {
        match self {
            SourceBuf::Mapped(map) => &map[..],
            SourceBuf::Empty => &[],
        }
    }
}

/// Memory‑maps a source file.
fn read_file(filename: &Path) -> Result<SourceBuf> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename)
        .with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    if len == 0 {
        return Ok(SourceBuf::Empty);
    }

    // SAFETY: the mapping is read-only and lives only for this process run;
    // concurrent truncation of the source file is not supported.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", map.len(), filename);

    Ok(SourceBuf::Mapped(map))
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module and source line
    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Prints every diagnostic to stderr and exits with the code of the first.
fn report(errors: &[LoxError]) -> ! {
    for e in errors {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }

    let code = errors.first().map_or(65, LoxError::exit_code);

    debug!("Exiting with code {}", code);

    std::process::exit(code);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            let buf = read_file(&filename)?;
            let source = std::str::from_utf8(buf.as_bytes()).context("Source is not valid UTF-8")?;

            let mut tokens = Vec::new();
            let mut errors = Vec::new();

            for result in Scanner::new(source) {
                match result {
                    Ok(token) => {
                        if !json {
                            println!("{}", token);
                        }
                        tokens.push(token);
                    }

                    Err(e) => {
                        debug!("Tokenization debug: {}", e);
                        eprintln!("{}", e);
                        errors.push(e);
                    }
                }
            }

            if json {
                let stdout = io::stdout();
                serde_json::to_writer_pretty(stdout.lock(), &tokens)
                    .context("Failed to serialize tokens")?;
                println!();
            }

            if !errors.is_empty() {
                debug!("Tokenization failed, exiting with code 65");
                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");
            let buf = read_file(&filename)?;
            let source = std::str::from_utf8(buf.as_bytes()).context("Source is not valid UTF-8")?;

            let tokens = rox::scan(source).unwrap_or_else(|errors| report(&errors));

            match Parser::new(&tokens).parse_expression() {
                Ok(expr) => {
                    info!("Expression parsed successfully");
                    println!("{}", AstPrinter::print(&expr));
                }

                Err(errors) => report(&errors),
            }
        }

        Commands::Evaluate { filename } => {
            info!("Running Evaluate subcommand");
            let buf = read_file(&filename)?;
            let source = std::str::from_utf8(buf.as_bytes()).context("Source is not valid UTF-8")?;

            let tokens = rox::scan(source).unwrap_or_else(|errors| report(&errors));
            let expr = Parser::new(&tokens)
                .parse_expression()
                .unwrap_or_else(|errors| report(&errors));

            let mut interpreter = Interpreter::new();

            match interpreter.evaluate(&expr) {
                Ok(value) => println!("{}", value),
                Err(e) => report(&[e]),
            }

            info!("Evaluate subcommand completed");
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");
            let buf = read_file(&filename)?;
            let source = std::str::from_utf8(buf.as_bytes()).context("Source is not valid UTF-8")?;

            debug!("Provided input:\n {}", source);

            match rox::run_source(source, Box::new(io::stdout())) {
                Ok(()) => info!("Program executed successfully"),
                Err(errors) => report(&errors),
            }
        }
    }

    Ok(())
}
