use clap::{Parser, Subcommand};
use log::{error, info};
use mapsheet::{DocumentTicketStore, MapPrinter, PrintConfig, PrintError};
use mapsheet_resource::{FilesystemLayerSource, TempFileStorage};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Print maps into PDF documents", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a request straight to a PDF file
    Print {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Print a request through the ticket store and redeem the ticket
    Create {
        #[command(flatten)]
        request: RequestArgs,
        /// Directory for temporary documents (system temp dir by default)
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },
    /// Show what a client may ask for
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    /// Print configuration (JSON)
    #[arg(short, long)]
    config: PathBuf,
    /// Print request (JSON)
    #[arg(short, long)]
    spec: PathBuf,
    /// Directory with one image per layer
    #[arg(short, long, default_value = ".")]
    layers: PathBuf,
    #[arg(short, long, default_value = "map.pdf")]
    output: PathBuf,
}

impl RequestArgs {
    fn printer(&self) -> Result<MapPrinter, PrintError> {
        let config = PrintConfig::from_file(&self.config)?;
        MapPrinter::new(config, Arc::new(FilesystemLayerSource::new(&self.layers)))
    }

    fn spec(&self) -> Result<String, PrintError> {
        Ok(fs::read_to_string(&self.spec)?)
    }
}

fn output(path: &Path) -> Result<BufWriter<File>, PrintError> {
    Ok(BufWriter::new(File::create(path)?))
}

fn run(args: Args) -> Result<(), PrintError> {
    match args.command {
        Command::Print { request } => {
            let printer = request.printer()?;
            let spec = request.spec()?;
            // Build in memory so a failed print leaves no partial file behind
            let mut buffer = Vec::new();
            printer.print_json(&spec, &mut buffer)?;
            let mut out = output(&request.output)?;
            out.write_all(&buffer)?;
            out.flush()?;
            info!("Wrote {}", request.output.display());
        }
        Command::Create { request, temp_dir } => {
            let storage = match temp_dir {
                Some(dir) => TempFileStorage::new(dir),
                None => TempFileStorage::system(),
            };
            let store = DocumentTicketStore::new(Arc::new(request.printer()?), Arc::new(storage));
            let id = store.create_async(&request.spec()?)?;
            println!("{}", id);
            let mut out = output(&request.output)?;
            let written = store.fetch(&id, &mut out)?;
            out.flush()?;
            info!("Wrote {} bytes to {}", written, request.output.display());
        }
        Command::Info { config } => {
            let printer = MapPrinter::new(
                PrintConfig::from_file(&config)?,
                Arc::new(FilesystemLayerSource::new(".")),
            )?;
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, &printer.client_info())?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("mapsheet=info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
