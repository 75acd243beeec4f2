use std::{io, path::PathBuf};

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use libmbio::{
    format::{format_from_path, formats, lookup},
    time::from_datetime,
    ControlParams,
};
use swathr::{
    describe_format, insert_comments, list_navigation, parse_bounds, parse_time, resolve_format,
    summarize,
};
use tracing::{info, Level};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 2;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Record selection shared by the reading commands
#[derive(Args)]
struct Control {
    /// Format id, inferred from the filename suffix when omitted
    #[arg(short = 'F', long)]
    format: Option<i32>,

    /// Geographic bounds as west/east/south/north
    #[arg(short = 'R', long, value_parser = parse_bounds, allow_hyphen_values = true)]
    bounds: Option<[f64; 4]>,

    /// Start of the time window (UTC)
    #[arg(short, long, value_parser = parse_time)]
    begin: Option<NaiveDateTime>,

    /// End of the time window (UTC)
    #[arg(short, long, value_parser = parse_time)]
    end: Option<NaiveDateTime>,

    /// Longitude range: -1 for [-360, 0], 0 for [-180, 180], 1 for [0, 360]
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    lonflip: i8,

    /// Minimum speed in km/hr
    #[arg(short = 'S', long, default_value_t = 0.0)]
    speedmin: f64,

    /// Largest time gap in minutes
    #[arg(short = 'T', long, default_value_t = 1.0)]
    timegap: f64,

    /// Number of pings to average
    #[arg(short = 'p', long, default_value_t = 1)]
    pings: usize,
}

impl Control {
    fn params(&self) -> ControlParams {
        ControlParams::builder()
            .lonflip(self.lonflip)
            .maybe_bounds(self.bounds)
            .maybe_btime(self.begin.map(from_datetime))
            .maybe_etime(self.end.map(from_datetime))
            .speedmin(self.speedmin)
            .timegap(self.timegap)
            .pings(self.pings)
            .build()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// lists the registered formats, or describes the format of an id or file
    Formats {
        /// A format id or a filename
        target: Option<String>,
    },

    /// summarizes a swath file
    Info {
        /// The swath file
        file: PathBuf,

        #[command(flatten)]
        control: Control,
    },

    /// prints one navigation line per ping
    List {
        /// The swath file
        file: PathBuf,

        #[command(flatten)]
        control: Control,
    },

    /// copies an XSE file, writing comments ahead of its records
    Comment {
        /// The XSE file
        file: PathBuf,

        /// Comment text, repeat for several comments
        #[arg(short, long, required = true)]
        text: Vec<String>,

        /// The output file name
        #[arg(short, long)]
        output: PathBuf,

        /// Format id, inferred from the filename suffix when omitted
        #[arg(short = 'F', long)]
        format: Option<i32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Formats { target: None } => {
            for info in formats() {
                println!("{}", describe_format(info));
            }
        }
        Commands::Formats {
            target: Some(target),
        } => {
            let id = match target.parse::<i32>() {
                Ok(id) => id,
                Err(_) => format_from_path(&target)?,
            };
            println!("{}", describe_format(lookup(id)?));
        }
        Commands::Info { file, control } => {
            let format = resolve_format(control.format, &file)?;
            info!("summarizing {} as format {format}", file.display());
            let summary = summarize(&file, format, control.params())?;
            print!("{summary}");
        }
        Commands::List { file, control } => {
            let format = resolve_format(control.format, &file)?;
            let mut stdout = io::stdout().lock();
            list_navigation(&file, format, control.params(), &mut stdout)?;
        }
        Commands::Comment {
            file,
            text,
            output,
            format,
        } => {
            let format = resolve_format(format, &file)?;
            insert_comments(&file, &output, format, &text)?;
        }
    }
    Ok(())
}
