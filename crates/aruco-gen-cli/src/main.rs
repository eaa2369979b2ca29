//! aruco-gen: generate printable ArUco markers and grid boards.

mod args;

use std::path::Path;
use std::process::ExitCode;

use aruco_gen_dict::{resolve_dictionary, Dictionary, DictionaryError, PredefinedDictionary};
use aruco_gen_print::{
    write_board, write_board_config, BoardConfigFile, GeneratedImage, GridBoard, GridBoardError,
    GridBoardSpec, MarkerWriter, PrintError, PrintIoError,
};
use clap::Parser;

use crate::args::{Cli, Mode};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Board(#[from] GridBoardError),
    #[error(transparent)]
    Print(#[from] PrintError),
    #[error(transparent)]
    PrintIo(#[from] PrintIoError),
    #[error("cannot create output directory {path}: {source}")]
    OutDir {
        path: String,
        source: std::io::Error,
    },
}

type CliResult<T> = Result<T, CliError>;

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        aruco_gen_core::init_tracing(cli.log_json, cli.log_level());
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = aruco_gen_core::init_with_level(cli.log_level());
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    // Reject unknown names before anything else, whatever the mode.
    let predefined: PredefinedDictionary = cli.dictionary.parse()?;

    if cli.printdict {
        print_dictionaries();
        return Ok(());
    }

    let Some(mode) = Mode::from_flag(cli.mode) else {
        println!("Invalid input. Please try again.");
        return Ok(());
    };
    log::debug!("mode {:?}, dictionary {}", mode, predefined);

    ensure_out_dir(&cli.out_dir)?;

    match mode {
        Mode::Single => run_single(cli, predefined),
        Mode::Bulk => run_bulk(cli, predefined),
        Mode::Board => {
            let spec = cli.board_spec()?;
            run_board(cli, predefined, spec)?;
            run_config_file(cli, predefined, &spec)
        }
        Mode::ConfigFile => run_config_file(cli, predefined, &cli.board_spec()?),
    }
}

fn ensure_out_dir(dir: &Path) -> CliResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| CliError::OutDir {
        path: dir.display().to_string(),
        source,
    })
}

fn load_dictionary(cli: &Cli, predefined: PredefinedDictionary) -> CliResult<Dictionary> {
    let dict = resolve_dictionary(predefined.name(), cli.dictionary_file.as_deref())?;
    log::debug!(
        "{}: {} markers of {}x{} bits",
        dict.name,
        dict.len(),
        dict.marker_size,
        dict.marker_size
    );
    Ok(dict)
}

fn report(image: &GeneratedImage) {
    log::info!("wrote {}", image.path.display());
    println!("Dimensions: {}", image.info);
}

// ── printdict ─────────────────────────────────────────────────────────

fn print_dictionaries() {
    println!("Available dictionaries:");
    for d in PredefinedDictionary::ALL {
        let source = if d.is_embedded() {
            "embedded"
        } else {
            "needs --dictionary-file"
        };
        println!(
            "  {:<20} {}x{} bits  {:>4} markers  {}",
            d.name(),
            d.marker_size(),
            d.marker_size(),
            d.marker_count(),
            source
        );
    }
}

// ── single / bulk ─────────────────────────────────────────────────────

fn marker_writer(cli: &Cli, predefined: PredefinedDictionary) -> CliResult<MarkerWriter> {
    let dict = load_dictionary(cli, predefined)?;
    Ok(MarkerWriter::new(
        dict,
        cli.size,
        cli.borderbits as usize,
        &cli.out_dir,
    ))
}

fn run_single(cli: &Cli, predefined: PredefinedDictionary) -> CliResult<()> {
    let writer = marker_writer(cli, predefined)?;
    let image = writer.write(cli.id)?;
    report(&image);
    Ok(())
}

fn run_bulk(cli: &Cli, predefined: PredefinedDictionary) -> CliResult<()> {
    let writer = marker_writer(cli, predefined)?;
    let images = writer.write_first(cli.count)?;
    for image in &images {
        report(image);
    }
    log::info!("generated {} markers", images.len());
    Ok(())
}

// ── board / config file ───────────────────────────────────────────────

fn run_board(cli: &Cli, predefined: PredefinedDictionary, spec: GridBoardSpec) -> CliResult<()> {
    let board = GridBoard::new(spec, load_dictionary(cli, predefined)?)?;
    let image = write_board(&board, &cli.out_dir)?;
    report(&image);
    Ok(())
}

fn run_config_file(
    cli: &Cli,
    predefined: PredefinedDictionary,
    spec: &GridBoardSpec,
) -> CliResult<()> {
    let config = BoardConfigFile::from_spec(predefined.name(), spec);
    let (path, back) = write_board_config(&config, &cli.out_dir, &cli.name)?;
    log::info!("wrote {}", path.display());
    log::debug!("{} reads back as {:?}", path.display(), back);
    Ok(())
}
