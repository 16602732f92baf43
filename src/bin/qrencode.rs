//! qrencode - encode text or bytes into a QR symbol
//!
//! Writes a PNG or JPEG image when an output file is given, otherwise prints
//! the symbol to the terminal.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::info;

use qrmatrix::cache::SymbolCache;
use qrmatrix::helper::{print_qr, save_image, save_text, RenderOptions};
use qrmatrix::{EncodeOptions, Mask, MaskStrategy, QrCode, QrCodeEcc};

fn build_cli() -> Command {
    Command::new("qrencode")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Encode input data in a QR symbol")
        .arg(
            Arg::new("payload")
                .help("Data to encode (read from standard input when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("level")
                .short('l')
                .long("level")
                .help("Error correction level: L, M, Q or H")
                .value_name("LEVEL")
                .default_value("L"),
        )
        .arg(
            Arg::new("symversion")
                .short('v')
                .long("symversion")
                .help("Symbol version 1-40 (0 picks the smallest that fits)")
                .value_name("NUMBER")
                .value_parser(value_parser!(u8))
                .default_value("0"),
        )
        .arg(
            Arg::new("mask")
                .short('m')
                .long("mask")
                .help("Use this mask pattern (0-7) instead of searching")
                .value_name("MASK")
                .value_parser(value_parser!(u8))
                .conflicts_with("random_masks"),
        )
        .arg(
            Arg::new("random_masks")
                .long("random-masks")
                .help("Score only N randomly chosen mask patterns")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("ignore_case")
                .short('i')
                .long("ignore-case")
                .help("Fold lowercase letters so they encode as alphanumerics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("eightbit")
                .short('8')
                .long("8bit")
                .help("Encode the whole input as one 8-bit segment")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .help("Pixels per module")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32))
                .default_value("4"),
        )
        .arg(
            Arg::new("margin")
                .long("margin")
                .help("Quiet zone width in modules")
                .value_name("MODULES")
                .value_parser(value_parser!(u32).range(0..=100))
                .default_value("4"),
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .help("JPEG quality (1-100)")
                .value_name("QUALITY")
                .value_parser(value_parser!(u8).range(1..=100))
                .default_value("85"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("File to write (.png, .jpg or .jpeg; rows of 0 and 1 with -t)")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .help("Print or write the symbol as rows of 0 and 1")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cache_dir")
                .long("cache-dir")
                .help("Reuse previously encoded symbols stored in this directory")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log_dir")
                .long("log-dir")
                .help("Write logs to DIR/qrencode.log instead of stderr")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn init_logging(log_dir: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = dir.join("qrencode.log");
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn encode_options(matches: &ArgMatches) -> Result<EncodeOptions> {
    let level: QrCodeEcc = matches
        .get_one::<String>("level")
        .map(String::as_str)
        .unwrap_or("L")
        .parse()?;
    let version = *matches.get_one::<u8>("symversion").unwrap_or(&0);

    let mask = if let Some(&m) = matches.get_one::<u8>("mask") {
        MaskStrategy::Fixed(Mask::try_from(m)?)
    } else if let Some(&n) = matches.get_one::<usize>("random_masks") {
        MaskStrategy::Random(n)
    } else {
        MaskStrategy::Best
    };

    Ok(EncodeOptions::default()
        .with_version(version)
        .with_level(level)
        .with_case_sensitive(!matches.get_flag("ignore_case"))
        .with_mask(mask))
}

fn read_payload(matches: &ArgMatches) -> Result<Vec<u8>> {
    if let Some(text) = matches.get_one::<String>("payload") {
        return Ok(text.as_bytes().to_vec());
    }
    let mut data = Vec::new();
    io::stdin()
        .read_to_end(&mut data)
        .context("Failed to read payload from standard input")?;
    if data.is_empty() {
        bail!("No input data");
    }
    Ok(data)
}

fn encode(data: &[u8], options: &EncodeOptions, eightbit: bool) -> qrmatrix::Result<QrCode> {
    if eightbit {
        QrCode::encode_binary(data, options)
    } else {
        QrCode::encode_segmented(data, options)
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_one::<PathBuf>("log_dir"))?;

    let options = encode_options(&matches)?;
    let payload = read_payload(&matches)?;
    let eightbit = matches.get_flag("eightbit");

    let qr = match matches.get_one::<PathBuf>("cache_dir") {
        Some(dir) => {
            // 8-bit and segmented encodings of one payload differ
            let dir = if eightbit { dir.join("8bit") } else { dir.clone() };
            let mut cache = SymbolCache::new(&dir)
                .with_context(|| format!("Failed to open cache directory {}", dir.display()))?;
            match cache.load(&payload, &options)? {
                Some(qr) => qr,
                None => {
                    let qr = encode(&payload, &options, eightbit)?;
                    cache.store(&payload, &options, &qr)?;
                    qr
                }
            }
        }
        None => encode(&payload, &options, eightbit)?,
    };
    info!(
        "Encoded {} bytes as version {} level {} mask {}",
        payload.len(),
        qr.version(),
        qr.error_correction_level(),
        qr.mask().value()
    );

    let render = RenderOptions {
        pixel_per_point: *matches.get_one::<u32>("size").unwrap_or(&4),
        outer_frame: *matches.get_one::<u32>("margin").unwrap_or(&4),
        jpeg_quality: *matches.get_one::<u8>("quality").unwrap_or(&85),
    };

    write_output(&qr, &matches, &render)
}

/// Writes the symbol to `-o` (rows of 0 and 1 with `-t`, otherwise an image)
/// or prints it.
fn write_output(qr: &QrCode, matches: &ArgMatches, render: &RenderOptions) -> Result<()> {
    let text = matches.get_flag("text");
    let Some(path) = matches.get_one::<PathBuf>("output") else {
        if text {
            print!("{qr}");
        } else {
            print_qr(qr, render.outer_frame as i32);
        }
        return Ok(());
    };
    if text {
        save_text(qr, path)
    } else {
        save_image(qr, render, path)
    }
    .with_context(|| format!("Failed to write {}", path.display()))
}
