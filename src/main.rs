//! `packet-decoder` command-line tool.
//!
//! Reads a file of hexadecimal transmissions (one per line), decodes each into a
//! packet tree and prints the version-number sum and the expression value.
//!
//! # Usage
//!
//! ```bash
//! packet-decoder input.txt
//! packet-decoder input.txt --tree --dump tree.json
//! PACKET_DECODER_MAX_DEPTH=16 packet-decoder input.txt -vv
//! ```

use bytes::BytesMut;
use clap::{ArgAction, Parser};
use packet_decoder::config::DecoderConfig;
use packet_decoder::core::codec::TransmissionCodec;
use packet_decoder::core::packet::Packet;
use packet_decoder::core::serialization::{MultiFormat, SerializationFormat};
use packet_decoder::error::{DecodeError, Result};
use packet_decoder::eval::{solve, Evaluation};
use packet_decoder::utils::logging::init_logging;
use packet_decoder::utils::metrics::{Metrics, Timer};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::codec::Decoder;
use tracing::{error, info, Level};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding hexadecimal transmissions, one per line
    input: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum packet nesting depth (overrides config and PACKET_DECODER_MAX_DEPTH)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Accept sub-packets that overrun their parent's declared bit length
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Print each decoded packet tree before its answers
    #[arg(long, default_value_t = false)]
    tree: bool,

    /// Write the decoded packet trees to this file
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Format for --dump: json, bincode or msgpack
    #[arg(long)]
    format: Option<SerializationFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<DecoderConfig> {
    let mut config = match &args.config {
        Some(path) => DecoderConfig::from_file(path)?,
        None => DecoderConfig::default(),
    };
    config.apply_env()?;

    if let Some(depth) = args.max_depth {
        config.decoder.max_depth = depth;
    }
    if args.lenient {
        config.decoder.strict_length = false;
    }
    if args.tree {
        config.output.print_tree = true;
    }
    if let Some(format) = args.format {
        config.output.dump_format = format;
    }
    config.logging.log_level = match args.verbose {
        0 => config.logging.log_level,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    config.validate_strict()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    init_logging(&config.logging)?;

    let metrics = Metrics::new();
    let _timer = Timer::start("decode_file");

    let contents = std::fs::read(&args.input)?;
    info!(path = %args.input.display(), bytes = contents.len(), "Read input");

    let mut buf = BytesMut::from(contents.as_slice());
    let mut codec = TransmissionCodec::new(config.decoder).with_metrics(&metrics);
    let mut results: Vec<(Packet, Evaluation)> = Vec::new();

    // Nothing reaches stdout until every transmission has decoded and evaluated.
    loop {
        let next = codec.decode_eof(&mut buf).inspect_err(|e| {
            error!(line = codec.current_line(), error = %e, "Rejected transmission");
        })?;
        let Some(transmission) = next else {
            break;
        };

        let packet = transmission.decoded.packet;
        let evaluation = solve(&packet);
        metrics.evaluation(evaluation.is_ok());
        let evaluation = evaluation.inspect_err(|e| {
            error!(line = transmission.line, error = %e, "Evaluation failed");
        })?;
        results.push((packet, evaluation));
    }

    if results.is_empty() {
        return Err(DecodeError::MalformedPacket(
            "Input holds no transmission".to_string(),
        ));
    }

    let mut out = std::io::stdout().lock();
    for (packet, evaluation) in &results {
        if config.output.print_tree {
            write!(out, "{}", packet.display_tree())?;
        }
        writeln!(
            out,
            "Part 1(Sum of version numbers): {}",
            evaluation.version_sum
        )?;
        writeln!(out, "Part 2(Expression value)      : {}", evaluation.value)?;
    }
    out.flush()?;

    let trees: Vec<Packet> = results.into_iter().map(|(packet, _)| packet).collect();

    if let Some(path) = &args.dump {
        let bytes = trees.serialize_format(config.output.dump_format)?;
        std::fs::write(path, bytes)?;
        info!(
            path = %path.display(),
            format = %config.output.dump_format,
            trees = trees.len(),
            "Dumped packet trees"
        );
    }

    metrics.log_metrics();
    Ok(())
}
