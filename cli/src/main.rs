use std::error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::result;

use log::{Level, LevelFilter, Metadata, Record};

use snappy_fox::{decompress, Config};

const ABOUT: &str = "
snappy-fox decompresses the Snappy format variant used in Firefox's
on-disk HTTP cache (its \"morgue cache\").

It reads a framed Snappy stream by default; -u/--unframed treats the
input as a single bare block instead. Either <input> or <output> may be
\"-\" to use the standard input/output stream.
";

type Result<T> = result::Result<T, Error>;
type Error = Box<dyn error::Error + Send + Sync>;

macro_rules! fail {
    ($($tt:tt)*) => {
        return Err(From::from(format!($($tt)*)));
    }
}

macro_rules! errln {
    ($($tt:tt)*) => { let _ = writeln!(&mut std::io::stderr(), $($tt)*); }
}

/// A minimal stderr logger with a fixed level filter.
///
/// There are no environment variables here, so this deliberately skips
/// `env_logger`'s `RUST_LOG` parsing in favor of one hardcoded filter.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            errln!("snappy-fox: {}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn install_logger() {
    static LOGGER: StderrLogger = StderrLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Warn);
}

fn main() {
    install_logger();
    if let Err(err) = try_main() {
        errln!("{}", err);
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse()?;
    let mut input = args.open_input()?;
    let mut output = args.open_output()?;
    let n = decompress(&mut input, &mut output, &args.config)?;
    output.flush()?;
    log::debug!("snappy-fox: wrote {} bytes", n);
    Ok(())
}

struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Config,
}

impl Args {
    fn parse() -> Result<Args> {
        use clap::{crate_authors, crate_version, App, Arg};

        let matches = App::new("snappy-fox")
            .about(ABOUT)
            .author(crate_authors!())
            .version(crate_version!())
            .version_short("v")
            .max_term_width(100)
            .arg(Arg::with_name("input").required(true).help(
                "The input path, or \"-\" for standard input.",
            ))
            .arg(Arg::with_name("output").required(true).help(
                "The output path, or \"-\" for standard output.",
            ))
            .arg(
                Arg::with_name("consider_crc_errors")
                    .long("consider_crc_errors")
                    .short("C")
                    .help("Promote a checksum mismatch to a fatal error."),
            )
            .arg(
                Arg::with_name("ignore_offset_errors")
                    .long("ignore_offset_errors")
                    .short("E")
                    .takes_value(true)
                    .min_values(0)
                    .max_values(1)
                    .value_name("BYTE")
                    .help(
                        "Substitute a dummy byte for invalid copy offsets \
                         instead of failing. BYTE (a C-syntax integer \
                         literal) overrides the substituted value.",
                    ),
            )
            .arg(
                Arg::with_name("ignore_magic")
                    .long("ignore_magic")
                    .short("M")
                    .help("Accept a stream identifier chunk whose payload doesn't match."),
            )
            .arg(
                Arg::with_name("read_offset")
                    .long("read_offset")
                    .short("O")
                    .takes_value(true)
                    .value_name("N")
                    .help("Skip N bytes of input before parsing begins."),
            )
            .arg(
                Arg::with_name("firefox")
                    .long("firefox")
                    .short("f")
                    .help("Use the non-inverting CRC finalization."),
            )
            .arg(
                Arg::with_name("unframed")
                    .long("unframed")
                    .short("u")
                    .help("Treat the input as a single bare block, with no framing."),
            )
            .get_matches();

        let mut config = Config::default();
        config.consider_crc_errors = matches.is_present("consider_crc_errors");
        config.ignore_magic = matches.is_present("ignore_magic");
        config.firefox_crc = matches.is_present("firefox");
        config.unframed_stream = matches.is_present("unframed");

        if matches.is_present("ignore_offset_errors") {
            config.ignore_offset_errors = true;
            if let Some(byte) = matches.value_of("ignore_offset_errors") {
                let value = parse_c_int(byte)
                    .map_err(|e| format!("invalid --ignore_offset_errors value: {}", e))?;
                if value > 0xff {
                    fail!("--ignore_offset_errors value {} does not fit in a byte", value);
                }
                config.offset_dummy_byte = value as u8;
            }
        }
        if let Some(raw) = matches.value_of("read_offset") {
            config.read_offset = parse_c_int(raw)
                .map_err(|e| format!("invalid --read_offset value: {}", e))?;
        }

        Ok(Args {
            input: PathBuf::from(matches.value_of_os("input").unwrap()),
            output: PathBuf::from(matches.value_of_os("output").unwrap()),
            config,
        })
    }

    fn open_input(&self) -> Result<Box<dyn io::Read>> {
        if self.input == PathBuf::from("-") {
            Ok(Box::new(io::stdin()))
        } else {
            Ok(Box::new(io::BufReader::new(File::open(&self.input)?)))
        }
    }

    fn open_output(&self) -> Result<Box<dyn io::Write>> {
        if self.output == PathBuf::from("-") {
            Ok(Box::new(io::stdout()))
        } else {
            Ok(Box::new(io::BufWriter::new(File::create(&self.output)?)))
        }
    }
}

/// Parses a C-syntax integer literal: `0x`/`0X` hex, a leading `0` octal,
/// otherwise decimal, the argument syntax expected for `-E`/`-O`.
fn parse_c_int(s: &str) -> result::Result<u64, String> {
    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (16, hex)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };
    u64::from_str_radix(digits, radix).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        assert_eq!(parse_c_int("0x1F"), Ok(31));
    }

    #[test]
    fn parses_octal() {
        assert_eq!(parse_c_int("017"), Ok(15));
    }

    #[test]
    fn parses_decimal() {
        assert_eq!(parse_c_int("42"), Ok(42));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_c_int("not_a_number").is_err());
    }
}
