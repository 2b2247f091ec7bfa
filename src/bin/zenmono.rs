use std::process::ExitCode;

use argh::FromArgs;
use zenmono::timing::{LogReporter, ScopedTimer};
use zenmono::{ErrorKind, Unstoppable};

#[derive(FromArgs)]
/// Binarize an 8-bit grayscale BMP with a local-mean threshold.
struct Args {
    /// input 8-bit BMP
    #[argh(positional)]
    input: String,

    /// output BMP path
    #[argh(positional)]
    output: String,

    /// cutoff in 0..=255; pixels whose window mean is above it become white
    #[argh(option, short = 't')]
    threshold: i64,

    /// odd window side length, at most the smaller image dimension
    #[argh(option, short = 'w')]
    window: i64,

    /// log how long the run took
    #[argh(switch)]
    time: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let reporter = LogReporter::default();
    let timer = args.time.then(|| ScopedTimer::start("zenmono", &reporter));

    let result = zenmono::binarize_file(
        &args.input,
        &args.output,
        args.threshold,
        args.window,
        Unstoppable,
    );
    drop(timer);

    match result {
        Ok(summary) => {
            log::info!(
                "wrote {} ({} bytes, {}x{})",
                args.output,
                summary.bytes_written,
                summary.width,
                summary.height
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let what = match e.kind() {
                ErrorKind::Io => "i/o error",
                ErrorKind::Format => "unsupported or malformed input",
                ErrorKind::Validation => "invalid parameters",
                ErrorKind::Cancelled => "cancelled",
                _ => "error",
            };
            log::error!("{what}: {e}");
            ExitCode::FAILURE
        }
    }
}
