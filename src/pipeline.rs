//! File-to-file binarization.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use enough::Stop;

use crate::binarize::ThresholdConfig;
use crate::error::BinarizeError;

/// What [`binarize_file`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub width: usize,
    pub height: usize,
    pub config: ThresholdConfig,
    pub bytes_written: usize,
}

/// Read `input`, binarize it and write the result to `output`.
///
/// Errors are reported in pipeline order: threshold and window range before
/// the input is opened, header problems, window against the image size,
/// palette and row problems, then output I/O. The output is first written to
/// a temporary file next to `output` and renamed over it only once complete,
/// so a failed run never leaves a truncated bitmap at `output`.
pub fn binarize_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    threshold: i64,
    window_size: i64,
    stop: impl Stop,
) -> Result<RunSummary, BinarizeError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let config = ThresholdConfig::new(threshold, window_size)?;

    let data = fs::read(input).map_err(|source| BinarizeError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let (image, encoded) = crate::binarize_encoded(&data, &config, &stop)?;
    drop(data);
    let (width, height) = (image.width(), image.height());

    write_atomically(output, &encoded)?;
    log::info!(
        "binarized {} ({width}x{height}, threshold {}, window {}) -> {}",
        input.display(),
        config.threshold(),
        config.window_size(),
        output.display()
    );

    Ok(RunSummary {
        width,
        height,
        config,
        bytes_written: encoded.len(),
    })
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".partial");
    output.with_file_name(name)
}

/// Errors name the file the failing step touched: the `.partial` file while
/// writing it, `output` when renaming over it.
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), BinarizeError> {
    let tmp = partial_path(output);
    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();
    let result = match written {
        Ok(()) => fs::rename(&tmp, output).map_err(|source| BinarizeError::Io {
            path: output.to_path_buf(),
            source,
        }),
        Err(source) => Err(BinarizeError::Io {
            path: tmp.clone(),
            source,
        }),
    };
    if result.is_err() {
        remove_partial(&tmp);
    }
    result
}

fn remove_partial(tmp: &Path) {
    match fs::remove_file(tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::debug!("could not remove {}: {e}", tmp.display()),
    }
}
