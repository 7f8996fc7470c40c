//! First-run download of the default U²-Net model.

use crate::Result;
use crate::error::SegmentationError;
use crate::io::ensure_parent_dir;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Release asset served for the default model.
pub const MODEL_URL: &str =
    "https://github.com/danielgatis/rembg/releases/download/v0.0.0/u2net.onnx";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads `url` to `dest`, creating its directory.
///
/// The body is streamed into `<dest>.part` and renamed into place once
/// complete, so an interrupted download never leaves a truncated model at
/// `dest`.
///
/// # Errors
///
/// Returns [`SegmentationError::Download`] if the request fails, the server
/// answers with an error status, or the file cannot be written.
pub fn fetch_model(url: &str, dest: &Path) -> Result<()> {
    ensure_parent_dir(dest)?;
    let partial = partial_path(dest);

    tracing::info!(url, dest = %dest.display(), "downloading segmentation model");
    let result = download_to(url, &partial).and_then(|bytes| {
        std::fs::rename(&partial, dest).map_err(|e| download_error(url, &e))?;
        Ok(bytes)
    });

    match result {
        Ok(bytes) => {
            tracing::debug!(bytes, "model downloaded");
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn download_to(url: &str, partial: &Path) -> Result<u64> {
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Option::<Duration>::None)
        .build()
        .map_err(|e| download_error(url, &e))?;

    let mut response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|e| download_error(url, &e))?;

    let mut file = File::create(partial).map_err(|e| download_error(url, &e))?;
    response
        .copy_to(&mut file)
        .map_err(|e| download_error(url, &e))
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn download_error(url: &str, err: &dyn std::fmt::Display) -> crate::Error {
    SegmentationError::Download {
        url: url.to_string(),
        reason: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/home/u/.u2net/u2net.onnx")),
            PathBuf::from("/home/u/.u2net/u2net.onnx.part")
        );
    }

    #[test]
    fn test_fetch_unreachable_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("models/u2net.onnx");

        // Port 9 (discard) is closed on loopback, so the connection is refused
        let result = fetch_model("http://127.0.0.1:9/u2net.onnx", &dest);

        assert!(matches!(
            result,
            Err(Error::Segmentation(SegmentationError::Download { .. }))
        ));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
        assert!(temp_dir.path().join("models").is_dir());
    }

    // Requires network access. Run with: cargo test -- --ignored
    #[test]
    #[ignore = "downloads the 176MB u2net.onnx model"]
    fn test_fetch_default_model() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join(".u2net/u2net.onnx");

        fetch_model(MODEL_URL, &dest).unwrap();
        assert!(std::fs::metadata(&dest).unwrap().len() > 1_000_000);
    }
}
