//! Pipeline step implementations.
//!
//! Audio jobs run Load → Shift → Write; video jobs run
//! Extract → Load → Shift → Write → Remux.

mod extract;
mod load;
mod remux;
mod shift;
mod write;

pub use extract::ExtractStep;
pub use load::LoadStep;
pub use remux::RemuxStep;
pub use shift::ShiftStep;
pub use write::WriteStep;

use std::fs;
use std::io;
use std::path::Path;

/// Move a finished artifact into the requested output path.
///
/// The artifact is renamed into place only after every preceding stage
/// succeeded, so a failed job never leaves a partial file at the output
/// path. Falls back to copy+remove when the rename crosses filesystems.
pub(crate) fn place_output(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn place_output_moves_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("work").join("result.wav");
        let dest = dir.path().join("out").join("final.wav");

        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, b"data").unwrap();

        place_output(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"data");
    }
}
