/// Bridge username persistence: read it from disk, or register once and save.

use crate::error::{Error, Result};
use crate::transport::TransportError;
use std::path::Path;

/// Return the stored username at `path`, or call `register` and store what it
/// returns.
pub fn load_or_register<F>(path: &Path, register: F) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, TransportError>,
{
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let username = contents.trim();
            if username.is_empty() {
                return Err(Error::Credentials(format!(
                    "{} is empty; delete it to register again",
                    path.display()
                )));
            }
            log::info!("Using bridge username from {}", path.display());
            Ok(username.to_string())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No bridge username at {}. Registering...", path.display());
            let username = register()?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &username)?;
            log::info!("Saved bridge username to {}", path.display());
            Ok(username)
        }
        Err(e) => Err(e.into()),
    }
}
