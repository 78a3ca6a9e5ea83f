use serde::Serialize;
use std::path::Path;
use tracing::trace;

/// Serializes `data` as indented JSON and writes it to `path`, replacing any existing file.
///
/// Parent directories are created as necessary.
pub async fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    data: &T,
) -> Result<(), crate::SinkError> {
    let path = path.as_ref();

    // ensure the directory exists
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        trace!("checking directory path: {}", dir.display());
        tokio::fs::create_dir_all(dir).await?;
    }

    let bytes = serde_json::to_vec_pretty(data)?;
    trace!("writing {} bytes to {}", bytes.len(), path.display());
    tokio::fs::write(path, bytes).await?;

    Ok(())
}
