use anyhow::{Context, Result};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Create a scratch file next to `target` so the final rename stays on one filesystem.
pub fn stage_file(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    );

    Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create staging file for {:?}", target))
}

/// Flush a staged file to disk and rename it over `target`.
pub fn commit_file(staged: NamedTempFile, target: &Path) -> Result<()> {
    staged
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync staging file for {:?}", target))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(staged.path(), std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Failed to set permissions for {:?}", target))?;
    }

    staged
        .persist(target)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to move staging file to {:?}", target))?;
    Ok(())
}
