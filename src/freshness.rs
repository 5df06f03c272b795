//! Image freshness tracking via zero-byte marker files.
//!
//! Each tracked image has a marker in the project directory whose mtime
//! records the last time the image was checked. An image needs a build when
//! its Dockerfile is strictly newer than that previous check, or when no
//! marker exists yet.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::config::ImageDescriptor;
use crate::error::LaunchError;

const MARKER_PREFIX: &str = ".image-";

/// Marker file for `image`, flattened so it never names a subdirectory.
pub fn marker_path(project_dir: &Path, image: &str) -> PathBuf {
    let escaped: String = image
        .chars()
        .map(|c| if std::path::is_separator(c) { '.' } else { c })
        .collect();
    project_dir.join(format!("{MARKER_PREFIX}{escaped}"))
}

/// Decide whether `descriptor`'s image must be (re)built.
///
/// Always bumps the marker's mtime to now, whatever the answer.
pub fn needs_build(
    project_dir: &Path,
    descriptor: &ImageDescriptor,
) -> Result<bool, LaunchError> {
    let dockerfile = project_dir.join(&descriptor.dockerfile);
    let dockerfile_mtime = fs::metadata(&dockerfile)
        .and_then(|m| m.modified())
        .map_err(|source| LaunchError::MissingBuildFile {
            path: dockerfile.clone(),
            source,
        })?;

    let marker = marker_path(project_dir, &descriptor.image);
    let marker_err = |source| LaunchError::Marker {
        path: marker.clone(),
        source,
    };

    let previous = match fs::metadata(&marker) {
        Ok(meta) => meta.modified().map_err(marker_err)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            File::create(&marker).map_err(marker_err)?;
            debug!(image = %descriptor.image, marker = %marker.display(), "created marker");
            return Ok(true);
        }
        Err(e) => return Err(marker_err(e)),
    };

    touch(&marker).map_err(marker_err)?;

    let stale = dockerfile_mtime > previous;
    debug!(image = %descriptor.image, stale, "checked marker");
    Ok(stale)
}

fn touch(path: &Path) -> io::Result<()> {
    File::options()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn project_with_dockerfile() -> (tempfile::TempDir, ImageDescriptor) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ubuntu.Dockerfile"), "FROM ubuntu:22.04\n").unwrap();
        let descriptor = ImageDescriptor::new("ubuntu.Dockerfile", "jai-docker/ubuntu");
        (dir, descriptor)
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn mtime(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn marker_name_is_flat() {
        let path = marker_path(Path::new("/proj"), "jai-docker/compiler");
        assert_eq!(path, PathBuf::from("/proj/.image-jai-docker.compiler"));
    }

    #[test]
    fn missing_marker_builds_once() {
        let (dir, descriptor) = project_with_dockerfile();
        let marker = marker_path(dir.path(), &descriptor.image);
        assert!(!marker.exists());

        assert!(needs_build(dir.path(), &descriptor).unwrap());
        assert!(marker.exists());
        assert_eq!(fs::metadata(&marker).unwrap().len(), 0);

        assert!(!needs_build(dir.path(), &descriptor).unwrap());
    }

    #[test]
    fn newer_dockerfile_needs_build() {
        let (dir, descriptor) = project_with_dockerfile();
        needs_build(dir.path(), &descriptor).unwrap();
        needs_build(dir.path(), &descriptor).unwrap();

        let future = SystemTime::now() + Duration::from_secs(60);
        set_mtime(&dir.path().join(&descriptor.dockerfile), future);
        assert!(needs_build(dir.path(), &descriptor).unwrap());
    }

    #[test]
    fn older_dockerfile_does_not_need_build() {
        let (dir, descriptor) = project_with_dockerfile();
        let past = SystemTime::now() - Duration::from_secs(3600);
        set_mtime(&dir.path().join(&descriptor.dockerfile), past);

        assert!(needs_build(dir.path(), &descriptor).unwrap());
        for _ in 0..3 {
            assert!(!needs_build(dir.path(), &descriptor).unwrap());
        }
    }

    #[test]
    fn every_check_refreshes_marker() {
        let (dir, descriptor) = project_with_dockerfile();
        let past = SystemTime::now() - Duration::from_secs(3600);
        let dockerfile = dir.path().join(&descriptor.dockerfile);
        set_mtime(&dockerfile, past - Duration::from_secs(60));
        needs_build(dir.path(), &descriptor).unwrap();

        let marker = marker_path(dir.path(), &descriptor.image);
        for _ in 0..2 {
            set_mtime(&marker, past);
            assert!(!needs_build(dir.path(), &descriptor).unwrap());
            assert!(mtime(&marker) > past);
        }
    }

    #[test]
    fn missing_dockerfile_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = ImageDescriptor::new("Dockerfile", "jai-docker/compiler");
        let err = needs_build(dir.path(), &descriptor).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(!marker_path(dir.path(), &descriptor.image).exists());
    }
}
