use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use finrec::model::IngestManifest;
use finrec::store;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::util::{resolve_db_path, resolve_manifest_path};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_path = resolve_manifest_path(&args.cache_root, args.manifest_path.as_deref());
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_deref());

    info!(cache_root = %args.cache_root.display(), "status requested");

    if let Some(manifest) = load_manifest(&manifest_path)? {
        info!(
            generated_at = %manifest.generated_at,
            dataset = %manifest.dataset_path,
            dataset_sha256 = %manifest.dataset_sha256,
            db_schema_version = %manifest.db_schema_version,
            warnings = manifest.warnings.len(),
            "loaded ingest manifest"
        );
    } else {
        warn!(path = %manifest_path.display(), "ingest manifest missing");
    }

    if db_path.exists() {
        let connection = store::open_read_only(&db_path)?;
        let counts = store::counts(&connection)?;
        let loaded_at = store::metadata_value(&connection, "loaded_at")?.unwrap_or_default();

        info!(
            path = %db_path.display(),
            items = counts.items,
            users = counts.users,
            interactions = counts.interactions,
            loaded_at = %loaded_at,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<Option<IngestManifest>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::IngestArgs;
    use crate::commands::{ingest, test_support};

    #[test]
    fn status_reads_manifest_from_custom_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache_root = dir.path().join("cache");
        let manifest_path = dir.path().join("elsewhere").join("ingest.json");
        let dataset = test_support::write_sample_dataset(dir.path());

        ingest::run(IngestArgs {
            cache_root: cache_root.clone(),
            dataset,
            db_path: None,
            manifest_path: Some(manifest_path.clone()),
        })
        .expect("ingest");

        let default_location = resolve_manifest_path(&cache_root, None);
        assert!(load_manifest(&default_location).expect("default").is_none());

        let manifest = load_manifest(&resolve_manifest_path(&cache_root, Some(&manifest_path)))
            .expect("custom")
            .expect("manifest present");
        assert_eq!(manifest.counts.items, 4);
        assert_eq!(manifest.counts.interactions, 8);

        run(StatusArgs {
            cache_root,
            db_path: None,
            manifest_path: Some(manifest_path),
        })
        .expect("status");
    }
}
