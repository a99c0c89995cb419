use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result, bail};
use finrec::model::{Dataset, IngestManifest};
use finrec::store::{self, DB_SCHEMA_VERSION};
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::util::{
    ensure_directory, now_utc_string, resolve_db_path, resolve_manifest_path, sha256_hex,
    write_json_pretty,
};

pub fn run(args: IngestArgs) -> Result<()> {
    let raw = fs::read(&args.dataset)
        .with_context(|| format!("failed to read dataset: {}", args.dataset.display()))?;
    let dataset_sha256 = sha256_hex(&raw);
    let dataset: Dataset = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse dataset: {}", args.dataset.display()))?;

    if dataset.items.is_empty() && dataset.interactions.is_empty() {
        bail!("dataset {} has no items and no interactions", args.dataset.display());
    }

    let warnings = dataset_warnings(&dataset);
    for warning in &warnings {
        warn!(warning = %warning, "dataset check");
    }

    ensure_directory(&args.cache_root)?;
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_deref());
    let generated_at = now_utc_string();

    let mut connection = store::open_for_write(&db_path)?;
    store::replace_dataset(&mut connection, &dataset, &generated_at)?;
    let counts = store::counts(&connection)?;

    info!(
        path = %db_path.display(),
        items = counts.items,
        users = counts.users,
        interactions = counts.interactions,
        "dataset loaded"
    );

    let manifest = IngestManifest {
        manifest_version: 1,
        generated_at,
        dataset_path: args.dataset.display().to_string(),
        dataset_sha256,
        db_path: db_path.display().to_string(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        counts,
        warnings,
    };

    let manifest_path = resolve_manifest_path(&args.cache_root, args.manifest_path.as_deref());
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote ingest manifest");

    Ok(())
}

fn dataset_warnings(dataset: &Dataset) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut catalog = HashSet::new();
    let mut duplicates = 0_usize;
    for item in &dataset.items {
        if !catalog.insert(item.item_id) {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warnings.push(format!("{duplicates} duplicate item ids; last definition kept"));
    }

    let dimensions = dataset
        .items
        .iter()
        .map(|item| item.features.len())
        .collect::<HashSet<_>>();
    if dimensions.len() > 1 {
        warnings.push(format!(
            "feature vectors have {} different lengths; mismatched items never match",
            dimensions.len()
        ));
    }

    if !catalog.is_empty() {
        let unknown = dataset
            .interactions
            .iter()
            .filter(|interaction| !catalog.contains(&interaction.item_id))
            .count();
        if unknown > 0 {
            warnings.push(format!("{unknown} interactions reference items outside the catalog"));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use finrec::model::{Interaction, ItemRecord};

    use super::*;

    fn item(item_id: i64, features: Vec<f32>) -> ItemRecord {
        ItemRecord {
            item_id,
            kind: "credit_card".to_string(),
            features,
        }
    }

    #[test]
    fn clean_dataset_has_no_warnings() {
        let dataset = Dataset {
            items: vec![item(1, vec![1.0, 0.0]), item(2, vec![0.0, 1.0])],
            interactions: vec![Interaction::new(1, 1, 5)],
        };
        assert!(dataset_warnings(&dataset).is_empty());
    }

    #[test]
    fn dataset_warnings_report_each_problem() {
        let dataset = Dataset {
            items: vec![item(1, vec![1.0]), item(1, vec![1.0, 0.0])],
            interactions: vec![Interaction::new(1, 9, 5), Interaction::new(2, 1, 1)],
        };
        let warnings = dataset_warnings(&dataset);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("1 duplicate"));
        assert!(warnings[2].starts_with("1 interactions"));
    }
}
