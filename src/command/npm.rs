//! npm remediate command implementation.

use color_eyre::eyre::{WrapErr, eyre};
use log::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{
    Result,
    api::{client::Client, traits::RemediationApi, types::PackagePatch},
    cli::{self, PackageManager},
    command::{common, report},
    config::Config,
    error::DepmendError,
    manifest::{dispatch::Parser, traits::ManifestParser, types::Ecosystem},
};

/// Execute npm remediation against the current working directory.
pub async fn execute(
    config: &Config,
    args: &cli::NpmRemediateArgs,
) -> Result<()> {
    let dry_run = args.dry_run.unwrap_or(config.dry_run);

    info!("starting npm remediation");
    debug!(
        "package manager: {}, dry run: {}",
        args.package_manager, dry_run
    );

    let lock_path = Path::new(args.package_manager.lock_file());
    let parser = Parser::for_path(lock_path)
        .ok_or_else(|| eyre!("no parser handles {}", lock_path.display()))?;
    let api = Client::new(&config.api_url, config.api_key.clone())?;

    run(&api, &parser, args.package_manager, Path::new("."), dry_run).await
}

/// npm remediation workflow: parse the lock file, analyze, then report or
/// rewrite the lock file and pin overrides in package.json.
async fn run(
    api: &dyn RemediationApi,
    parser: &dyn ManifestParser,
    package_manager: PackageManager,
    dir: &Path,
    dry_run: bool,
) -> Result<()> {
    let lock_path = dir.join(package_manager.lock_file());
    common::ensure_exists(&lock_path)?;

    let packages = parser.parse(&lock_path)?;
    debug!("parsed {} packages from {}", packages.len(), lock_path.display());

    if packages.is_empty() {
        println!("\nNo packages found in {}", lock_path.display());
        return Ok(());
    }

    let refs = common::to_package_refs(&packages);
    let response = api.analyze_packages(Ecosystem::Npm, refs).await?;
    common::log_analysis(&response);

    if response.patches.is_empty() {
        println!("\nNo patches needed - all packages are up to date!");
        return Ok(());
    }

    if dry_run {
        debug!("dry-run mode: no changes will be made");
        report::npm_dry_run(&response.patches, package_manager);
        return Ok(());
    }

    println!(
        "\nApplying {} patches to {}...\n",
        response.patches.len(),
        lock_path.display()
    );

    apply(parser, &lock_path, dir, package_manager, &response.patches)?;

    println!(
        "\nSuccessfully applied {} patches!",
        response.patches.len()
    );
    println!("\nNext steps:");
    println!("  1. Review the changes in {} and package.json", lock_path.display());
    println!("  2. Run: {} install", package_manager);
    println!("  3. Test your application");

    Ok(())
}

/// Rewrite the lock file from all patches at once, then pin each patched
/// package to its aliased replacement through package.json.
fn apply(
    parser: &dyn ManifestParser,
    lock_path: &Path,
    dir: &Path,
    package_manager: PackageManager,
    patches: &[PackagePatch],
) -> Result<()> {
    let mut updates: HashMap<String, String> = HashMap::new();

    for patch in patches {
        println!(
            "  - {}: {} -> {}",
            patch.package_name, patch.version, patch.patch.version
        );
        updates
            .insert(patch.package_name.clone(), patch.patch.version.clone());
    }

    let updated = parser.update(lock_path, &updates)?;

    if !parser.validate(&updated) {
        return Err(DepmendError::validation_failed(
            lock_path.display().to_string(),
        )
        .into());
    }

    fs::write(lock_path, updated).wrap_err_with(|| {
        format!("failed to write {}", lock_path.display())
    })?;

    update_package_json(dir, package_manager, patches)
}

/// Add version overrides to package.json pinning each patched package to
/// `npm:{alias}@{version}`. Every unrelated field is preserved.
fn update_package_json(
    dir: &Path,
    package_manager: PackageManager,
    patches: &[PackagePatch],
) -> Result<()> {
    let path = dir.join("package.json");
    common::ensure_exists(&path)?;

    let content = fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;

    let mut doc: Value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

    let root = doc
        .as_object_mut()
        .ok_or_else(|| eyre!("package.json root is not an object"))?;

    // pnpm nests its overrides under a top-level "pnpm" object
    let holder = if package_manager == PackageManager::Pnpm {
        root.entry("pnpm")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| eyre!("package.json pnpm field is not an object"))?
    } else {
        root
    };

    let overrides = holder
        .entry(package_manager.override_field())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            eyre!(
                "package.json {} field is not an object",
                package_manager.override_field()
            )
        })?;

    for patch in patches {
        let pinned = format!(
            "npm:{}@{}",
            patch.patch_alias.name, patch.patch_alias.version
        );
        overrides.insert(patch.package_name.clone(), Value::String(pinned));
    }

    let updated = serde_json::to_string_pretty(&doc)
        .wrap_err("failed to serialize package.json")?;

    fs::write(&path, updated + "\n")
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;

    debug!("pinned {} overrides in {}", patches.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{
            traits::MockRemediationApi,
            types::{AnalyzeResponse, PatchInfo},
        },
        manifest::{
            npm::Npm,
            traits::MockManifestParser,
            types::PackageInfo,
        },
    };
    use tempfile::TempDir;

    const LOCKFILE: &str = r#"{
  "name": "test-app",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": {
      "name": "test-app",
      "version": "1.0.0",
      "dependencies": {
        "lodash": "^4.17.20"
      }
    },
    "node_modules/lodash": {
      "version": "4.17.20",
      "resolved": "https://registry.npmjs.org/lodash/-/lodash-4.17.20.tgz"
    }
  }
}"#;

    const PACKAGE_JSON: &str = r#"{
  "name": "test-app",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.20"
  }
}"#;

    fn lodash_patch() -> PackagePatch {
        PackagePatch {
            package_name: "lodash".into(),
            version: "4.17.20".into(),
            patch: PatchInfo {
                name: "lodash".into(),
                version: "4.17.21".into(),
            },
            patch_alias: PatchInfo {
                name: "depmend-lodash".into(),
                version: "4.17.21".into(),
            },
            cve_ids: vec!["CVE-2021-23337".into()],
        }
    }

    fn write_project(dir: &TempDir) {
        fs::write(dir.path().join("package-lock.json"), LOCKFILE).unwrap();
        fs::write(dir.path().join("package.json"), PACKAGE_JSON).unwrap();
    }

    fn api_returning(patches: Vec<PackagePatch>) -> MockRemediationApi {
        let mut api = MockRemediationApi::new();
        api.expect_analyze_packages().times(1).returning(move |_, _| {
            Ok(AnalyzeResponse {
                patches: patches.clone(),
                skipped: vec![],
            })
        });
        api
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_lock_file_fails() {
        let dir = TempDir::new().unwrap();
        let api = MockRemediationApi::new();
        let parser = Npm::new();

        let err = run(
            &api,
            &parser,
            PackageManager::Npm,
            dir.path(),
            false,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("not found"));
    }

    #[test_log::test(tokio::test)]
    async fn test_dry_run_leaves_files_untouched() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        let api = api_returning(vec![lodash_patch()]);
        let parser = Npm::new();

        run(&api, &parser, PackageManager::Npm, dir.path(), true)
            .await
            .unwrap();

        let lock =
            fs::read_to_string(dir.path().join("package-lock.json")).unwrap();
        let pkg = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(lock, LOCKFILE);
        assert_eq!(pkg, PACKAGE_JSON);
    }

    #[test_log::test(tokio::test)]
    async fn test_zero_patches_is_noop() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        let api = api_returning(vec![]);
        let parser = Npm::new();

        run(&api, &parser, PackageManager::Npm, dir.path(), false)
            .await
            .unwrap();

        let lock =
            fs::read_to_string(dir.path().join("package-lock.json")).unwrap();
        assert_eq!(lock, LOCKFILE);
    }

    #[test_log::test(tokio::test)]
    async fn test_apply_rewrites_lock_and_pins_overrides() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        let api = api_returning(vec![lodash_patch()]);
        let parser = Npm::new();

        run(&api, &parser, PackageManager::Npm, dir.path(), false)
            .await
            .unwrap();

        let lock: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package-lock.json"))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            lock["packages"]["node_modules/lodash"]["version"],
            "4.17.21"
        );

        let pkg: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            pkg["overrides"]["lodash"],
            "npm:depmend-lodash@4.17.21"
        );
        // Unrelated fields survive
        assert_eq!(pkg["dependencies"]["lodash"], "^4.17.20");
        assert_eq!(pkg["name"], "test-app");
    }

    #[test_log::test(tokio::test)]
    async fn test_validation_failure_aborts_write() {
        let dir = TempDir::new().unwrap();
        write_project(&dir);

        let api = api_returning(vec![lodash_patch()]);

        let mut parser = MockManifestParser::new();
        parser.expect_parse().times(1).returning(|_| {
            Ok(vec![PackageInfo {
                name: "lodash".into(),
                version: "4.17.20".into(),
                version_constraint: "4.17.20".into(),
                ecosystem: Ecosystem::Npm,
                direct: true,
                dev: false,
            }])
        });
        parser
            .expect_update()
            .times(1)
            .returning(|_, _| Ok("not a lock file".into()));
        parser.expect_validate().times(1).returning(|_| false);

        let err = run(&api, &parser, PackageManager::Npm, dir.path(), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed validation"));

        // Original files untouched
        let lock =
            fs::read_to_string(dir.path().join("package-lock.json")).unwrap();
        let pkg = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert_eq!(lock, LOCKFILE);
        assert_eq!(pkg, PACKAGE_JSON);
    }

    #[test]
    fn test_update_package_json_override_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), PACKAGE_JSON).unwrap();
        let patches = vec![lodash_patch()];

        update_package_json(dir.path(), PackageManager::Yarn, &patches)
            .unwrap();
        let pkg: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            pkg["resolutions"]["lodash"],
            "npm:depmend-lodash@4.17.21"
        );

        fs::write(dir.path().join("package.json"), PACKAGE_JSON).unwrap();
        update_package_json(dir.path(), PackageManager::Pnpm, &patches)
            .unwrap();
        let pkg: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            pkg["pnpm"]["overrides"]["lodash"],
            "npm:depmend-lodash@4.17.21"
        );
    }

    #[test]
    fn test_update_package_json_merges_existing_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
  "name": "test-app",
  "overrides": {
    "minimist": "1.2.6"
  }
}"#,
        )
        .unwrap();

        update_package_json(dir.path(), PackageManager::Npm, &[lodash_patch()])
            .unwrap();

        let pkg: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(pkg["overrides"]["minimist"], "1.2.6");
        assert_eq!(
            pkg["overrides"]["lodash"],
            "npm:depmend-lodash@4.17.21"
        );
    }

    #[test]
    fn test_update_package_json_requires_file() {
        let dir = TempDir::new().unwrap();

        let err = update_package_json(
            dir.path(),
            PackageManager::Npm,
            &[lodash_patch()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
