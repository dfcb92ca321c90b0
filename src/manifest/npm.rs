//! npm lock file parsing and updates.
//!
//! Supports `package-lock.json` (lockfile v2/v3 with the flat `packages`
//! map). `yarn.lock` and `pnpm-lock.yaml` are recognized but parsing them
//! is not yet implemented.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    Result,
    error::DepmendError,
    manifest::{
        traits::ManifestParser,
        types::{Ecosystem, PackageInfo},
    },
};

/// Lock entries read during parsing. Updates go through `serde_json::Value`
/// instead so fields not modeled here survive the rewrite.
#[derive(Debug, Default, Deserialize)]
struct LockFile {
    #[serde(default)]
    packages: BTreeMap<String, LockEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockEntry {
    #[serde(default)]
    version: String,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    dependencies: HashMap<String, String>,
    #[serde(default)]
    dev_dependencies: HashMap<String, String>,
}

/// Extract the package name from a lock entry path, e.g.
/// `node_modules/@types/node` or `node_modules/a/node_modules/b`. The name
/// is everything after the final `node_modules/` segment.
fn extract_package_name(pkg_path: &str) -> &str {
    match pkg_path.rfind("node_modules/") {
        Some(idx) => &pkg_path[idx + "node_modules/".len()..],
        None => pkg_path,
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Parser for npm lock files.
pub struct Npm {}

impl Npm {
    /// Create a new npm parser.
    pub fn new() -> Self {
        Self {}
    }

    fn parse_package_lock(&self, path: &Path) -> Result<Vec<PackageInfo>> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        let lockfile: LockFile = serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        // The root entry (empty key) declares which names are direct
        // dependencies of the project itself.
        let mut direct_deps: HashSet<&str> = HashSet::new();
        let mut direct_dev_deps: HashSet<&str> = HashSet::new();

        if let Some(root) = lockfile.packages.get("") {
            direct_deps.extend(root.dependencies.keys().map(String::as_str));
            direct_dev_deps
                .extend(root.dev_dependencies.keys().map(String::as_str));
        }

        let mut packages = vec![];
        let mut seen: HashSet<String> = HashSet::new();

        for (pkg_path, entry) in &lockfile.packages {
            if pkg_path.is_empty() {
                continue;
            }

            let name = extract_package_name(pkg_path);
            if name.is_empty() || entry.version.is_empty() {
                continue;
            }

            // Nested private copies can repeat a (name, version) pair
            if !seen.insert(format!("{}@{}", name, entry.version)) {
                continue;
            }

            let direct = direct_deps.contains(name)
                || direct_dev_deps.contains(name);
            let dev = direct_dev_deps.contains(name) || entry.dev;

            packages.push(PackageInfo {
                name: name.to_string(),
                version: entry.version.clone(),
                // Lock files carry exact versions
                version_constraint: entry.version.clone(),
                ecosystem: Ecosystem::Npm,
                direct,
                dev,
            });
        }

        Ok(packages)
    }

    fn update_package_lock(
        &self,
        path: &Path,
        updates: &HashMap<String, String>,
    ) -> Result<String> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        let mut lockfile: Value = serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        if let Some(packages) =
            lockfile.get_mut("packages").and_then(|p| p.as_object_mut())
        {
            for (pkg_path, entry) in packages.iter_mut() {
                if pkg_path.is_empty() {
                    continue;
                }

                let name = extract_package_name(pkg_path);
                let Some(new_version) = updates.get(name) else {
                    continue;
                };

                let Some(obj) = entry.as_object_mut() else {
                    continue;
                };

                let old_version = obj
                    .get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();

                obj.insert(
                    "version".to_string(),
                    Value::String(new_version.clone()),
                );

                // The resolved URL embeds the version once
                if !old_version.is_empty() {
                    let replaced = obj
                        .get("resolved")
                        .and_then(|r| r.as_str())
                        .map(|r| r.replacen(&old_version, new_version, 1));

                    if let Some(replaced) = replaced {
                        obj.insert(
                            "resolved".to_string(),
                            Value::String(replaced),
                        );
                    }
                }
            }
        }

        let updated = serde_json::to_string_pretty(&lockfile)
            .wrap_err("failed to serialize lock file")?;

        Ok(updated + "\n")
    }
}

impl ManifestParser for Npm {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        &["package-lock.json", "yarn.lock", "pnpm-lock.yaml"]
    }

    fn parse(&self, path: &Path) -> Result<Vec<PackageInfo>> {
        let name = file_name(path);

        if name.ends_with("yarn.lock") {
            return Err(DepmendError::not_implemented("yarn.lock").into());
        }

        if name.ends_with("pnpm-lock.yaml") {
            return Err(DepmendError::not_implemented("pnpm-lock.yaml").into());
        }

        self.parse_package_lock(path)
    }

    fn update(
        &self,
        path: &Path,
        updates: &HashMap<String, String>,
    ) -> Result<String> {
        let name = file_name(path);

        if name.ends_with("yarn.lock") {
            return Err(DepmendError::not_implemented("yarn.lock").into());
        }

        if name.ends_with("pnpm-lock.yaml") {
            return Err(DepmendError::not_implemented("pnpm-lock.yaml").into());
        }

        self.update_package_lock(path, updates)
    }

    fn validate(&self, content: &str) -> bool {
        serde_json::from_str::<LockFile>(content).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LOCKFILE: &str = r#"{
  "name": "test-app",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "requires": true,
  "packages": {
    "": {
      "name": "test-app",
      "version": "1.0.0",
      "dependencies": {
        "lodash": "^4.17.20"
      },
      "devDependencies": {
        "jest": "^29.0.0"
      }
    },
    "node_modules/lodash": {
      "version": "4.17.20",
      "resolved": "https://registry.npmjs.org/lodash/-/lodash-4.17.20.tgz",
      "integrity": "sha512-lockintegrity"
    },
    "node_modules/jest": {
      "version": "29.0.0",
      "resolved": "https://registry.npmjs.org/jest/-/jest-29.0.0.tgz",
      "dev": true
    },
    "node_modules/@types/node": {
      "version": "18.0.0",
      "resolved": "https://registry.npmjs.org/@types/node/-/node-18.0.0.tgz",
      "dev": true
    },
    "node_modules/lodash/node_modules/minimist": {
      "version": "1.2.5",
      "resolved": "https://registry.npmjs.org/minimist/-/minimist-1.2.5.tgz"
    }
  }
}"#;

    fn write_lockfile(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("package-lock.json");
        fs::write(&path, content).unwrap();
        path
    }

    fn find<'a>(packages: &'a [PackageInfo], name: &str) -> &'a PackageInfo {
        packages
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("package {} not found", name))
    }

    #[test]
    fn test_parse_classifies_direct_and_dev() {
        let dir = TempDir::new().unwrap();
        let path = write_lockfile(&dir, LOCKFILE);

        let parser = Npm::new();
        let packages = parser.parse(&path).unwrap();

        assert_eq!(packages.len(), 4);

        let lodash = find(&packages, "lodash");
        assert_eq!(lodash.version, "4.17.20");
        assert_eq!(lodash.version_constraint, "4.17.20");
        assert_eq!(lodash.ecosystem, Ecosystem::Npm);
        assert!(lodash.direct);
        assert!(!lodash.dev);

        let jest = find(&packages, "jest");
        assert!(jest.direct);
        assert!(jest.dev);

        let types_node = find(&packages, "@types/node");
        assert!(!types_node.direct);
        assert!(types_node.dev);

        let minimist = find(&packages, "minimist");
        assert_eq!(minimist.version, "1.2.5");
        assert!(!minimist.direct);
        assert!(!minimist.dev);
    }

    #[test]
    fn test_parse_skips_entries_without_version() {
        let dir = TempDir::new().unwrap();
        let path = write_lockfile(
            &dir,
            r#"{
  "packages": {
    "": {},
    "node_modules/linked-pkg": {
      "resolved": "file:../linked-pkg",
      "link": true
    },
    "node_modules/real-pkg": {
      "version": "1.0.0"
    }
  }
}"#,
        );

        let parser = Npm::new();
        let packages = parser.parse(&path).unwrap();

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "real-pkg");
    }

    #[test]
    fn test_parse_dedupes_repeated_name_version_pairs() {
        let dir = TempDir::new().unwrap();
        let path = write_lockfile(
            &dir,
            r#"{
  "packages": {
    "node_modules/a": {
      "version": "2.0.0"
    },
    "node_modules/a/node_modules/b": {
      "version": "1.0.0"
    },
    "node_modules/b": {
      "version": "1.0.0"
    }
  }
}"#,
        );

        let parser = Npm::new();
        let packages = parser.parse(&path).unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(
            packages.iter().filter(|p| p.name == "b").count(),
            1
        );
    }

    #[test]
    fn test_extract_package_name() {
        assert_eq!(extract_package_name("node_modules/lodash"), "lodash");
        assert_eq!(
            extract_package_name("node_modules/@types/node"),
            "@types/node"
        );
        assert_eq!(
            extract_package_name("node_modules/a/node_modules/b"),
            "b"
        );
        assert_eq!(
            extract_package_name(
                "node_modules/a/node_modules/@scope/pkg"
            ),
            "@scope/pkg"
        );
        assert_eq!(extract_package_name(""), "");
        assert_eq!(extract_package_name("packages/app"), "packages/app");
    }

    #[test]
    fn test_parse_rejects_unsupported_lock_formats() {
        let dir = TempDir::new().unwrap();
        let yarn = dir.path().join("yarn.lock");
        fs::write(&yarn, "lodash@^4.17.20:\n  version \"4.17.21\"\n")
            .unwrap();

        let parser = Npm::new();

        let err = parser.parse(&yarn).unwrap_err();
        assert!(err.to_string().contains("not yet implemented"));

        let pnpm = dir.path().join("pnpm-lock.yaml");
        fs::write(&pnpm, "lockfileVersion: '9.0'\n").unwrap();

        let err = parser.parse(&pnpm).unwrap_err();
        assert!(err.to_string().contains("not yet implemented"));

        let err = parser
            .update(&yarn, &HashMap::from([("a".into(), "1".into())]))
            .unwrap_err();
        assert!(err.to_string().contains("not yet implemented"));
    }

    #[test]
    fn test_update_rewrites_version_and_resolved() {
        let dir = TempDir::new().unwrap();
        let path = write_lockfile(&dir, LOCKFILE);

        let parser = Npm::new();
        let updates =
            HashMap::from([("lodash".to_string(), "4.17.21".to_string())]);

        let updated = parser.update(&path, &updates).unwrap();
        assert!(updated.ends_with('\n'));

        let value: Value = serde_json::from_str(&updated).unwrap();
        let lodash = &value["packages"]["node_modules/lodash"];

        assert_eq!(lodash["version"], "4.17.21");
        assert_eq!(
            lodash["resolved"],
            "https://registry.npmjs.org/lodash/-/lodash-4.17.21.tgz"
        );
        // Fields outside the update surface survive the rewrite
        assert_eq!(lodash["integrity"], "sha512-lockintegrity");
        assert_eq!(value["lockfileVersion"], 3);
        assert_eq!(
            value["packages"]["node_modules/jest"]["version"],
            "29.0.0"
        );
    }

    #[test]
    fn test_update_then_parse_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = write_lockfile(&dir, LOCKFILE);

        let parser = Npm::new();
        let before = parser.parse(&path).unwrap();

        let updates: HashMap<String, String> = before
            .iter()
            .map(|p| (p.name.clone(), format!("{}-patched", p.version)))
            .collect();

        let updated = parser.update(&path, &updates).unwrap();
        assert!(parser.validate(&updated));

        let path = dir.path().join("updated-package-lock.json");
        fs::write(&path, &updated).unwrap();

        let after = parser.parse(&path).unwrap();
        assert_eq!(after.len(), before.len());

        for pkg in &before {
            let new = find(&after, &pkg.name);
            assert_eq!(new.version, updates[&pkg.name]);
        }
    }

    #[test]
    fn test_validate() {
        let parser = Npm::new();

        assert!(parser.validate(LOCKFILE));
        assert!(parser.validate("{}"));
        assert!(!parser.validate(""));
        assert!(!parser.validate("[]"));
        assert!(!parser.validate("{\"packages\": 3}"));
        assert!(!parser.validate("not json"));
    }
}
