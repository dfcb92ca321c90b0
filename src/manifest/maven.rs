//! Maven pom.xml parsing and updates.
//!
//! Parsing resolves `${property}` version references against the POM's
//! `<properties>` section. Updates operate on the raw file text with
//! anchored regex substitution so comments, ordering, and whitespace
//! outside the changed version survive untouched.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use log::*;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use crate::{
    Result,
    manifest::{
        traits::ManifestParser,
        types::{Ecosystem, PackageInfo},
    },
};

/// Dependency coordinates as written in the POM. The version text is kept
/// unresolved so updates can tell property references from literals.
#[derive(Debug, Default, Clone)]
struct PomDependency {
    group_id: String,
    artifact_id: String,
    version: String,
    scope: String,
}

#[derive(Debug, Default)]
struct PomScan {
    properties: HashMap<String, String>,
    dependencies: Vec<PomDependency>,
    root: Option<String>,
}

/// Scan a POM document for its root element, `<properties>`, and the
/// `<project><dependencies>` section. Dependencies declared elsewhere
/// (dependencyManagement, profiles, plugins) are out of scope since their
/// versions are not directly remediable.
fn scan_pom(content: &str) -> Result<PomScan> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut scan = PomScan::default();
    let mut depth = 0u32;
    let mut root_is_project = false;
    let mut in_dependencies = false;
    let mut in_properties = false;
    let mut current: Option<PomDependency> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref())
                    .into_owned();

                if depth == 1 && scan.root.is_none() {
                    root_is_project = name == "project";
                    scan.root = Some(name.clone());
                }

                match (depth, name.as_str()) {
                    (2, "dependencies") if root_is_project => {
                        in_dependencies = true
                    }
                    (2, "properties") if root_is_project => {
                        in_properties = true
                    }
                    (3, "dependency") if in_dependencies => {
                        current = Some(PomDependency::default())
                    }
                    _ => {}
                }

                text.clear();
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref())
                    .into_owned();

                match (depth, name.as_str()) {
                    (2, "dependencies") => in_dependencies = false,
                    (2, "properties") => in_properties = false,
                    (3, "dependency") if in_dependencies => {
                        if let Some(dep) = current.take() {
                            scan.dependencies.push(dep);
                        }
                    }
                    (3, prop) if in_properties => {
                        scan.properties.insert(
                            prop.to_string(),
                            std::mem::take(&mut text),
                        );
                    }
                    (4, field) if in_dependencies => {
                        if let Some(dep) = current.as_mut() {
                            match field {
                                "groupId" => {
                                    dep.group_id = std::mem::take(&mut text)
                                }
                                "artifactId" => {
                                    dep.artifact_id =
                                        std::mem::take(&mut text)
                                }
                                "version" => {
                                    dep.version = std::mem::take(&mut text)
                                }
                                "scope" => {
                                    dep.scope = std::mem::take(&mut text)
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }

                depth = depth.saturating_sub(1);
                text.clear();
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 && scan.root.is_none() {
                    let name =
                        String::from_utf8_lossy(e.local_name().as_ref())
                            .into_owned();
                    scan.root = Some(name);
                }
            }
            Ok(Event::Text(ref e)) => match e.unescape() {
                Ok(value) => text.push_str(&value),
                Err(e) => return Err(e.into()),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if depth != 0 {
        return Err(eyre!("unexpected end of file"));
    }

    Ok(scan)
}

/// Resolve a `${property}` version reference. Unknown properties are left
/// as the literal reference rather than failing the parse.
fn resolve_property<'a>(
    value: &'a str,
    properties: &'a HashMap<String, String>,
) -> &'a str {
    let Some(stripped) = value.strip_prefix("${") else {
        return value;
    };

    let prop_name = stripped.strip_suffix('}').unwrap_or(stripped);

    match properties.get(prop_name) {
        Some(resolved) => resolved,
        None => value,
    }
}

/// Replace the version text of one specific dependency block, anchored on
/// its full `<groupId>/<artifactId>/<version>` sequence so an equal version
/// string in an unrelated dependency is never touched. Returns `None` when
/// nothing matched, which happens when the POM orders those child elements
/// differently.
fn replace_dependency_version(
    content: &str,
    group_id: &str,
    artifact_id: &str,
    old_version: &str,
    new_version: &str,
) -> Result<Option<String>> {
    let pattern = format!(
        r"(<dependency>\s*<groupId>{}</groupId>\s*<artifactId>{}</artifactId>\s*<version>){}(</version>)",
        regex::escape(group_id),
        regex::escape(artifact_id),
        regex::escape(old_version),
    );

    let re = Regex::new(&pattern)?;
    let replacement = format!("${{1}}{}${{2}}", new_version);

    match re.replace_all(content, replacement.as_str()) {
        Cow::Borrowed(_) => Ok(None),
        Cow::Owned(updated) => Ok(Some(updated)),
    }
}

/// Parser for Maven pom.xml files.
pub struct Maven {}

impl Maven {
    /// Create a new Maven parser.
    pub fn new() -> Self {
        Self {}
    }
}

impl ManifestParser for Maven {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        &["pom.xml"]
    }

    fn parse(&self, path: &Path) -> Result<Vec<PackageInfo>> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        let scan = scan_pom(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        let mut packages = vec![];
        let mut seen: HashSet<String> = HashSet::new();

        for dep in &scan.dependencies {
            if dep.group_id.is_empty() || dep.artifact_id.is_empty() {
                continue;
            }

            let version = resolve_property(&dep.version, &scan.properties);

            // Versions managed by a parent or BOM are not present in this
            // file and cannot be remediated by text substitution
            if version.is_empty() {
                continue;
            }

            let name = format!("{}:{}", dep.group_id, dep.artifact_id);

            if !seen.insert(format!("{}@{}", name, version)) {
                continue;
            }

            packages.push(PackageInfo {
                name,
                version: version.to_string(),
                version_constraint: version.to_string(),
                ecosystem: Ecosystem::Maven,
                // POMs declare no transitive closure
                direct: true,
                dev: dep.scope == "test",
            });
        }

        Ok(packages)
    }

    fn update(
        &self,
        path: &Path,
        updates: &HashMap<String, String>,
    ) -> Result<String> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        let scan = scan_pom(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        let mut updated = content;

        for dep in &scan.dependencies {
            if dep.group_id.is_empty() || dep.artifact_id.is_empty() {
                continue;
            }

            let name = format!("{}:{}", dep.group_id, dep.artifact_id);

            let Some(new_version) = updates.get(&name) else {
                continue;
            };

            if let Some(stripped) = dep.version.strip_prefix("${") {
                // Property-referenced version: update the property value
                let prop_name = stripped.strip_suffix('}').unwrap_or(stripped);

                if !scan.properties.contains_key(prop_name) {
                    warn!(
                        "property {} referenced by {} not found, skipping",
                        prop_name, name
                    );
                    continue;
                }

                let pattern = format!(
                    "(<{}>)[^<]*(</[^>]*>)",
                    regex::escape(prop_name)
                );
                let re = Regex::new(&pattern)?;
                let replacement = format!("${{1}}{}${{2}}", new_version);

                match re.replace_all(&updated, replacement.as_str()) {
                    Cow::Borrowed(_) => {
                        warn!(
                            "no <{}> property element found for {}, file left unchanged",
                            prop_name, name
                        );
                    }
                    Cow::Owned(new_content) => updated = new_content,
                }
            } else {
                match replace_dependency_version(
                    &updated,
                    &dep.group_id,
                    &dep.artifact_id,
                    &dep.version,
                    new_version,
                )? {
                    Some(new_content) => updated = new_content,
                    None => {
                        warn!(
                            "no version element matched for {}, file left unchanged",
                            name
                        );
                    }
                }
            }
        }

        Ok(updated)
    }

    fn validate(&self, content: &str) -> bool {
        matches!(scan_pom(content), Ok(scan) if scan.root.is_some())
    }
}
