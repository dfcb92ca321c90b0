//! Dry-run preview rendering.
//!
//! Previews are product output on stdout, distinct from diagnostic logging.
//! The pip preview renders the exact commands that would run, with the
//! index URL's credential replaced by a placeholder.

use std::path::Path;
use url::Url;

use crate::{api::types::PackagePatch, cli::PackageManager};

/// Package index URL template with the credential masked for display.
pub fn masked_index_url(pkg_url: &str) -> String {
    match Url::parse(pkg_url) {
        Ok(url) => format!(
            "{}://root:<your_api_key>@{}/pypi/simple/",
            url.scheme(),
            url.host_str().unwrap_or_default()
        ),
        Err(_) => format!("{}/pypi/simple/", pkg_url.trim_end_matches('/')),
    }
}

/// Preview the pip commands that would run for each patch.
pub fn pip_dry_run(patches: &[PackagePatch], use_alias: bool, pkg_url: &str) {
    println!("\n=== DRY-RUN MODE ===");
    println!("The following operations would be performed:");
    println!();

    let index_url = masked_index_url(pkg_url);

    for (i, patch) in patches.iter().enumerate() {
        let chosen = patch.select(use_alias);
        let kind = if use_alias { "Aliased" } else { "Non-Aliased" };

        println!(
            "{}. Package: {} @ {}",
            i + 1,
            patch.package_name,
            patch.version
        );
        println!("   Patch ({}): {} @ {}", kind, chosen.name, chosen.version);
        println!("   CVEs Fixed: {:?}", patch.cve_ids);
        println!("   Commands:");
        println!("     pip uninstall -y {}", patch.package_name);
        println!(
            "     pip install --no-deps --index-url {} {}=={}\n",
            index_url, chosen.name, chosen.version
        );
    }

    println!("To apply these patches, run with --dry-run=false");
    if use_alias {
        println!(
            "To use original package names instead of aliases, add --use-alias=false"
        );
    } else {
        println!(
            "To use aliased package names (recommended), add --use-alias=true"
        );
    }
}

/// Preview the lock file changes and package.json overrides for npm.
pub fn npm_dry_run(patches: &[PackagePatch], package_manager: PackageManager) {
    println!("\n=== DRY-RUN MODE ===");
    println!(
        "The following patches would be applied to {}:\n",
        package_manager.lock_file()
    );

    for (i, patch) in patches.iter().enumerate() {
        println!("{}. Package: {}", i + 1, patch.package_name);
        println!("   Current version: {}", patch.version);
        println!("   Patched version: {}", patch.patch.version);
        println!(
            "   Override: npm:{}@{}",
            patch.patch_alias.name, patch.patch_alias.version
        );
        if !patch.cve_ids.is_empty() {
            println!("   CVEs Fixed: {:?}", patch.cve_ids);
        }
        println!();
    }

    if package_manager == PackageManager::Pnpm {
        println!(
            "Overrides will be added to package.json under the \"pnpm.overrides\" field\n"
        );
    } else {
        println!(
            "Overrides will be added to package.json under the \"{}\" field\n",
            package_manager.override_field()
        );
    }

    println!("To apply these patches, run with --dry-run=false");
    println!("Then run: {} install", package_manager);
}

/// Preview the dependency version changes for Maven.
pub fn maven_dry_run(patches: &[PackagePatch], file: &Path) {
    println!("\n=== DRY-RUN MODE ===");
    println!(
        "The following packages in {} would be updated:\n",
        file.display()
    );

    for (i, patch) in patches.iter().enumerate() {
        println!("{}. Package: {}", i + 1, patch.package_name);
        println!("   Current version: {}", patch.version);
        println!("   Patched version: {}", patch.patch.version);
        if !patch.cve_ids.is_empty() {
            println!("   CVEs Fixed: {:?}", patch.cve_ids);
        }
        println!();
    }

    println!("To apply these patches:");
    println!("  1. Run with --dry-run=false");
    println!("  2. Then run: mvn clean install");
}
