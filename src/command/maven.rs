//! maven remediate command implementation.

use color_eyre::eyre::WrapErr;
use log::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{
    Result,
    api::{client::Client, traits::RemediationApi, types::PackagePatch},
    cli,
    command::{common, report},
    config::Config,
    error::DepmendError,
    manifest::{maven::Maven, traits::ManifestParser, types::Ecosystem},
};

/// Execute Maven remediation against the configured POM file.
pub async fn execute(
    config: &Config,
    args: &cli::MavenRemediateArgs,
) -> Result<()> {
    let dry_run = args.dry_run.unwrap_or(config.dry_run);

    info!("starting maven remediation");
    debug!("file: {}, dry run: {}", args.file.display(), dry_run);

    let api = Client::new(&config.api_url, config.api_key.clone())?;
    let parser = Maven::new();

    run(&api, &parser, &args.file, dry_run).await
}

/// Maven remediation workflow: parse the POM, analyze, then report or
/// rewrite the dependency versions in place.
async fn run(
    api: &dyn RemediationApi,
    parser: &dyn ManifestParser,
    file: &Path,
    dry_run: bool,
) -> Result<()> {
    common::ensure_exists(file)?;

    let packages = parser.parse(file)?;
    debug!("parsed {} packages from {}", packages.len(), file.display());

    if packages.is_empty() {
        println!("\nNo packages found in {}", file.display());
        return Ok(());
    }

    let refs = common::to_package_refs(&packages);
    let response = api.analyze_packages(Ecosystem::Maven, refs).await?;
    common::log_analysis(&response);

    if response.patches.is_empty() {
        println!("\nNo patches needed - all packages are up to date!");
        return Ok(());
    }

    if dry_run {
        debug!("dry-run mode: no changes will be made");
        report::maven_dry_run(&response.patches, file);
        return Ok(());
    }

    println!(
        "\nApplying {} patches to {}...\n",
        response.patches.len(),
        file.display()
    );

    apply(parser, file, &response.patches)?;

    println!(
        "\nSuccessfully updated {} with {} patches!",
        file.display(),
        response.patches.len()
    );
    println!("\nNext steps:");
    println!("  1. Review the changes in {}", file.display());
    println!("  2. Run: mvn clean install");
    println!("  3. Test your application");

    Ok(())
}

/// Rewrite the POM from all patches at once, validate, then persist.
fn apply(
    parser: &dyn ManifestParser,
    file: &Path,
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

    let updated = parser.update(file, &updates)?;

    if !parser.validate(&updated) {
        return Err(DepmendError::validation_failed(
            file.display().to_string(),
        )
        .into());
    }

    fs::write(file, updated)
        .wrap_err_with(|| format!("failed to write {}", file.display()))?;

    Ok(())
}
