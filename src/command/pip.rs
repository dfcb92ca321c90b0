//! pip remediate command implementation.

use color_eyre::eyre::WrapErr;
use log::*;

use crate::{
    Result,
    api::{client::Client, traits::RemediationApi},
    cli,
    command::{common, report},
    config::Config,
    manifest::types::Ecosystem,
    pip::{PipCli, PipService},
};

/// Execute pip remediation with services built from configuration.
pub async fn execute(
    config: &Config,
    args: &cli::PipRemediateArgs,
) -> Result<()> {
    let python_path = args
        .python_path
        .clone()
        .unwrap_or_else(|| config.python_path.clone());
    let dry_run = args.dry_run.unwrap_or(config.dry_run);
    let use_alias = args.use_alias.unwrap_or(config.use_alias);

    info!("starting pip remediation");
    debug!("python: {}, dry run: {}", python_path, dry_run);

    let service = PipCli::new(
        python_path,
        config.pkg_url.clone(),
        config.api_key.clone(),
        use_alias,
    );
    let api = Client::new(&config.api_url, config.api_key.clone())?;

    run(&service, &api, &config.pkg_url, dry_run, use_alias).await
}

/// pip remediation workflow: list installed packages, analyze, then report
/// or apply each patch sequentially.
async fn run(
    service: &dyn PipService,
    api: &dyn RemediationApi,
    pkg_url: &str,
    dry_run: bool,
    use_alias: bool,
) -> Result<()> {
    let packages = service.list_packages().await?;
    debug!("collected {} installed packages", packages.len());

    if packages.is_empty() {
        println!("\nNo packages found");
        return Ok(());
    }

    let refs = common::installed_to_refs(&packages);
    let response = api.analyze_packages(Ecosystem::Pypi, refs).await?;
    common::log_analysis(&response);

    if response.patches.is_empty() {
        println!("\nNo patches needed - all packages are up to date!");
        return Ok(());
    }

    if dry_run {
        debug!("dry-run mode: no changes will be made");
        report::pip_dry_run(&response.patches, use_alias, pkg_url);
        return Ok(());
    }

    let total = response.patches.len();
    println!("\nApplying {} patches...\n", total);

    for (i, patch) in response.patches.iter().enumerate() {
        let chosen = patch.select(use_alias);

        println!(
            "[{}/{}] Patching {} ({} -> {})...",
            i + 1,
            total,
            patch.package_name,
            patch.version,
            chosen.version
        );

        // pip cannot uninstall itself while running, so its own patch
        // upgrades in place instead of uninstall+install
        let result = if patch.package_name.eq_ignore_ascii_case("pip") {
            service.apply_patch_for_pip(patch).await
        } else {
            service.apply_patch(patch).await
        };

        result.wrap_err_with(|| {
            format!(
                "[{}/{}] failed to patch {}",
                i + 1,
                total,
                patch.package_name
            )
        })?;

        println!("  patched {}\n", patch.package_name);
    }

    println!("\nSuccessfully patched {} packages!", total);

    Ok(())
}
