//! Command implementations for the CLI tool.

use std::path::Path;

use splashpatch::{
    CenterCropFitter, PatchConfig, TargetConfig, backup, cache, extract, install, patch,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{OutputFormatter, create_formatter};
use crate::select;
use crate::{OutputFormat, TargetArgs};

/// Settings shared by every command.
pub struct Context<'a> {
    pub config_path: &'a Path,
    pub format: OutputFormat,
}

/// One target chosen from the configuration document.
struct Selection {
    target: TargetConfig,
    default_user: String,
    product: String,
    category: String,
}

/// Targets command implementation
pub fn targets(ctx: &Context<'_>) -> ExitCode {
    let config = match load_config(ctx.config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    print!("{}", create_formatter(ctx.format).format_targets(&config));
    ExitCode::Success
}

/// Extract command implementation
pub fn extract(
    ctx: &Context<'_>,
    target: &TargetArgs,
    install_dir: Option<String>,
    output_dir: &Path,
) -> ExitCode {
    let formatter = create_formatter(ctx.format);

    let selection = match select_target(ctx.config_path, target) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let root = match resolve_install_dir(&selection.product, install_dir) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let result = match extract::extract(&root, &selection.target, output_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_extract_result(&result));

    if result.is_ok() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

/// Inspect command implementation
pub fn inspect(ctx: &Context<'_>, target: &TargetArgs, install_dir: Option<String>) -> ExitCode {
    let formatter = create_formatter(ctx.format);

    let selection = match select_target(ctx.config_path, target) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let root = match resolve_install_dir(&selection.product, install_dir) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let report = match patch::inspect(&root, &selection.target) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_inspect_result(&report));

    if report.is_patchable() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

/// Options for the patch command.
pub struct PatchArgs<'a> {
    pub target: &'a TargetArgs,
    pub install_dir: Option<String>,
    pub image: &'a Path,
    pub user: Option<String>,
    pub no_cache: bool,
}

/// Patch command implementation
pub fn patch(ctx: &Context<'_>, args: PatchArgs<'_>) -> ExitCode {
    let formatter = create_formatter(ctx.format);

    if !args.image.is_file() {
        eprintln!("Error: replacement image not found: {}", args.image.display());
        return ExitCode::BadArgs;
    }

    let selection = match select_target(ctx.config_path, args.target) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let root = match resolve_install_dir(&selection.product, args.install_dir) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let result = match patch::patch(&root, args.image, &selection.target, &CenterCropFitter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_patch_result(&result));

    if args.no_cache {
        return ExitCode::Success;
    }
    invalidate_target(&*formatter, &selection, args.user.as_deref())
}

/// Restore command implementation
pub fn restore(
    ctx: &Context<'_>,
    target: &TargetArgs,
    install_dir: Option<String>,
    user: Option<String>,
    no_cache: bool,
) -> ExitCode {
    let formatter = create_formatter(ctx.format);

    let selection = match select_target(ctx.config_path, target) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let root = match resolve_install_dir(&selection.product, install_dir) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let dir = format!("{}{}", root, selection.target.source_dir());
    let result = match backup::restore(&dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_restore_result(&result));

    let restore_code = if result.is_ok() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    };
    if no_cache {
        return restore_code;
    }
    restore_code.then(invalidate_target(&*formatter, &selection, user.as_deref()))
}

/// Invalidate command implementation
pub fn invalidate(ctx: &Context<'_>, target: &TargetArgs, user: Option<String>) -> ExitCode {
    let formatter = create_formatter(ctx.format);

    let selection = match select_target(ctx.config_path, target) {
        Ok(s) => s,
        Err(code) => return code,
    };

    invalidate_target(&*formatter, &selection, user.as_deref())
}

/// Deletes stale cache files for the selected target, if it has a cache.
fn invalidate_target(
    formatter: &dyn OutputFormatter,
    selection: &Selection,
    user: Option<&str>,
) -> ExitCode {
    let Some(descriptor) = &selection.target.cache else {
        log::info!(
            "No cache configured for {}/{}",
            selection.category,
            selection.product
        );
        return ExitCode::Success;
    };

    let user = user.unwrap_or(selection.default_user.as_str());
    let result = match cache::invalidate(user, descriptor) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_invalidation_result(&result));

    if result.is_ok() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

fn load_config(path: &Path) -> Result<PatchConfig, ExitCode> {
    PatchConfig::from_path(path).map_err(|e| {
        eprintln!("Error: {}", e);
        error_to_exit_code(&e)
    })
}

/// Loads the configuration and resolves the category and product,
/// prompting for whichever was not given.
fn select_target(config_path: &Path, args: &TargetArgs) -> Result<Selection, ExitCode> {
    let config = load_config(config_path)?;

    let category = match &args.category {
        Some(c) => c.clone(),
        None => select::choose("Select a category", &config.categories()).ok_or_else(|| {
            eprintln!("Error: no category selected (use --category)");
            ExitCode::BadArgs
        })?,
    };
    let product = match &args.product {
        Some(p) => p.clone(),
        None => select::choose("Select a product", &config.products(&category)).ok_or_else(
            || {
                eprintln!("Error: no product selected (use --product)");
                ExitCode::BadArgs
            },
        )?,
    };

    let target = config.target(&category, &product).map_err(|e| {
        eprintln!("Error: {}", e);
        error_to_exit_code(&e)
    })?;
    log::debug!("Selected target {}/{}", category, product);

    Ok(Selection {
        target: target.clone(),
        default_user: config.default_user,
        product,
        category,
    })
}

/// Resolves the installation root: the flag, then the registry and the
/// environment variable named after the product, then an interactive prompt.
fn resolve_install_dir(product: &str, flag: Option<String>) -> Result<String, ExitCode> {
    let dir = match flag {
        Some(raw) => install::normalize_install_dir(&raw),
        None => install::locate_install_dir(product).or_else(|| {
            select::prompt_install_dir(product)
                .as_deref()
                .and_then(install::normalize_install_dir)
        }),
    };

    match dir {
        Some(dir) => {
            log::info!("{} installation: {}", product, dir);
            Ok(dir)
        }
        None => {
            eprintln!(
                "Error: no installation directory for {} (use --install-dir)",
                product
            );
            Err(ExitCode::BadArgs)
        }
    }
}
