//! Output formatting for CLI operations.

use serde_json::json;
use splashpatch::{
    ExtractResult, InspectResult, InvalidationResult, PatchConfig, PatchResult, RestoreResult,
};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the configured targets
    fn format_targets(&self, config: &PatchConfig) -> String;

    /// Formats patch results
    fn format_patch_result(&self, result: &PatchResult) -> String;

    /// Formats restore results
    fn format_restore_result(&self, result: &RestoreResult) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;

    /// Formats an inspection report
    fn format_inspect_result(&self, result: &InspectResult) -> String;

    /// Formats cache invalidation results
    fn format_invalidation_result(&self, result: &InvalidationResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_targets(&self, config: &PatchConfig) -> String {
        let mut output = String::new();

        for (category, products) in &config.categories {
            output.push_str(&format!("{}\n", category));
            for (product, target) in products {
                let cache = target
                    .cache
                    .as_ref()
                    .map(|c| c.prefix.as_str())
                    .unwrap_or("-");
                output.push_str(&format!(
                    "  {:<24} {} ({} items, cache: {})\n",
                    product,
                    target.source,
                    target.items.len(),
                    cache
                ));
            }
        }
        output.push_str(&format!("Default user: {}\n", config.default_user));

        output
    }

    fn format_patch_result(&self, result: &PatchResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("Patched {}\n", result.archive.display()));
        output.push_str(&format!("  Backup:  {}\n", result.backup.as_str()));
        output.push_str(&format!("  Entries: {}\n", result.total_entries));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for entry in &result.replaced {
            output.push_str(&format!(
                "{:>11} {:>6} {:>10} {}\n",
                format!("{}x{}", entry.width, entry.height),
                format!("{:?}", entry.format),
                humanize_bytes(entry.bytes as u64),
                entry.path
            ));
        }

        output
    }

    fn format_restore_result(&self, result: &RestoreResult) -> String {
        let mut output = String::new();

        if result.is_empty() {
            output.push_str("No backups found\n");
            return output;
        }

        for item in &result.restored {
            output.push_str(&format!("Restored {}\n", item.original.display()));
        }

        if !result.failures.is_empty() {
            output.push_str("\nFailures:\n");
            for (path, error) in &result.failures {
                output.push_str(&format!("  {}: {}\n", path.display(), error));
            }
        }

        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Extracted {} files ({})\n",
            result.extracted.len(),
            humanize_bytes(result.bytes_extracted())
        ));
        for file in &result.extracted {
            output.push_str(&format!("  {} -> {}\n", file.entry, file.path.display()));
        }

        if !result.missing.is_empty() {
            output.push_str("\nNot in archive:\n");
            for entry in &result.missing {
                output.push_str(&format!("  {}\n", entry));
            }
        }

        if !result.failures.is_empty() {
            output.push_str("\nFailures:\n");
            for (entry, error) in &result.failures {
                output.push_str(&format!("  {}: {}\n", entry, error));
            }
        }

        output
    }

    fn format_inspect_result(&self, result: &InspectResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("Archive: {}\n", result.archive.display()));
        output.push_str(&format!(
            "Backup:  {}\n",
            if result.has_backup { "Yes" } else { "No" }
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for entry in &result.entries {
            if !entry.present {
                output.push_str(&format!(
                    "{:>11} {:>6} {:>10} {}\n",
                    "missing", "-", "-", entry.path
                ));
                continue;
            }
            let dimensions = entry
                .dimensions
                .map(|(w, h)| format!("{}x{}", w, h))
                .unwrap_or_else(|| "?".to_string());
            let format = entry
                .format
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "?".to_string());
            output.push_str(&format!(
                "{:>11} {:>6} {:>10} {}\n",
                dimensions,
                format,
                humanize_bytes(entry.bytes as u64),
                entry.path
            ));
        }

        output
    }

    fn format_invalidation_result(&self, result: &InvalidationResult) -> String {
        let mut output = String::new();

        for dir in &result.cache_dirs {
            output.push_str(&format!("Cache directory: {}\n", dir.display()));
        }
        output.push_str(&format!("Deleted {} cache files\n", result.deleted.len()));

        if !result.failures.is_empty() {
            output.push_str("\nFailures:\n");
            for (path, error) in &result.failures {
                output.push_str(&format!("  {}: {}\n", path.display(), error));
            }
        }

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_targets(&self, config: &PatchConfig) -> String {
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_patch_result(&self, result: &PatchResult) -> String {
        let obj = json!({
            "archive": result.archive.display().to_string(),
            "backup": result.backup.as_str(),
            "total_entries": result.total_entries,
            "replaced": result.replaced.iter().map(|e| json!({
                "path": e.path,
                "width": e.width,
                "height": e.height,
                "format": format!("{:?}", e.format),
                "bytes": e.bytes,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_restore_result(&self, result: &RestoreResult) -> String {
        let obj = json!({
            "success": result.is_ok(),
            "restored": result.restored.iter().map(|i| json!({
                "backup": i.backup.display().to_string(),
                "original": i.original.display().to_string(),
            })).collect::<Vec<_>>(),
            "failures": result.failures.iter().map(|(p, e)| json!({"path": p.display().to_string(), "error": e.to_string()})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "success": result.is_ok(),
            "bytes_extracted": result.bytes_extracted(),
            "extracted": result.extracted.iter().map(|f| json!({
                "entry": f.entry,
                "path": f.path.display().to_string(),
                "bytes": f.bytes,
            })).collect::<Vec<_>>(),
            "missing": result.missing,
            "failures": result.failures.iter().map(|(p, e)| json!({"entry": p, "error": e.to_string()})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_inspect_result(&self, result: &InspectResult) -> String {
        let obj = json!({
            "archive": result.archive.display().to_string(),
            "has_backup": result.has_backup,
            "patchable": result.is_patchable(),
            "entries": result.entries.iter().map(|e| json!({
                "path": e.path,
                "present": e.present,
                "format": e.format.map(|f| format!("{:?}", f)),
                "width": e.dimensions.map(|(w, _)| w),
                "height": e.dimensions.map(|(_, h)| h),
                "bytes": e.bytes,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_invalidation_result(&self, result: &InvalidationResult) -> String {
        let obj = json!({
            "success": result.is_ok(),
            "cache_dirs": result.cache_dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>(),
            "deleted": result.deleted.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "failures": result.failures.iter().map(|(p, e)| json!({"path": p.display().to_string(), "error": e.to_string()})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(512), "512 B");
        assert_eq!(humanize_bytes(2048), "2.0 KB");
        assert_eq!(humanize_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_restore_result_empty() {
        let output = HumanFormatter.format_restore_result(&RestoreResult::default());
        assert_eq!(output, "No backups found\n");
    }

    #[test]
    fn test_json_invalidation_result() {
        let output = JsonFormatter.format_invalidation_result(&InvalidationResult::default());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["deleted"].as_array().unwrap().len(), 0);
    }
}
