//! Interactive target and installation prompts.

use dialoguer::{Input, Select, theme::ColorfulTheme};

/// Asks the user to pick one of `items`.
///
/// Returns `None` when there is nothing to pick or the terminal is not
/// interactive.
pub fn choose(prompt: &str, items: &[&str]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact();

    match selection {
        Ok(idx) => items.get(idx).map(|s| s.to_string()),
        Err(e) => {
            log::debug!("Selection prompt failed: {}", e);
            None
        }
    }
}

/// Asks the user for a product's installation directory.
pub fn prompt_install_dir(product: &str) -> Option<String> {
    let answer = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Installation directory of {}", product))
        .interact_text();

    match answer {
        Ok(dir) => Some(dir),
        Err(e) => {
            log::debug!("Installation prompt failed: {}", e);
            None
        }
    }
}
