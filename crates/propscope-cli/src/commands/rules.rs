use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use propscope_core::{resolve_rule, PropscopeSettings};

pub fn execute(settings: &PropscopeSettings, path: Option<PathBuf>) -> Result<()> {
    if settings.rules.is_empty() {
        println!("{} No folder rules configured.", "Info:".cyan().bold());
        return Ok(());
    }

    match path {
        None => list_rules(settings),
        Some(path) => resolve(settings, &path),
    }
    Ok(())
}

fn list_rules(settings: &PropscopeSettings) {
    println!("{}", "Folder rules (first match wins):".bold());
    for (index, rule) in settings.rules.iter().enumerate() {
        let template = if rule.template_enabled { ", template" } else { "" };
        let status = if rule.is_inert() {
            " (inert)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {}. {} -> {}{}{}",
            index + 1,
            rule.normalized_prefix(),
            rule.slug(),
            template,
            status
        );
    }
}

fn resolve(settings: &PropscopeSettings, path: &Path) {
    let path_str = path.to_string_lossy();
    match resolve_rule(&path_str, &settings.rules) {
        None => println!("{} No rule governs {}", "Info:".cyan().bold(), path.display()),
        Some(rule) => {
            println!(
                "{} governed by '{}' ({})",
                path.display(),
                rule.slug(),
                rule.normalized_prefix()
            );
            let managed = settings.managed_keys();
            if managed.is_empty() {
                println!("  No managed properties configured.");
            } else {
                for alias in &managed {
                    println!(
                        "  {} -> {}",
                        alias,
                        settings.storage.storage_key(rule.slug(), alias)
                    );
                }
            }
        }
    }
}
