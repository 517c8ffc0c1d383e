//! Console output for the audit run

use crate::audit::summary::AccessSummary;
use crate::core::config::AuditConfig;
use crate::core::error::AuditError;
use crate::github::types::Visibility;
use crate::orchestration::remediation::RemediationReport;
use crate::orchestration::secret_auditor::{AccessAudit, SecretPresence};
use colored::Colorize;

/// Names listed when some repositories could not be resolved
const UNRESOLVED_LIMIT: usize = 5;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn print_header(title: &str) {
    let bar = "=".repeat(60);
    println!("\n{}", bar.cyan().bold());
    println!("{}", format!("{:^60}", title).cyan().bold());
    println!("{}\n", bar.cyan().bold());
}

pub fn print_section(title: &str) {
    println!("\n{}\n", format!("▶ {}", title).blue().bold());
}

pub fn print_run_banner(config: &AuditConfig) {
    println!("{} {}", "Organization:".cyan(), config.organization.bold());
    println!(
        "{} {}",
        "Repositories to check:".cyan(),
        config.repositories.len().to_string().bold()
    );
    println!(
        "{} {}\n",
        "Required secrets:".cyan(),
        config.required_secrets.join(", ").bold()
    );
}

pub fn print_identity(login: &str, organization: &str) {
    println!("{} {}", "✓ Authenticated as:".green(), login.bold());
    println!("{} {}\n", "✓ Organization access:".green(), organization.bold());
}

pub fn print_presence(presence: &SecretPresence) {
    println!(
        "{}\n",
        format!("Found {} organization secret(s)", presence.total_secrets).cyan()
    );

    for status in &presence.statuses {
        let secret = &status.secret;
        if status.exists {
            println!("{}", format!("✓ {}", secret.name).green());
            println!("  Visibility: {}", secret.visibility.as_str().cyan());
            println!("  Updated: {}", secret.updated_display().cyan());
        } else {
            println!("{}", format!("✗ {} - NOT FOUND", secret.name).red());
        }
    }
    println!();
}

pub fn print_access_audit(audit: &AccessAudit) {
    if !audit.unverified.is_empty() {
        println!(
            "{}",
            format!(
                "? {} roster repositories could not be found",
                audit.unverified.len()
            )
            .magenta()
        );
        for (repository, err) in &audit.unverified {
            println!("  • {} ({})", repository, err);
        }
        println!();
    }

    for secret in &audit.secrets {
        match &secret.outcome {
            Err(err) => {
                println!(
                    "{}\n",
                    format!("✗ Error checking {}: {}", secret.name, err).red()
                );
            }
            Ok(allowed) => {
                println!("{}", format!("{}:", secret.name).cyan());
                println!("  Visibility: {}", secret.visibility.as_str().yellow());
                match secret.visibility {
                    Visibility::All => {
                        println!("  {}", "✓ Available to ALL repositories".green())
                    }
                    Visibility::Private => println!(
                        "  {}",
                        "⚠ Available to PRIVATE repositories only".yellow()
                    ),
                    Visibility::Selected | Visibility::Unknown => println!(
                        "  {}",
                        format!("⚠ Available to {} selected repositories", allowed).yellow()
                    ),
                }
                println!();
            }
        }
    }
}

pub fn print_summary(summary: &AccessSummary, example_limit: usize) {
    let total = summary.roster_size;
    println!(
        "{}",
        format!("✓ Full Access: {}/{}", summary.full.len(), total).green()
    );
    println!(
        "{}",
        format!("⚠ Partial Access: {}/{}", summary.partial.len(), total).yellow()
    );
    println!(
        "{}",
        format!("✗ No Access: {}/{}", summary.none.len(), total).red()
    );
    if !summary.not_found.is_empty() {
        println!(
            "{}",
            format!("? Not Found: {}/{}", summary.not_found.len(), total).magenta()
        );
    }

    if !summary.partial.is_empty() {
        println!("\n{}", "Repositories with PARTIAL access:".yellow());
        for (repository, missing) in summary.partial.iter().take(example_limit) {
            println!("  • {}", repository);
            println!("    Missing: {}", missing.join(", ").red());
        }
        if let Some(more) = overflow_line(summary.partial.len(), example_limit) {
            println!("{}", more);
        }
    }

    if !summary.none.is_empty() {
        println!("\n{}", "Repositories without access:".red());
        for line in example_lines(&summary.none, example_limit) {
            println!("{}", line);
        }
    }

    if !summary.not_found.is_empty() {
        println!(
            "\n{}",
            "Repositories not found (may not exist yet):".magenta()
        );
        for line in example_lines(&summary.not_found, example_limit) {
            println!("{}", line);
        }
    }

    println!();
}

pub fn print_all_good() {
    println!("{}\n", "✓ ALL REPOSITORIES HAVE PROPER ACCESS!".green().bold());
}

pub fn print_grant_prompt(config: &AuditConfig) {
    println!("{}", RULE.yellow());
    println!(
        "\n{}",
        format!(
            "Would you like to grant access to all {} repositories?",
            config.repositories.len()
        )
        .bold()
    );
    println!(
        "{}\n",
        format!(
            "This will set the allow-list of {} to exactly the listed repos.",
            config.required_secrets.join(", ")
        )
        .yellow()
    );
}

pub fn print_manual_instructions(config: &AuditConfig) {
    println!("\n{}", "Skipped automatic grant.".yellow());
    println!("You can update manually at:");
    println!("{}\n", config.secrets_settings_url().cyan());
}

pub fn print_missing_secrets(config: &AuditConfig) {
    println!("{}", "✗ Organization secrets not properly configured.".red());
    println!("\n{}", "Action required:".yellow());
    println!("Set up organization-level secrets at:");
    println!("{}\n", config.secrets_settings_url().cyan());
}

/// Closing output for a run that stopped on an error
pub fn print_failure(error: &AuditError, config: Option<&AuditConfig>) {
    if let AuditError::SecretsMissing { .. } = error
        && let Some(config) = config
    {
        print_missing_secrets(config);
        return;
    }

    eprintln!("\n{} {}", "✗".red(), error.to_string().red());
    eprintln!("  code: {}", error.code());

    let actions = error.suggested_actions();
    if !actions.is_empty() {
        println!("\n{}", "Please ensure:".yellow());
        for action in actions {
            println!("  • {}", action);
        }
    }
}

pub fn print_remediation(report: &RemediationReport) {
    println!(
        "{}",
        format!("Found {} repositories", report.resolved.len()).green()
    );

    if !report.unresolved.is_empty() {
        println!(
            "{}",
            format!(
                "⚠ Could not find {} repositories:",
                report.unresolved.len()
            )
            .yellow()
        );
        let names: Vec<String> = report.unresolved.iter().map(|(n, _)| n.clone()).collect();
        for line in example_lines(&names, UNRESOLVED_LIMIT) {
            println!("{}", line);
        }
        println!();
    }

    if report.nothing_to_grant() {
        println!(
            "{}\n",
            "✗ No repository could be resolved; allow-lists left unchanged".red()
        );
        return;
    }

    for update in &report.updates {
        println!("\n{}", format!("Setting access for {}...", update.secret).cyan());
        match &update.result {
            Ok(()) => println!(
                "{}",
                format!(
                    "✓ Successfully granted access to {} repositories",
                    report.resolved.len()
                )
                .green()
            ),
            Err(err) => println!("{}", format!("✗ Failed: {}", err).red()),
        }
    }
    println!();

    if report.success() {
        println!("\n{}", "✓ SUCCESS!".green().bold());
        println!(
            "{}\n",
            "All repositories now have access to the required secrets!".green()
        );
    } else {
        println!("\n{}", "⚠ PARTIAL SUCCESS".yellow());
        println!(
            "{}\n",
            "Some secrets could not be updated. Check errors above.".yellow()
        );
    }
}

/// Bullet lines for up to `limit` names plus an overflow line
pub fn example_lines(names: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = names
        .iter()
        .take(limit)
        .map(|n| format!("  • {}", n))
        .collect();
    if let Some(more) = overflow_line(names.len(), limit) {
        lines.push(more);
    }
    lines
}

pub fn overflow_line(total: usize, limit: usize) -> Option<String> {
    (total > limit).then(|| format!("  ... and {} more", total - limit))
}
