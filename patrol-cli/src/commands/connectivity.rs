//! Connectivity test command handler
//!
//! Merges manual and catalog destinations, runs the test through the server
//! and renders successful and failed connections separately.

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use patrol_client::{ClientError, PatrolClient};
use patrol_core::domain::destination::Destination;
use patrol_core::domain::probe::ProbeResult;

use crate::config::Config;

/// Arguments of `patrol test`
#[derive(Args)]
pub struct TestArgs {
    /// Destinations to probe, e.g. `google.com:443` or `http://example.com`
    ///
    /// Each value may itself hold several destinations separated by commas
    /// or whitespace.
    destinations: Vec<String>,

    /// Add a catalog destination by name (repeatable)
    #[arg(long = "preset", value_name = "NAME")]
    presets: Vec<String>,

    /// Label of the cluster the test runs from, used in the report
    #[arg(long, value_name = "LABEL")]
    source: Option<String>,

    /// Print raw results as JSON
    #[arg(long)]
    json: bool,
}

/// Run a connectivity test
pub async fn run_test(args: TestArgs, config: &Config) -> Result<()> {
    let client = PatrolClient::new(&config.server_url);

    let manual = split_destinations(&args.destinations);
    let presets = if args.presets.is_empty() {
        Vec::new()
    } else {
        let catalog = client.list_destinations().await?;
        resolve_presets(&args.presets, &catalog)?
    };

    let destinations = merge_destinations(manual, presets);
    if destinations.is_empty() {
        bail!("Please provide at least one destination.");
    }

    let source = args.source.as_deref().unwrap_or("the cluster");
    if !args.json {
        println!(
            "{}",
            format!(
                "Testing connectivity from {} to {}...",
                source,
                destinations.join(", ")
            )
            .bold()
        );
        println!();
    }

    let results = match client.run_test(destinations).await {
        Ok(results) => results,
        Err(err) => {
            print_run_failure(&err);
            return Err(err.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results, source);
    }

    Ok(())
}

/// Splits free-form destination arguments on commas and whitespace
fn split_destinations(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Looks up catalog addresses by entry name (case-insensitive)
///
/// Addresses holding a comma are refused here: the server rejects them since
/// the probe agent receives its destinations comma-joined.
fn resolve_presets(names: &[String], catalog: &[Destination]) -> Result<Vec<String>> {
    names
        .iter()
        .map(|name| {
            let Some(destination) = catalog
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
            else {
                let known: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
                bail!(
                    "Unknown preset '{}'. Available presets: {}",
                    name,
                    known.join(", ")
                );
            };

            if destination.address.contains(',') {
                bail!(
                    "Preset '{}' has address '{}', which contains a comma and cannot be tested",
                    destination.name,
                    destination.address
                );
            }

            Ok(destination.address.clone())
        })
        .collect()
}

/// Concatenates both lists, keeping the first occurrence of each destination
fn merge_destinations(manual: Vec<String>, presets: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for destination in manual.into_iter().chain(presets) {
        if !merged.contains(&destination) {
            merged.push(destination);
        }
    }
    merged
}

fn partition_results(results: &[ProbeResult]) -> (Vec<&ProbeResult>, Vec<&ProbeResult>) {
    results.iter().partition(|r| r.is_success())
}

fn print_results(results: &[ProbeResult], source: &str) {
    if results.is_empty() {
        println!(
            "{}",
            format!("No test results to display for {}.", source).yellow()
        );
        return;
    }

    let (successful, failed) = partition_results(results);

    println!("{}", "Successful connections".green().bold());
    if successful.is_empty() {
        println!("  {}", "No successful connections.".dimmed());
    }
    for result in &successful {
        print_result(result);
    }
    println!();

    println!("{}", "Failed connections".red().bold());
    if failed.is_empty() {
        println!("  {}", "No failed connections.".dimmed());
    }
    for result in &failed {
        print_result(result);
    }
    println!();

    if failed.is_empty() {
        println!(
            "{}",
            format!(
                "🎉 Hooray! All {} connection(s) from {} were successful! 🎉",
                successful.len(),
                source
            )
            .green()
            .bold()
        );
    } else {
        println!(
            "{} of {} connection(s) failed.",
            failed.len().to_string().red().bold(),
            results.len()
        );
    }
}

fn print_result(result: &ProbeResult) {
    let status = if result.is_success() {
        "SUCCESS".green()
    } else {
        "FAILED".red()
    };

    println!("  {} {}", "▸".cyan(), result.destination.bold());
    println!("    Status:   {}", status);
    println!("    Details:  {}", result.details);
    if let Some(duration) = &result.duration {
        println!("    Duration: {}", duration.dimmed());
    }
}

fn print_run_failure(err: &ClientError) {
    eprintln!("{}", "Connectivity test failed".red().bold());
    if let Some(category) = err.category() {
        eprintln!("  Category: {}", category);
    }
    if let ClientError::ApiError {
        run_id: Some(run_id),
        ..
    } = err
    {
        eprintln!("  Run:      {}", run_id);
    }
    if let Some(logs) = err.logs() {
        eprintln!();
        eprintln!("{}", "Probe agent logs:".bold());
        for line in logs.lines() {
            eprintln!("  {}", line.dimmed());
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol_core::domain::probe::ProbeStatus;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn result(destination: &str, status: ProbeStatus) -> ProbeResult {
        ProbeResult {
            destination: destination.to_string(),
            status,
            details: String::new(),
            duration: None,
        }
    }

    #[test]
    fn test_split_destinations() {
        let args = strings(&["google.com:443,example.com:80", "  8.8.8.8:53\n1.1.1.1:53 ", ",,"]);
        assert_eq!(
            split_destinations(&args),
            strings(&["google.com:443", "example.com:80", "8.8.8.8:53", "1.1.1.1:53"])
        );
    }

    #[test]
    fn test_merge_preserves_order_and_dedupes() {
        let merged = merge_destinations(
            strings(&["b.com:443", "a.com:443", "b.com:443"]),
            strings(&["a.com:443", "c.com:443"]),
        );
        assert_eq!(merged, strings(&["b.com:443", "a.com:443", "c.com:443"]));
    }

    #[test]
    fn test_resolve_presets() {
        let catalog = vec![
            Destination::new("Google DNS", "8.8.8.8:53"),
            Destination::new("Example", "http://example.com"),
        ];

        let resolved = resolve_presets(&strings(&["example", "Google DNS"]), &catalog).unwrap();
        assert_eq!(resolved, strings(&["http://example.com", "8.8.8.8:53"]));

        let err = resolve_presets(&strings(&["Nope"]), &catalog).unwrap_err();
        assert!(err.to_string().contains("Google DNS, Example"));
    }

    #[test]
    fn test_resolve_presets_rejects_comma_addresses() {
        let catalog = vec![
            Destination::new("Search", "https://api.example.com/search?q=a,b"),
            Destination::new("Example", "http://example.com"),
        ];

        let err = resolve_presets(&strings(&["Example", "search"]), &catalog).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Preset 'Search'"));
        assert!(message.contains("contains a comma"));
    }

    #[test]
    fn test_partition_results() {
        let results = vec![
            result("a.com:443", ProbeStatus::Success),
            result("b.com:443", ProbeStatus::Failed),
            result("c.com:443", ProbeStatus::Success),
        ];

        let (successful, failed) = partition_results(&results);
        assert_eq!(successful.len(), 2);
        assert_eq!(failed[0].destination, "b.com:443");
    }
}
