use anyhow::Result;
use colored::Colorize;
use estimate_gate::{
    estimator::{get_breakdown, get_timeline, EstimateInput},
    preview::rough_estimate,
};

use crate::cli::EstimateArgs;

/// Execute the estimate command
///
/// Prints the free preview range; `--detailed` adds the paid-tier figures.
pub fn execute(args: &EstimateArgs) -> Result<()> {
    let input = EstimateInput::parse(
        args.area,
        &args.specification,
        &args.location,
        &args.floors,
    )?;

    println!("{}", "Estimate:".bold());
    println!(
        "  {}: {} sq ft, {} specification, {} location, {}",
        "Input".cyan(),
        input.area,
        input.specification,
        input.location,
        input.floors
    );

    let preview = rough_estimate(&input);
    println!(
        "  {}: {} - {}",
        "Preview".cyan(),
        format_inr(preview.min_cost),
        format_inr(preview.max_cost)
    );

    if !args.detailed {
        return Ok(());
    }

    let cost = input.cost();
    println!(
        "  {}: {} - {}",
        "Detailed Range".cyan(),
        format_inr(cost.min_cost).green(),
        format_inr(cost.max_cost).green()
    );
    println!("  {}: {}", "Timeline".cyan(), get_timeline(input.area));
    println!();

    println!("{}", "Breakdown:".bold());
    for line in get_breakdown(cost.min_cost, cost.max_cost) {
        println!(
            "  {:<16} {:>3}%  {} - {}",
            line.component,
            line.percentage,
            format_inr(line.min_amount),
            format_inr(line.max_amount)
        );
    }

    Ok(())
}

/// Rupee amount with Indian digit grouping, e.g. `₹20,00,000`
fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), tail)
}
