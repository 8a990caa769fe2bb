use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use serde::Serialize;

use rfa_engine::{
    compute_rebates, top_clients, ClientRebateSummary, EngineOptions, PerSupplierCalculation,
    RebateReport,
};
use rfa_ingest::{
    default_assignments, default_configuration, load_revenue_file, load_setup_file, FamilyMapping,
    LoadOutcome, RfaSetup,
};

/// Year-end rebate (RFA) report over a revenue export.
#[derive(Parser, Debug)]
#[command(name = "rfa-report", version, about, long_about = None)]
struct Cli {
    /// Revenue CSV export
    revenue_csv: PathBuf,

    /// JSON setup with contracts, agreements and client assignments.
    /// Without it every client gets the built-in 2024 contract and agreements.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluation year (default: current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Number of clients to list, by payout
    #[arg(short, long)]
    top: Option<usize>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

const DEFAULT_TOP: usize = 10;

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson {
    generated_at: String,
    evaluation_year: i32,
    compute_ms: u128,
    clients: Vec<ClientJson>,
    totals: TotalsJson,
    problems: ProblemsJson,
}

#[derive(Serialize)]
struct ClientJson {
    client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    standard_contract_id: Option<String>,
    total_revenue: f64,
    total_rebate: f64,
    total_bonus: f64,
    total_payout: f64,
    suppliers: Vec<SupplierJson>,
}

#[derive(Serialize)]
struct SupplierJson {
    supplier: String,
    total_revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progression_percent: Option<f64>,
    standard_rebate: f64,
    standard_bonus: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tripartites: Vec<TripartiteJson>,
    total_rebate: f64,
}

#[derive(Serialize)]
struct TripartiteJson {
    agreement: String,
    scoped_revenue: f64,
    threshold: f64,
    qualified: bool,
    rebate_amount: f64,
    progression_percent: f64,
}

#[derive(Serialize)]
struct TotalsJson {
    clients: usize,
    clients_with_contract: usize,
    clients_with_tripartite: usize,
    total_rebate: f64,
    total_bonus: f64,
    total_payout: f64,
}

#[derive(Serialize)]
struct ProblemsJson {
    skipped_rows: Vec<SkippedRowJson>,
    rejected_entries: Vec<String>,
    rejected_agreements: Vec<String>,
    contract_errors: Vec<String>,
    refused_clients: Vec<RefusalJson>,
    excluded_entries: usize,
}

#[derive(Serialize)]
struct SkippedRowJson {
    line: u64,
    reason: String,
}

#[derive(Serialize)]
struct RefusalJson {
    client_id: String,
    reason: String,
}

fn supplier_json(calc: &PerSupplierCalculation) -> SupplierJson {
    let standard = calc.standard_result.as_ref();
    SupplierJson {
        supplier: calc.supplier.clone(),
        total_revenue: calc.total_revenue,
        tier: standard.map(|s| s.tier.to_string()),
        progression_percent: standard.map(|s| s.progression_percent),
        standard_rebate: standard.map_or(0.0, |s| s.rebate_amount),
        standard_bonus: standard.map_or(0.0, |s| s.bonus_amount),
        tripartites: calc
            .tripartite_results
            .iter()
            .map(|t| TripartiteJson {
                agreement: t.agreement.label(),
                scoped_revenue: t.scoped_revenue,
                threshold: t.agreement.revenue_threshold,
                qualified: t.qualified,
                rebate_amount: t.rebate_amount,
                progression_percent: t.progression_percent,
            })
            .collect(),
        total_rebate: calc.total_rebate,
    }
}

fn client_json(summary: &ClientRebateSummary) -> ClientJson {
    ClientJson {
        client_id: summary.client_id.clone(),
        standard_contract_id: summary.standard_contract_id.clone(),
        total_revenue: summary.total_revenue(),
        total_rebate: summary.total_rebate,
        total_bonus: summary.total_bonus,
        total_payout: summary.total_payout(),
        suppliers: summary.per_supplier.iter().map(supplier_json).collect(),
    }
}

fn build_json(
    report: &RebateReport,
    outcome: &LoadOutcome,
    top: Option<usize>,
    compute_ms: u128,
) -> ReportJson {
    let clients = match top {
        Some(k) => top_clients(&report.summaries, k)
            .into_iter()
            .map(client_json)
            .collect(),
        None => report.summaries.iter().map(client_json).collect(),
    };

    ReportJson {
        generated_at: Utc::now().to_rfc3339(),
        evaluation_year: report.evaluation_year,
        compute_ms,
        clients,
        totals: TotalsJson {
            clients: report.totals.clients,
            clients_with_contract: report.totals.clients_with_contract,
            clients_with_tripartite: report.totals.clients_with_tripartite,
            total_rebate: report.totals.total_rebate,
            total_bonus: report.totals.total_bonus,
            total_payout: report.totals.total_payout(),
        },
        problems: ProblemsJson {
            skipped_rows: outcome
                .skipped
                .iter()
                .map(|s| SkippedRowJson {
                    line: s.line,
                    reason: s.reason.clone(),
                })
                .collect(),
            rejected_entries: report
                .rejected_entries
                .iter()
                .map(|r| format!("entry #{}: {}", r.index, r.error))
                .collect(),
            rejected_agreements: report
                .rejected_agreements
                .iter()
                .map(|r| format!("agreement #{}: {}", r.index, r.error))
                .collect(),
            contract_errors: report.contract_errors.iter().map(|e| e.to_string()).collect(),
            refused_clients: report
                .refused_clients
                .iter()
                .map(|r| RefusalJson {
                    client_id: r.client_id.clone(),
                    reason: r.error.to_string(),
                })
                .collect(),
            excluded_entries: report.excluded_entries,
        },
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format an amount with comma thousands separators and two decimals.
fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!(
        "{}{}.{:02}",
        sign,
        grouped.chars().rev().collect::<String>(),
        cents % 100
    )
}

fn print_human(report: &RebateReport, outcome: &LoadOutcome, top: usize, load_ms: u128, compute_ms: u128) {
    println!();
    println!("  RFA REPORT {}", report.evaluation_year);
    println!("  {:\u{2550}<64}", "");
    println!();
    println!(
        "  {} rows loaded  \u{00b7}  {} clients  \u{00b7}  {} with contract  \u{00b7}  {} with tripartite",
        outcome.entries.len(),
        report.totals.clients,
        report.totals.clients_with_contract,
        report.totals.clients_with_tripartite
    );
    println!(
        "  rebate {}  \u{00b7}  bonus {}  \u{00b7}  total payout {}",
        format_amount(report.totals.total_rebate),
        format_amount(report.totals.total_bonus),
        format_amount(report.totals.total_payout())
    );
    println!();

    let ranked = top_clients(&report.summaries, top);
    if ranked.is_empty() {
        println!("  No clients to report.");
    } else {
        println!("  {:\u{2500}<64}", "");
        for (i, summary) in ranked.iter().enumerate() {
            println!(
                "  {:>3}. {:12} revenue {:>14}  payout {:>12}",
                i + 1,
                summary.client_id,
                format_amount(summary.total_revenue()),
                format_amount(summary.total_payout())
            );
            for calc in summary.per_supplier.iter().filter(|c| c.total_rebate > 0.0) {
                let tier = calc
                    .standard_result
                    .as_ref()
                    .map(|s| format!("tier {} ({:.0}%)", s.tier, s.progression_percent))
                    .unwrap_or_else(|| "no contract".into());
                println!(
                    "       {:12} {:>14}  {:28} {:>12}",
                    calc.supplier,
                    format_amount(calc.total_revenue),
                    tier,
                    format_amount(calc.total_rebate)
                );
                for t in calc.tripartite_results.iter().filter(|t| t.qualified) {
                    println!(
                        "         + {:30} {:>12}",
                        t.agreement.label(),
                        format_amount(t.rebate_amount)
                    );
                }
            }
        }
        println!("  {:\u{2500}<64}", "");
    }

    let problems = outcome.skipped.len() + report.skipped_count() + report.contract_errors.len();
    if problems > 0 {
        println!();
        println!(
            "  {} unreadable rows \u{00b7} {} rejected entries \u{00b7} {} rejected agreements \u{00b7} {} blocked contracts \u{00b7} {} refused clients",
            outcome.skipped.len(),
            report.rejected_entries.len(),
            report.rejected_agreements.len(),
            report.contract_errors.len(),
            report.refused_clients.len()
        );
        for refusal in &report.refused_clients {
            println!("    {}: {}", refusal.client_id, refusal.error);
        }
    }
    if report.excluded_entries > 0 {
        println!("  {} rows from other years ignored", report.excluded_entries);
    }

    println!();
    println!(
        "  \u{23f1}  CSV loaded in {}ms \u{00b7} Computed in {}ms",
        load_ms, compute_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let evaluation_year = cli.year.unwrap_or_else(|| Utc::now().year());
    let options = EngineOptions { evaluation_year };

    let setup: Option<RfaSetup> = cli
        .config
        .as_ref()
        .map(|path| {
            load_setup_file(path)
                .with_context(|| format!("loading setup from {}", path.display()))
        })
        .transpose()?;
    let mapping = setup
        .as_ref()
        .map_or_else(FamilyMapping::default, RfaSetup::family_mapping);

    let load_start = Instant::now();
    let outcome = load_revenue_file(&cli.revenue_csv, &mapping)
        .with_context(|| format!("loading revenue from {}", cli.revenue_csv.display()))?;
    let load_ms = load_start.elapsed().as_millis();

    let (configuration, assignments) = match setup {
        Some(setup) => (setup.configuration, setup.assignments),
        None => {
            let configuration = default_configuration();
            let mut clients: Vec<&str> = outcome
                .entries
                .iter()
                .filter(|e| e.year == evaluation_year)
                .map(|e| e.client_id.as_str())
                .collect();
            clients.sort_unstable();
            clients.dedup();
            log::info!(
                "no setup given, assigning the default catalog to {} clients",
                clients.len()
            );
            let assignments = default_assignments(clients, &configuration);
            (configuration, assignments)
        }
    };

    let compute_start = Instant::now();
    let report = compute_rebates(&outcome.entries, &configuration, &assignments, options);
    let compute_ms = compute_start.elapsed().as_millis();

    if cli.json {
        let json = build_json(&report, &outcome, cli.top, compute_ms);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_human(&report, &outcome, cli.top.unwrap_or(DEFAULT_TOP), load_ms, compute_ms);
    }
    Ok(())
}
