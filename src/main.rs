use anyhow::{Context, Result};
use bullwhip_game::analysis::advisor::{Advisor, RuleBasedAdvisor, UnavailableAdvisor};
use bullwhip_game::analysis::metrics;
use bullwhip_game::io::reporting;
use bullwhip_game::simulation::session::parse_order_input;
use bullwhip_game::{ChainSimulation, GameSession, Role, SimulationConfig};
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlayerRole {
    Manufacturer,
    Distributor,
}

impl From<PlayerRole> for Role {
    fn from(role: PlayerRole) -> Self {
        match role {
            PlayerRole::Manufacturer => Role::Manufacturer,
            PlayerRole::Distributor => Role::Distributor,
        }
    }
}

/// Play the bullwhip game from the terminal.
#[derive(Debug, Parser)]
#[command(name = "bullwhip-game", version)]
struct Cli {
    /// Which tier you control.
    #[arg(long, value_enum, default_value_t = PlayerRole::Distributor)]
    role: PlayerRole,

    /// Place this order every cycle instead of prompting.
    #[arg(long, allow_negative_numbers = true)]
    order: Option<i64>,

    /// Demand seed; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with simulation parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the per-tier history log here.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the demand/order chart series here.
    #[arg(long)]
    chart_csv: Option<PathBuf>,

    /// Write the final report as JSON here.
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Play without commentary, as if the advisor could not be reached.
    #[arg(long)]
    no_advisor: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    println!("=== Bullwhip Effect Game ===");

    // 1. CONFIGURATION
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;

    println!(
        "Demand schedule (seed {}): {:?}",
        config.seed,
        config.demand.schedule(config.seed, config.max_cycles)
    );

    // 2. SESSION
    let advisor: Box<dyn Advisor> = if cli.no_advisor {
        Box::new(UnavailableAdvisor::new("advisor disabled"))
    } else {
        Box::new(RuleBasedAdvisor::new(config.target_inventory))
    };
    let mut session = GameSession::new(ChainSimulation::with_config(config.clone()), advisor);
    session.start()?;
    let role = Role::from(cli.role);
    session.select_role(role)?;
    println!("Playing as the {role} for {} cycles.", config.max_cycles);

    // 3. PLAY
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_order: i64 = 10;
    while !session.state().game_over {
        let order = match cli.order {
            Some(order) => order,
            None => {
                print_status(&session, role);
                print!("Order for cycle {} [{}]: ", session.state().current_cycle + 1, last_order);
                io::stdout().flush()?;
                match lines.next() {
                    Some(line) => {
                        let line = line?;
                        if line.trim().is_empty() {
                            last_order
                        } else {
                            parse_order_input(&line) as i64
                        }
                    }
                    None => {
                        println!("\nInput closed, stopping early.");
                        break;
                    }
                }
            }
        };
        last_order = order.max(0);
        session.next_cycle(order)?;
        if let Some(hint) = session.analysis_text() {
            println!("Cycle {}: {}", session.state().current_cycle, hint);
        }
    }

    // 4. REPORT
    let history = &session.state().history;
    println!("\n=== Cost Analysis ===");
    for (stage, cost) in metrics::cost_breakdown(history, config.holding_cost, config.backlog_cost) {
        println!("{stage}: ${cost:.2}");
    }
    if let Some(report) = session.final_report() {
        match report.metrics.bullwhip_ratio {
            Some(ratio) => println!("Bullwhip ratio (order var / demand var): {ratio:.2}"),
            None => println!("Bullwhip ratio: N/A"),
        }
        println!("\n{}", report.narrative);
        if let Some(path) = &cli.report_json {
            report.write_json(path)?;
        }
    }

    // 5. EXPORT
    if let Some(path) = &cli.csv {
        reporting::write_history_csv(path, history, config.holding_cost, config.backlog_cost)?;
        println!("History written to {}", path.display());
    }
    if let Some(path) = &cli.chart_csv {
        reporting::write_chart_series_csv(path, history)?;
        println!("Chart series written to {}", path.display());
    }

    Ok(())
}

fn print_status(session: &GameSession, role: Role) {
    let node = session.state().nodes[role];
    println!(
        "\n[Cycle {}/{}] {role}: inventory {}, backlog {}, incoming order {}, arriving next {}",
        session.state().current_cycle,
        session.state().max_cycles,
        node.inventory,
        node.backlog,
        node.incoming_order,
        node.incoming_shipment,
    );
}
