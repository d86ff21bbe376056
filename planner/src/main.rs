//! Planning task command line.
//!
//! Classifies single trials and replays recorded sessions into event logs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};

use planner::core::classifier::{analyze_trial, candidates, classify};
use planner::core::graph::StateGraph;
use planner::core::scoring::{check_path_answer, reaches_goal};
use planner::core::types::{Action, State};
use planner::exit_codes;
use planner::io::config::{DEFAULT_CONFIG_FILE, TaskConfig, load_config, write_config};
use planner::io::schedule_file::{ScheduledTrial, load_schedule};
use planner::logging;
use planner::replay::replay_session;

#[derive(Parser)]
#[command(
    name = "planner",
    version,
    about = "Outcome classification and trial deadline scheduling for the planning task"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an entered sequence and print the outcome label.
    Classify {
        #[arg(long)]
        start: u8,
        #[arg(long)]
        depth: usize,
        /// Entered actions in order (`left`/`right`, or `l`/`r`).
        #[arg(value_parser = parse_action)]
        actions: Vec<Action>,
    },
    /// Print every candidate sequence with its per-step rewards and total.
    Enumerate {
        #[arg(long)]
        start: u8,
        #[arg(long)]
        depth: usize,
    },
    /// Print the optimum and large-loss analysis of every scheduled trial.
    ///
    /// Rows with a goal state also get the button leading there and the
    /// reward of that move.
    Analyze { schedule: PathBuf },
    /// Goal training: does the entered sequence end on the goal state?
    Goal {
        #[arg(long)]
        start: u8,
        #[arg(long)]
        goal: u8,
        #[arg(value_parser = parse_action)]
        actions: Vec<Action>,
    },
    /// Path test: is `--answer` the reward of the move from start to goal?
    PathTest {
        #[arg(long)]
        start: u8,
        #[arg(long)]
        goal: u8,
        #[arg(long, allow_hyphen_values = true)]
        answer: i32,
    },
    /// Apply the deadline rule to one trial close (times in seconds).
    CloseTrial {
        #[arg(long)]
        trial_start: f64,
        #[arg(long)]
        now: f64,
        #[arg(long)]
        ideal_next_start: f64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay recorded responses into `events.csv` and `summary.json`.
    Replay {
        #[arg(long)]
        responses: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default task configuration.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        path: PathBuf,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Classify {
            start,
            depth,
            actions,
        } => cmd_classify(start, depth, &actions),
        Command::Enumerate { start, depth } => cmd_enumerate(start, depth),
        Command::Analyze { schedule } => cmd_analyze(&schedule),
        Command::Goal {
            start,
            goal,
            actions,
        } => cmd_goal(start, goal, &actions),
        Command::PathTest {
            start,
            goal,
            answer,
        } => cmd_path_test(start, goal, answer),
        Command::CloseTrial {
            trial_start,
            now,
            ideal_next_start,
            config,
        } => cmd_close_trial(trial_start, now, ideal_next_start, config.as_deref()),
        Command::Replay {
            responses,
            out,
            config,
        } => cmd_replay(&responses, &out, config.as_deref()),
        Command::InitConfig { force, path } => cmd_init_config(&path, force),
    }
}

fn cmd_classify(start: u8, depth: usize, actions: &[Action]) -> Result<()> {
    let start = State::new(start)?;
    let outcome = classify(&StateGraph::canonical(), start, depth, actions)?;
    println!("{}", outcome.label());
    Ok(())
}

fn cmd_enumerate(start: u8, depth: usize) -> Result<()> {
    let start = State::new(start)?;
    for candidate in candidates(&StateGraph::canonical(), start, depth)? {
        let actions: Vec<String> = candidate.sequence.iter().map(Action::to_string).collect();
        let rewards: Vec<String> = candidate
            .evaluation
            .steps
            .iter()
            .map(i32::to_string)
            .collect();
        println!(
            "{} rewards={} total={} final={}",
            actions.join(","),
            rewards.join(","),
            candidate.evaluation.total,
            candidate.evaluation.final_state
        );
    }
    Ok(())
}

fn cmd_analyze(schedule: &Path) -> Result<()> {
    let graph = StateGraph::canonical();
    for (index, trial) in load_schedule(schedule)?.iter().enumerate() {
        let analysis = analyze_trial(&graph, trial.start, trial.depth)
            .with_context(|| format!("analyze trial {index}"))?;
        let second_best = analysis
            .second_best_reward
            .map_or_else(|| "NA".to_string(), |reward| reward.to_string());
        println!(
            "trial={} start={} depth={} best={} optimal_paths={} requires_large_loss={} second_best={}{}",
            index,
            analysis.start,
            analysis.depth,
            analysis.best_reward,
            analysis.optimal_paths,
            analysis.requires_large_loss,
            second_best,
            goal_columns(&graph, trial)
        );
    }
    Ok(())
}

/// ` goal=G next_button=B path_reward=R` for rows with a goal, else empty.
fn goal_columns(graph: &StateGraph, trial: &ScheduledTrial) -> String {
    let Some(goal) = trial.goal else {
        return String::new();
    };
    match graph.action_toward(trial.start, goal) {
        Some(action) => format!(
            " goal={goal} next_button={action} path_reward={}",
            graph.reward(trial.start, action)
        ),
        None => format!(" goal={goal} next_button=NA path_reward=NA"),
    }
}

fn cmd_goal(start: u8, goal: u8, actions: &[Action]) -> Result<()> {
    let start = State::new(start)?;
    let goal = State::new(goal)?;
    let reached = reaches_goal(&StateGraph::canonical(), start, actions, goal);
    println!("{}", if reached { "reached" } else { "missed" });
    Ok(())
}

fn cmd_path_test(start: u8, goal: u8, answer: i32) -> Result<()> {
    let start = State::new(start)?;
    let goal = State::new(goal)?;
    let correct = check_path_answer(&StateGraph::canonical(), start, goal, answer)
        .with_context(|| format!("state {goal} is not one move from state {start}"))?;
    println!("{}", if correct { "correct" } else { "incorrect" });
    Ok(())
}

fn cmd_close_trial(
    trial_start: f64,
    now: f64,
    ideal_next_start: f64,
    config: Option<&Path>,
) -> Result<()> {
    let cfg = load_config(config.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))?;
    let close = cfg.deadline_policy().close_trial(
        clock("--trial-start", trial_start)?,
        clock("--now", now)?,
        clock("--ideal-next-start", ideal_next_start)?,
    );
    println!(
        "elapsed={:.3} compensation_units={} committed_end={:.3} ideal_next_start={:.3}",
        close.elapsed.as_secs_f64(),
        close.compensation.units(),
        close.committed_end.as_secs_f64(),
        close.ideal_next_start.as_secs_f64()
    );
    Ok(())
}

fn cmd_replay(responses: &Path, out: &Path, config: Option<&Path>) -> Result<()> {
    let cfg = load_config(config.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))?;
    let output = replay_session(&cfg, responses, out)?;
    println!(
        "replay: trials={} points={} events={} summary={}",
        output.summary.tally.trials,
        output.summary.tally.points,
        output.events_path.display(),
        output.summary_path.display()
    );
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &TaskConfig::default())?;
    println!("{}", path.display());
    Ok(())
}

fn parse_action(raw: &str) -> Result<Action, String> {
    Action::parse(raw).ok_or_else(|| format!("expected left/right, got '{raw}'"))
}

fn clock(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|err| anyhow!("{name} {secs}: {err}"))
}
