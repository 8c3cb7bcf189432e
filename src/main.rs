use clap::{Parser, ValueEnum};
use creature_battle::{
    advance_turn, collect_opponent_action, conclude, start_battle, submit_action, BasicItems,
    BattleAction, BattleConfig, BattleContext, BattleEngineError, BattleEvent, BattleKind,
    CaptureDevice, ConfigurationError, CreatureInstance, Dex, ItemHandler, NoItems, OpponentSpec,
    ScoringPolicy, Side, TurnRng,
};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Simulate a single battle between two creatures picked by species name.
#[derive(Parser, Debug)]
#[command(name = "battle-sim", version)]
struct Cli {
    /// Species name for the player's creature
    player: String,

    /// Species name for the opponent
    opponent: String,

    #[arg(long, default_value_t = 10)]
    player_level: u8,

    #[arg(long, default_value_t = 10)]
    opponent_level: u8,

    /// Fight a trainer instead of a wild creature
    #[arg(long)]
    trainer: bool,

    /// Seed for the battle generator; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,

    #[arg(long, default_value_t = 100)]
    max_turns: u32,

    /// RON file overriding the default battle constants
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Throw this device once the wild opponent drops below half health
    #[arg(long, value_enum)]
    capture: Option<DeviceArg>,

    /// Carry a bag of basic medicine
    #[arg(long)]
    items: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeviceArg {
    Standard,
    Great,
    Ultra,
    Master,
}

impl From<DeviceArg> for CaptureDevice {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Standard => CaptureDevice::Standard,
            DeviceArg::Great => CaptureDevice::Great,
            DeviceArg::Ultra => CaptureDevice::Ultra,
            DeviceArg::Master => CaptureDevice::Master,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error(transparent)]
    Engine(#[from] BattleEngineError),
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    #[error("failed to encode event: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let dex = Dex::builtin()?;
    let config = match &cli.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };

    let player_species = dex
        .species_by_name(&cli.player)
        .ok_or_else(|| CliError::UnknownSpecies(cli.player.clone()))?
        .id;
    let opponent_species = dex
        .species_by_name(&cli.opponent)
        .ok_or_else(|| CliError::UnknownSpecies(cli.opponent.clone()))?
        .id;

    let kind = if cli.trainer {
        BattleKind::Trainer
    } else {
        BattleKind::Wild
    };
    let player = CreatureInstance::new(&dex, player_species, cli.player_level)?;
    let opponent = match kind {
        BattleKind::Wild => OpponentSpec::Wild {
            species: opponent_species,
            level: cli.opponent_level,
        },
        BattleKind::Trainer => OpponentSpec::Instance(CreatureInstance::new(
            &dex,
            opponent_species,
            cli.opponent_level,
        )?),
    };

    let mut rng = match cli.seed {
        Some(seed) => TurnRng::from_seed(seed),
        None => TurnRng::new_random(),
    };
    let items: &dyn ItemHandler = if cli.items { &BasicItems } else { &NoItems };
    let policy = ScoringPolicy::new();

    let mut battle = start_battle(&dex, &player, opponent, kind)?;
    print_events(&battle, battle.event_log.events(), cli.json)?;

    while !battle.is_ended() {
        if battle.turn_number > cli.max_turns {
            warn!(max_turns = cli.max_turns, "Turn limit reached, stopping simulation");
            break;
        }

        let player_action = choose_player_action(cli, &battle, &dex, &policy);
        submit_action(&mut battle, &dex, Side::Player, player_action)?;
        collect_opponent_action(&mut battle, &dex, &policy)?;

        let result = advance_turn(&mut battle, &dex, &config, &mut rng, items)?;
        print_events(&battle, &result.events, cli.json)?;
    }

    if let Ok(conclusion) = conclude(&battle) {
        info!(outcome = ?conclusion.outcome, "Simulation finished");
        if cli.json {
            println!("{}", serde_json::to_string(&conclusion)?);
        } else {
            println!(
                "Result: {:?} ({} at level {}, {} HP)",
                conclusion.outcome,
                battle.player.name,
                conclusion.player.level,
                conclusion.player.current_hp
            );
            if conclusion.player_evolution_ready {
                println!("{} is ready to evolve!", battle.player.name);
            }
        }
    }
    Ok(())
}

fn choose_player_action(
    cli: &Cli,
    battle: &BattleContext,
    dex: &Dex,
    policy: &ScoringPolicy,
) -> BattleAction {
    if let (Some(device), BattleKind::Wild) = (cli.capture, battle.kind) {
        let target = &battle.opponent;
        if target.current_hp <= target.max_hp() / 2 {
            return BattleAction::AttemptCapture {
                device: device.into(),
            };
        }
    }
    policy.choose_for(Side::Player, battle, dex)
}

fn print_events(
    battle: &BattleContext,
    events: &[BattleEvent],
    json: bool,
) -> Result<(), CliError> {
    for event in events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(line) = event.format(battle) {
            println!("{}", line);
        }
    }
    Ok(())
}
