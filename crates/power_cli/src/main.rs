use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use power_core::{
    Command, CommandEnvelope, CommandId, Event, EventLevel, ModuleId, RackId, SourceId, VesselState,
};
use power_world::{build_initial_vessel, load_content};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "power_cli", about = "Vessel Power Sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Seconds of simulated time per tick.
        #[arg(long, default_value_t = 1.0)]
        dt: f32,
        /// Build a fresh vessel with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load the initial VesselState from a JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<String>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Module ids to slot into the primary rack before the first tick.
        #[arg(long = "module")]
        modules: Vec<String>,
        /// Fuel source id to feed into the first reactor periodically.
        #[arg(long)]
        fuel: Option<String>,
        /// Feed one fuel item every N ticks.
        #[arg(long, default_value_t = 60)]
        fuel_every: u64,
        /// Reserve power drawn from the vessel every tick.
        #[arg(long, default_value_t = 0.0)]
        drain: f32,
        /// Write the final VesselState to this JSON file.
        #[arg(long = "save")]
        save_file: Option<String>,
        #[arg(long, default_value_t = 100)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
    },
}

struct RunArgs {
    ticks: u64,
    dt: f32,
    seed: Option<u64>,
    state_file: Option<String>,
    content_dir: String,
    modules: Vec<String>,
    fuel: Option<String>,
    fuel_every: u64,
    drain: f32,
    save_file: Option<String>,
    print_every: u64,
    event_level: EventLevel,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn make_command(next_id: &mut u64, tick: u64, command: Command) -> CommandEnvelope {
    let id = CommandId(format!("cmd_{next_id:06}"));
    *next_id += 1;
    CommandEnvelope {
        id,
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

fn run(args: RunArgs) -> Result<()> {
    let content = load_content(&args.content_dir)?;

    let mut state = if let Some(path) = args.state_file {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading state file: {path}"))?;
        serde_json::from_str::<VesselState>(&json)
            .with_context(|| format!("parsing state file: {path}"))?
    } else {
        let resolved_seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        println!("Building vessel from seed {resolved_seed}");
        build_initial_vessel(&content, &mut rng)
    };

    let mut next_command_id = 0u64;
    let primary_rack = RackId("rack_main".to_string());

    println!(
        "Starting simulation: ticks={} dt={} vessel={} content_version={}",
        args.ticks, args.dt, state.id, content.content_version,
    );
    println!("{}", "-".repeat(80));

    for n in 0..args.ticks {
        let mut commands = Vec::new();

        if n == 0 {
            for (slot, module) in args.modules.iter().enumerate() {
                commands.push(make_command(
                    &mut next_command_id,
                    state.tick,
                    Command::InsertModule {
                        rack: primary_rack.clone(),
                        slot,
                        module: ModuleId(module.clone()),
                    },
                ));
            }
        }

        if let (Some(fuel), Some(unit)) = (args.fuel.as_ref(), state.units.first()) {
            if n % args.fuel_every == 0 {
                commands.push(make_command(
                    &mut next_command_id,
                    state.tick,
                    Command::InsertFuel {
                        unit: unit.id.clone(),
                        source: SourceId(fuel.clone()),
                        size: 1,
                    },
                ));
            }
        }

        if args.drain > 0.0 {
            commands.push(make_command(
                &mut next_command_id,
                state.tick,
                Command::DrainReserves {
                    requested: args.drain,
                },
            ));
        }

        let events = power_core::tick(&mut state, &commands, &content, args.dt, args.event_level);

        // Print notable events regardless of print_every.
        for event in &events {
            match &event.event {
                Event::TierChanged { unit, tier } => {
                    println!("*** TIER CHANGED: {unit} -> tier {tier} at tick={:04} ***", state.tick);
                }
                Event::PowerRatingChanged { rating } => {
                    println!("*** POWER RATING: {rating:.2} at tick={:04} ***", state.tick);
                }
                Event::FuelRejected { unit, source, reason } => {
                    println!("fuel rejected by {unit}: {source} ({reason})");
                }
                _ => {}
            }
        }

        if state.tick % args.print_every == 0 {
            print_status(&state);
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.tick);
    print_status(&state);

    if let Some(path) = args.save_file {
        let file = std::fs::File::create(&path).with_context(|| format!("creating {path}"))?;
        serde_json::to_writer_pretty(file, &state)
            .with_context(|| format!("writing {path}"))?;
        println!("State written to {path}");
    }

    Ok(())
}

fn print_status(state: &VesselState) {
    let items: usize = state.units.iter().map(|u| u.items.len()).sum();
    println!(
        "[tick={tick:04}]  rating={rating:.2}  reserve={reserve:7.1}/{capacity:.0}  \
         producing={producing}  items={items}",
        tick = state.tick,
        rating = state.power_rating,
        reserve = state.aggregator.last_reserve,
        capacity = state.aggregator.last_capacity,
        producing = state.aggregator.is_producing(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            dt,
            seed,
            state_file,
            content_dir,
            modules,
            fuel,
            fuel_every,
            drain,
            save_file,
            print_every,
            event_level,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(RunArgs {
                ticks,
                dt,
                seed,
                state_file,
                content_dir,
                modules,
                fuel,
                fuel_every,
                drain,
                save_file,
                print_every,
                event_level: level,
            })?;
        }
    }
    Ok(())
}
