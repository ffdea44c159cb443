//! Search a randomly generated cave and show the frontiers mid-search.
//!
//! Run: cargo run --bin random-field -- [width] [height] [seed]

use rand::SeedableRng;
use rand::rngs::StdRng;
use terrapath_demos::{Canvas, CaveRule, random_open, random_terrain};
use terrapath_search::{SearchConfig, SearchEngine, SearchStatus};

const WIDTH: i32 = 72;
const HEIGHT: i32 = 24;
const WALL_PCT: f64 = 0.42;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn arg<T: std::str::FromStr>(n: usize, default: T) -> Result<T, String> {
    match std::env::args().nth(n) {
        Some(s) => s.parse().map_err(|_| format!("invalid argument {s:?}")),
        None => Ok(default),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let width = arg(1, WIDTH)?;
    let height = arg(2, HEIGHT)?;
    let seed = arg(3, 42u64)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let field = random_terrain(&mut rng, width, height, WALL_PCT, CaveRule::default())?;
    let (Some(start), Some(end)) = (random_open(&mut rng, &field), random_open(&mut rng, &field))
    else {
        return Err("generated field has no open cells".into());
    };
    log::info!("seed {seed}: searching {start} -> {end} on {width}x{height}");

    // Stepping on this thread lets us look at the frontiers halfway through.
    let mut engine = SearchEngine::with_config(start, end, field.clone(), SearchConfig::default())?;
    let mut halfway = None;
    let outcome = loop {
        if let Some(outcome) = engine.step()? {
            break outcome;
        }
        if engine.iterations() == 20 {
            let snapshot = engine.snapshot();
            if let Some(at) = snapshot.current_start {
                let node = engine.registry().node(engine.registry().get(at)?);
                log::info!("start side is at {at}, {:.3} from the start", node.g);
            }
            halfway = Some(snapshot);
        }
    };

    if let Some(snapshot) = &halfway {
        println!(
            "after {} iterations ({} frontier nodes):",
            snapshot.iteration,
            snapshot.frontier_len()
        );
        print!(
            "{}",
            Canvas::new(&field)
                .frontiers(snapshot)
                .endpoints(start, end)
                .render()
        );
        println!();
    }

    println!("{outcome} after {} iterations", engine.iterations());
    let mut canvas = Canvas::new(&field);
    match outcome.path() {
        Some(path) => {
            println!("cost: {:.3}", path.cost());
            canvas.path(path);
        }
        None if outcome.status() == SearchStatus::FrontierExhausted => {
            println!("start and end are in different caves");
        }
        None => {}
    }
    print!("{}", canvas.endpoints(start, end).render());
    Ok(())
}
