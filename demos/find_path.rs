//! Find a path across an ASCII map.
//!
//! Run: cargo run --bin find-path -- map.txt
//! (reads the map from stdin when no file is given; set RUST_LOG=debug for
//! search logs)

use std::io::Read;

use terrapath_demos::{AsciiMap, Canvas};
use terrapath_search::PathSearch;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let text = match std::env::args().nth(1) {
        Some(file) => std::fs::read_to_string(file)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let map = AsciiMap::parse(&text)?;
    let (start, end) = map.endpoints()?;

    let mut search = PathSearch::new(start, end, map.field.clone())?;
    let Some(result) = search.run()?.wait() else {
        return Err("search was cancelled".into());
    };
    search.join()?;
    let outcome = result?;

    println!("{outcome}");
    let mut canvas = Canvas::new(&map.field);
    if let Some(path) = outcome.path() {
        println!("cost: {:.3}", path.cost());
        canvas.path(path);
    }
    print!("{}", canvas.endpoints(start, end).render());
    Ok(())
}
