//! Levelshift CLI - Inspect, encode and export animation assets.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use levelshift::{inspect, render, schema::Asset, schema::ProjectConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("info") if args.len() == 3 => {
            let asset = load_asset(&args[2]);
            print!("{}", inspect::summary(&asset));
        }
        Some("dump") if args.len() == 3 => {
            let asset = load_asset(&args[2]);
            print!("{}", inspect::dump(&asset));
        }
        Some("encode") if args.len() == 4 => encode(&args[2], &args[3]),
        Some("gif") if (4..=6).contains(&args.len()) => {
            let scale = parse_arg(args.get(4), "scale", 1);
            let index = parse_arg(args.get(5), "animation", 0);
            let asset = load_asset(&args[2]);
            render::save_gif(&asset, index, scale, &args[3]).unwrap_or_else(|e| {
                eprintln!("Error exporting GIF: {}", e);
                process::exit(1);
            });
        }
        Some("example") if args.len() == 2 => print_example_config(),
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [arguments]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <FILE>                          Summarize an asset");
    eprintln!("  dump <FILE>                          List every color, tile and command");
    eprintln!("  encode <PROJECT.json> <FILE>         Build an asset from a JSON project");
    eprintln!("  gif <FILE> <OUT.gif> [scale] [anim]  Export an animation as GIF");
    eprintln!("  example                              Print an example JSON project");
    eprintln!();
    eprintln!("Set RUST_LOG=debug for per-chunk and per-frame details.");
}

fn load_asset(path: &str) -> Asset {
    Asset::load(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        process::exit(1);
    })
}

fn parse_arg(arg: Option<&String>, name: &str, default: usize) -> usize {
    match arg {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            eprintln!("Invalid {}: {}", name, s);
            process::exit(1);
        }),
    }
}

fn encode(project_path: &str, output: &str) {
    let config = ProjectConfig::load(project_path).unwrap_or_else(|e| {
        eprintln!("Error loading project: {}", e);
        process::exit(1);
    });

    let start = Instant::now();
    let asset = config.build().unwrap_or_else(|e| {
        eprintln!("Error building asset: {}", e);
        process::exit(1);
    });

    let output = PathBuf::from(output);
    asset.save(&output).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {}", output.display(), e);
        process::exit(1);
    });

    let size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    println!(
        "Wrote {} ({} animations, {} bytes) in {:.2}s",
        output.display(),
        asset.animations.len(),
        size,
        start.elapsed().as_secs_f32()
    );
}

fn print_example_config() {
    let config = ProjectConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing example: {}", e);
            process::exit(1);
        }
    }
}
