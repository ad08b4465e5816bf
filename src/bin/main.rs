use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anstream::println;
use clap::Parser;
use hrsw::Stopwatch;
use human_duration::human_duration;
use indoc::indoc;
use owo_colors::OwoColorize;

use maze_search::algorithms::uninformed::Method;
use maze_search::algorithms::uninformed::SearchError;
use maze_search::problems::maze::Maze;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = maze_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze layout files: 'A' start, 'B' goal, space free, anything else wall.
    /// With no files, solves a small built-in maze.
    #[arg()]
    pub mazes: Vec<PathBuf>,

    /// Exploration order.
    #[arg(short, long, env = "MAZE_METHOD", default_value = "bfs")]
    pub method: Method,

    /// Directory to write rasterized solutions into, one PNG per maze.
    #[arg(short, long)]
    pub image_dir: Option<PathBuf>,

    /// Also highlight explored-but-unused cells in the images.
    #[arg(long, default_value_t = false)]
    pub show_explored: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

fn solve_and_report(maze: &Maze, name: &str, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let (height, width) = maze.dimensions();
    println!("{} {} ({height}x{width})", "Maze".bold(), name.yellow());
    println!("{maze}");

    let mut stopwatch = Stopwatch::new_started();
    let result = maze.solve(args.method);
    stopwatch.stop();

    let result = match result {
        Ok(result) => result,
        Err(SearchError::NoSolution) => {
            println!(
                "{} no path from {} to {}.",
                "No solution:".red().bold(),
                maze.start(),
                maze.goal()
            );
            return Ok(());
        }
        Err(e) => return Err(Box::new(e)),
    };

    println!(
        "{} with {} in {}: {} actions, {} states explored.",
        "Solved".green().bold(),
        args.method,
        human_duration(&stopwatch.elapsed()),
        result.solution.len(),
        result.num_explored,
    );
    println!("{}", maze.render(Some(&result.solution)));
    println!(
        "Actions: {}",
        result
            .solution
            .actions
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    if let Some(dir) = &args.image_dir {
        let out = dir.join(format!(
            "{}_{}.png",
            name,
            args.method.to_string().to_lowercase()
        ));
        let explored = args.show_explored.then_some(&result.explored);
        maze.write_image(&out, Some(&result.solution), explored)?;
        println!("Wrote {}", out.display().yellow());
    }

    Ok(())
}

fn run_file(path: &Path, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let maze = Maze::try_from(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("maze");
    solve_and_report(&maze, name, args)
}

fn run_demo(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let maze_str = indoc! {"
        #####B#
        ##### #
        ####  #
        #### ##
             ##
        A######
    "};
    let maze = Maze::try_from(maze_str)?;
    solve_and_report(&maze, "demo", args)
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.color.write_global();

    let mut failures = 0u32;
    if args.mazes.is_empty() {
        if let Err(e) = run_demo(&args) {
            println!("{} {e}", "error:".red().bold());
            failures += 1;
        }
    }
    for path in &args.mazes {
        if let Err(e) = run_file(path, &args) {
            println!("{} {e}", "error:".red().bold());
            failures += 1;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
