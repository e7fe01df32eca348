//! Star Drop entry point
//!
//! Natively this runs a level headlessly and reports what happened. The web
//! build starts from `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use thiserror::Error;

    use star_drop::consts::SIM_DT;
    use star_drop::game::{Game, GameError};
    use star_drop::level::{DirectorySource, LevelSet, load_level_list};
    use star_drop::persistence::StorageError;
    use star_drop::platform::default_storage;
    use star_drop::sim::GameEvent;
    use star_drop::Tuning;

    #[derive(Parser, Debug)]
    #[command(name = "star-drop", version)]
    #[command(about = "Drop the ball on a Star Drop level and report what happens")]
    pub struct Args {
        /// Level code file to play instead of the level list
        pub level_file: Option<PathBuf>,

        /// Directory holding level1.txt, level2.txt, ...
        #[arg(long, value_name = "DIR", conflicts_with = "level_file")]
        pub levels: Option<PathBuf>,

        /// Level number to open
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pub level: u32,

        /// Tuning JSON; stored alongside progression before the run
        #[arg(long, value_name = "FILE")]
        pub tuning: Option<PathBuf>,

        /// Where progression and tuning are saved (memory only when omitted)
        #[arg(long, value_name = "DIR")]
        pub save_dir: Option<PathBuf>,

        /// Simulated seconds before giving up
        #[arg(long, default_value_t = 10.0)]
        pub seconds: f32,

        /// Print the normalised level code and exit
        #[arg(long)]
        pub export: bool,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("cannot read {path}: {source}")]
        Read {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error(transparent)]
        Storage(#[from] StorageError),
        #[error(transparent)]
        Game(#[from] GameError),
    }

    fn read(path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn run(args: Args) -> Result<(), CliError> {
        let mut storage = default_storage(args.save_dir.clone());
        if let Some(path) = &args.tuning {
            let tuning = Tuning::from_json(&read(path)?)?;
            tuning.save(storage.as_mut())?;
        }

        let levels = match (&args.level_file, &args.levels) {
            (Some(file), _) => LevelSet::Fetched(vec![read(file)?]),
            (None, Some(dir)) => load_level_list(&mut DirectorySource::new(dir)),
            (None, None) => LevelSet::Builtin,
        };

        let mut game = Game::headless(levels, storage);
        if args.level != 1 {
            game.select_level(args.level)?;
        }

        if args.export {
            print!("{}", game.export_code());
            return Ok(());
        }

        game.play();
        let frames = (args.seconds.max(0.0) / SIM_DT).ceil() as u32;
        let mut won = false;
        for frame in 0..frames {
            for event in game.frame(SIM_DT) {
                report(frame, &event);
                won |= matches!(event, GameEvent::Won { .. });
            }
            if won {
                break;
            }
        }

        let session = game.session();
        println!(
            "level {}: {}/{} stars, {}",
            game.current_level(),
            session.gameplay.stars_collected,
            session.document.total_stars(),
            if won { "won" } else { "not finished" }
        );
        Ok(())
    }

    fn report(frame: u32, event: &GameEvent) {
        let t = frame as f32 * SIM_DT;
        match event {
            GameEvent::StarCollected { id, position } => {
                log::info!("[{:6.2}s] star {} collected at {:.2}", t, id, position)
            }
            GameEvent::Hazard { cause } => log::info!("[{:6.2}s] reset: {:?}", t, cause),
            GameEvent::GoalReached => log::info!("[{:6.2}s] in the bowl", t),
            GameEvent::Won { level } => log::info!("[{:6.2}s] level {} won", t, level),
            GameEvent::Teleported { from, to } => {
                log::debug!("[{:6.2}s] portal {} -> {}", t, from, to)
            }
            GameEvent::Boosted { id } => log::trace!("[{:6.2}s] booster {}", t, id),
            GameEvent::Impact { strength } => {
                log::debug!("[{:6.2}s] impact {:.2}", t, strength)
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    star_drop::platform::init_logging();
    let args = native::Args::parse();
    match native::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
