// ============================================================================
// main.rs — GridLife
// Entry point. Initializes logging, parses arguments and starts either the
// windowed event loop or a headless batch.
// ============================================================================

use gridlife::app::App;
use gridlife::headless::{run_headless, Backend, HeadlessConfig};
use gridlife::{LifeConfig, LifeError};
use winit::event_loop::EventLoop;

struct Args {
    config_path: Option<String>,
    headless: Option<u64>,
    cpu: bool,
}

fn parse_args() -> Result<Args, LifeError> {
    let mut args = Args {
        config_path: None,
        headless: None,
        cpu: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config_path = Some(iter.next().ok_or_else(|| {
                    LifeError::InvalidConfig("--config needs a path".into())
                })?);
            }
            "--headless" => {
                let n = iter
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| {
                        LifeError::InvalidConfig("--headless needs a generation count".into())
                    })?;
                args.headless = Some(n);
            }
            "--cpu" => args.cpu = true,
            other => log::warn!("Ignoring unknown argument {other}"),
        }
    }
    Ok(args)
}

fn run() -> Result<(), LifeError> {
    let args = parse_args()?;
    let config = match &args.config_path {
        Some(path) => LifeConfig::from_json_file(path)?,
        None => LifeConfig::default(),
    };
    config.validate()?;

    if let Some(generations) = args.headless {
        let headless = HeadlessConfig {
            generations,
            backend: if args.cpu { Backend::Cpu } else { Backend::Gpu },
            ..HeadlessConfig::default()
        };
        run_headless(&config, &headless)?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
