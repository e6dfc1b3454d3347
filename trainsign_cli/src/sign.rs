//! Collaborator assembly and command bodies.

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use serde_json::json;
use trainsign_core::mocks::NoInput;
use trainsign_core::{
    ArrivalTriple, ButtonMap, CredentialSource, EnvCredentials, LineRegistry, RunExit, RunParams,
    Sign, SignError, TickStatus,
};
use trainsign_hardware::{
    ConsoleDisplay, HostLink, ProcessReset, SimulatedDataSource, SimulatedLink, StdinInput,
    SystemTimeSync,
};
use trainsign_traits::{DataSource, DisplaySink, InputSource, LinkClient};

/// Every n-th simulated fetch fails when set.
pub const SIM_FAIL_ENV: &str = "TRAINSIGN_SIM_FAIL";

const LINK_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

fn make_source(cfg: &trainsign_config::Config, simulate: bool) -> eyre::Result<Box<dyn DataSource>> {
    if simulate {
        let mut src = SimulatedDataSource::new();
        if let Ok(v) = std::env::var(SIM_FAIL_ENV) {
            let n: u32 = v
                .trim()
                .parse()
                .wrap_err_with(|| format!("{SIM_FAIL_ENV} must be a positive integer"))?;
            src = src.with_fail_every(n);
        }
        return Ok(Box::new(src));
    }
    #[cfg(feature = "http")]
    {
        let src = trainsign_hardware::http::HttpSource::new(
            &cfg.source.base_url,
            Duration::from_millis(cfg.source.timeout_ms),
        )
        .wrap_err("create http client")?;
        Ok(Box::new(src))
    }
    #[cfg(not(feature = "http"))]
    {
        let _ = cfg;
        Err(SignError::Config("built without the `http` feature; use --simulate".into()).into())
    }
}

fn make_link(cfg: &trainsign_config::Config, simulate: bool) -> Box<dyn LinkClient> {
    if simulate {
        Box::new(SimulatedLink::default())
    } else {
        let timeout = Duration::from_millis(cfg.source.timeout_ms).min(LINK_PROBE_TIMEOUT);
        Box::new(HostLink::for_url(&cfg.source.base_url, timeout))
    }
}

fn make_input(cfg: &trainsign_config::Config) -> Box<dyn InputSource> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    if let (Some(up), Some(down)) = (cfg.input.up_pin, cfg.input.down_pin) {
        match trainsign_hardware::gpio::GpioButtons::new(up, down, cfg.input.debounce_samples) {
            Ok(b) => {
                tracing::info!(up, down, "gpio buttons enabled");
                return Box::new(b);
            }
            Err(e) => tracing::warn!(error = %e, "failed to init gpio buttons; falling back"),
        }
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let _ = cfg;

    if std::io::stdin().is_terminal() {
        tracing::info!("type u or d then Enter to press the up / down button");
        Box::new(StdinInput::spawn())
    } else {
        Box::new(NoInput)
    }
}

fn build_sign(
    cfg: &trainsign_config::Config,
    simulate: bool,
    display: Box<dyn DisplaySink>,
    line: Option<&str>,
) -> eyre::Result<Sign> {
    let registry = LineRegistry::try_from(cfg)?;
    Sign::builder()
        .with_source(make_source(cfg, simulate)?)
        .with_display(display)
        .with_link(make_link(cfg, simulate))
        .with_time_sync(SystemTimeSync)
        .with_registry(registry)
        .with_default_line(line.unwrap_or(&cfg.default_line))
        .with_timing((&cfg.timing).into())
        .with_resilience((&cfg.resilience).into())
        .with_credentials(EnvCredentials::from(&cfg.wifi))
        .build()
}

pub fn run_sign(
    cfg: &trainsign_config::Config,
    simulate: bool,
    line: Option<&str>,
    max_iterations: Option<u64>,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    let mut sign = build_sign(cfg, simulate, Box::new(ConsoleDisplay::stdout()), line)?;
    let mut input = make_input(cfg);
    let mut reset = ProcessReset::new().before_exit(crate::logging::flush);
    let params = RunParams {
        buttons: ButtonMap::from(&cfg.buttons),
        max_iterations,
    };

    sign.begin();
    match trainsign_core::run(&mut sign, &mut input, &mut reset, &params, &shutdown)? {
        RunExit::Reset { errors } => Err(SignError::DeviceResetRequired(errors).into()),
        RunExit::Shutdown | RunExit::IterationLimit => {
            tracing::info!(line = %sign.active_line().id, "sign stopped");
            Ok(())
        }
    }
}

fn slots(t: &ArrivalTriple) -> Vec<String> {
    t.to_strings().to_vec()
}

pub fn run_once(
    cfg: &trainsign_config::Config,
    simulate: bool,
    line: Option<&str>,
    json: bool,
) -> eyre::Result<()> {
    let mut sign = build_sign(cfg, simulate, Box::new(ConsoleDisplay::new(std::io::sink())), line)?;
    let now = sign.clock().now();
    let wall = sign.wall_now();
    let (north, south) = match sign.tick(now, wall) {
        TickStatus::Refreshed { north, south } => (north, south),
        TickStatus::Failed { error, .. } => return Err(error.into()),
        TickStatus::ResetRequired { errors } => {
            return Err(SignError::DeviceResetRequired(errors).into());
        }
        TickStatus::Idle | TickStatus::Synced => eyre::bail!("no fetch was due on the first tick"),
    };

    let l = sign.active_line();
    if json {
        let obj = json!({
            "line": l.id,
            "stop_id": l.stop_id,
            "station": l.station,
            "north": { "label": l.north_label, "arrivals": slots(&north) },
            "south": { "label": l.south_label, "arrivals": slots(&south) },
        });
        println!("{obj}");
    } else {
        let width = l.north_label.len().max(l.south_label.len());
        println!("{} ({})", l.station, l.stop_id);
        println!("  {:<width$}  {north}", l.north_label);
        println!("  {:<width$}  {south}", l.south_label);
    }
    Ok(())
}

pub fn list_lines(cfg: &trainsign_config::Config, json: bool) -> eyre::Result<()> {
    let registry = LineRegistry::try_from(cfg)?;
    if json {
        let lines: Vec<_> = registry
            .iter()
            .map(|l| {
                json!({
                    "id": l.id,
                    "stop_id": l.stop_id,
                    "station": l.station,
                    "north": l.north_label,
                    "south": l.south_label,
                    "logo": l.logo,
                    "default": l.id == cfg.default_line,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(lines));
    } else {
        for l in registry.iter() {
            let mark = if l.id == cfg.default_line { '*' } else { ' ' };
            println!(
                "{mark} {:<3} {:<6} {:<16} {} / {}",
                l.id, l.stop_id, l.station, l.north_label, l.south_label
            );
        }
    }
    Ok(())
}

pub fn self_check(cfg: &trainsign_config::Config, simulate: bool, json: bool) -> eyre::Result<()> {
    let registry = LineRegistry::try_from(cfg)?;
    registry.lookup(&cfg.default_line)?;
    ButtonMap::from(&cfg.buttons).check(&registry)?;

    let credentials = EnvCredentials::from(&cfg.wifi).credentials();
    if let Err(e) = &credentials {
        tracing::warn!(error = %e, "wireless credentials not available; reconnects will fail");
    }
    let link_up = make_link(cfg, simulate).is_connected();

    if json {
        println!(
            "{}",
            json!({
                "status": if link_up { "ok" } else { "link_down" },
                "lines": registry.len(),
                "credentials": credentials.is_ok(),
                "link": link_up,
                "simulate": simulate,
            })
        );
    }
    if !link_up {
        return Err(SignError::Link(format!("{} unreachable", cfg.source.base_url)).into());
    }
    if !json {
        println!("OK");
    }
    Ok(())
}
