//! Instant-result runner: seed in, final score and replay summary out.
//!
//! ```text
//! cargo run --bin instant_result -- [seed] [minutes]
//! ```

use anyhow::{Context, Result};

use ms_core::engine::events::{ExternalEvent, ShoutKind};
use ms_core::{EngineConfig, LiveMatch, MatchSetup, Side, TeamSheet};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("seed must be an integer")?
        .unwrap_or(20_260_801);
    let minutes: u32 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("minutes must be an integer")?
        .unwrap_or(90);

    let setup = MatchSetup {
        seed,
        config: EngineConfig {
            match_length_ticks: Some(minutes * 60 * 1000),
            ..EngineConfig::default()
        },
        home: TeamSheet::demo(0, "Athletic", Side::Left, 1),
        away: TeamSheet::demo(1, "Rovers", Side::Right, 100),
    };

    let mut live = LiveMatch::new(setup)?;
    let input = live.input_handle();
    live.start();

    // A touchline intervention on the hour mark, for flavor and to exercise
    // the replay record.
    if minutes > 60 {
        live.advance(60 * 60 * 1000)?;
        input.send(ExternalEvent::Shout { player_id: 1, shout: ShoutKind::PressHigh });
    }

    let report = live.run_headless()?;
    println!(
        "{} {} - {} {}  (seed {seed}, {} ms simulated)",
        report.home_name, report.home_score, report.away_score, report.away_name, report.ticks_played
    );
    println!("match events logged: {}", report.events.len());
    println!("external events recorded: {}", report.external_events.len());
    println!("replay log: {}", report.external_events.to_json()?);
    Ok(())
}
