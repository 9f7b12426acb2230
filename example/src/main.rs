//! Drives a date strip through a scripted session against a simulated list:
//! mount, a long fling into the past, a fling into the future, then a press
//! whose day is fed back as the new selection.

mod config;
mod host;

use std::{
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use clap::Parser;
use date_selector::{DateSelectorController, SharedDateSelector, px::Px};
use tracing::info;

use crate::host::SimulatedRow;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(about = "Simulated session of the infinite date strip")]
pub struct Cli {
    /// Initially selected day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// TOML file with selector arguments.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 392)]
    viewport: i32,
    /// Overrides the cell width.
    #[arg(long)]
    item_width: Option<i32>,
    /// Overrides the edge threshold.
    #[arg(long)]
    edge_threshold: Option<usize>,
    /// Overrides the extension chunk.
    #[arg(long)]
    chunk_days: Option<u32>,
    /// Frames before the simulated list can honour scroll requests.
    #[arg(long, default_value_t = 2)]
    unmeasured_frames: u32,
    /// Cells travelled per frame while flinging.
    #[arg(long, default_value_t = 12)]
    fling_speed: i32,
    /// Frames per fling.
    #[arg(long, default_value_t = 40)]
    fling_frames: u32,
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,date_selector=info,example=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .try_init();
}

fn tick(row: &mut SimulatedRow, strip: &SharedDateSelector, now: &mut Instant, frames: u32) {
    for _ in 0..frames {
        *now += FRAME;
        row.frame(strip, *now);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let args = config::load(&cli)?;
    let stride = args.item_stride();
    let mut now = Instant::now();

    let (pressed_tx, pressed_rx) = mpsc::channel::<NaiveDate>();
    let controller = DateSelectorController::new(args, cli.date, now)?.with_on_date_select(
        move |date| {
            let _ = pressed_tx.send(date);
        },
    );
    let strip = SharedDateSelector::new(controller);
    let mut row = SimulatedRow::new(Px(cli.viewport), cli.unmeasured_frames);

    tick(&mut row, &strip, &mut now, cli.unmeasured_frames + 2);
    println!("mounted    {}", row.render(&strip));

    for _ in 0..cli.fling_frames {
        row.drag(&strip, stride * -cli.fling_speed);
        tick(&mut row, &strip, &mut now, 1);
    }
    println!("past       {}", row.render(&strip));

    for _ in 0..cli.fling_frames * 2 {
        row.drag(&strip, stride * cli.fling_speed);
        tick(&mut row, &strip, &mut now, 1);
    }
    println!("future     {}", row.render(&strip));

    let index = row.center_index(&strip);
    strip.press(index)?;
    // The parent owns the selection: whatever the callback reported comes
    // back as the new selected date.
    for date in pressed_rx.try_iter() {
        info!(%date, "parent accepted pressed day");
        strip.with_mut(|strip| strip.set_selected_date(Some(date), now))?;
    }
    tick(&mut row, &strip, &mut now, 3);
    println!("selected   {}", row.render(&strip));
    info!(offset = %row.offset(), "session finished");

    Ok(())
}
