use std::io::{self, Write};
use std::time::Instant;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::error::Result;
use crate::scene::Scene;
use crate::scheduler::FRAME_INTERVAL;
use crate::settings::Settings;
use crate::state::AppState;
use crate::widget::{Control, DofWidget};

/// Runs the interactive view until the user quits.
///
/// The terminal is put back into its normal mode even when the loop fails.
pub fn run(settings: Settings) -> Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        Hide
    )?;

    let result = event_loop(&mut stdout, settings);

    if let Err(e) = execute!(
        stdout,
        Show,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    ) {
        log::error!("Failed to restore terminal: {}", e);
    }
    if let Err(e) = terminal::disable_raw_mode() {
        log::error!("Failed to leave raw mode: {}", e);
    }
    result
}

fn event_loop<W: Write>(out: &mut W, settings: Settings) -> Result<()> {
    let (width, height) = initial_size();
    log::info!("Starting interactive view at {}x{}", width, height);

    let mut data = AppState::new(settings);
    let mut widget = DofWidget::new(width, height, Scene::new());
    let mut next_frame = Instant::now();

    loop {
        let now = Instant::now();
        if now >= next_frame {
            // One recomputation and one redraw per tick, however many events arrived
            let result = widget.tick(&data);
            widget.paint(&data, &result).flush(out)?;
            next_frame = now + FRAME_INTERVAL;
            continue;
        }

        if event::poll(next_frame - now)? {
            if widget.event(&event::read()?, &mut data) == Control::Quit {
                log::info!("Quit requested");
                return Ok(());
            }
        }
    }
}

/// Terminal size in cells, falling back to 80x24 when it cannot be probed
fn initial_size() -> (u16, u16) {
    termsize::get()
        .map(|size| (size.cols, size.rows))
        .or_else(|| terminal::size().ok())
        .unwrap_or((80, 24))
}
