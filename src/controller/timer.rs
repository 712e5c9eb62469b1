use super::actor::CaptureController;
use super::command::ControllerCommand;
use super::session::CapturePhase;
use crate::countdown::{CountdownStep, CountdownTicker};
use crate::cues::Cue;
use crate::error::Result;
use crate::events::SelfcamEvent;
use tracing::{debug, info, warn};

impl CaptureController {
    /// Select the countdown length used by the next shutter press
    pub fn set_timer(&mut self, seconds: u32) {
        if seconds == 0 {
            warn!("Ignoring zero-second timer");
            return;
        }

        self.session.timer_value = seconds;
        if let Some(preview) = self.preview.as_mut() {
            preview.play();
        }

        debug!("Timer set to {}s", seconds);
        self.publish(SelfcamEvent::TimerSelected { seconds });
    }

    /// Start counting down from `initial`, or from the selected timer when
    /// `None`. A countdown already running is replaced.
    pub fn start_countdown(&mut self, initial: Option<u32>) {
        self.stop_ticker();

        let value = initial
            .filter(|v| *v > 0)
            .unwrap_or(self.session.timer_value);
        let shown = self.session.countdown.start(value);
        self.session.phase = CapturePhase::CountingDown;
        self.hide_thumbnail();

        self.ticker_generation += 1;
        let tx = self.command_tx.clone();
        self.ticker = Some(CountdownTicker::spawn(
            self.ticker_generation,
            self.tick_period,
            move |generation| tx.send(ControllerCommand::CountdownTick { generation }).is_ok(),
        ));

        info!("Countdown {} started at {}", self.ticker_generation, shown);
        self.publish(SelfcamEvent::CountdownStarted { remaining: shown });
        self.cues.play(Cue::Count);
    }

    /// Advance the running countdown, taking the photo when it reaches zero
    pub(crate) async fn on_countdown_tick(&mut self) -> Result<()> {
        match self.session.countdown.tick() {
            CountdownStep::Show(remaining) => {
                self.publish(SelfcamEvent::CountdownTick { remaining });
                self.cues.play(Cue::Count);
                Ok(())
            }
            CountdownStep::Fire => {
                self.stop_ticker();
                self.publish(SelfcamEvent::CountdownFinished);
                self.cues.play(Cue::Shutter);
                self.take_photo().await.map(|_| ())
            }
        }
    }

    /// Cancel the ticker. The remaining countdown value is kept.
    pub(crate) fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("Stopping countdown {}", ticker.generation());
            ticker.cancel();
        }
    }
}
