use clap::Subcommand;
use pomoflow_core::{
    format_clock, CountdownWorker, EventOutcome, PhaseController, TomlSettingsStore,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in the foreground
    Run {
        /// Number of phases to complete before exiting
        #[arg(long, default_value = "1")]
        phases: u32,
    },
    /// Print the current phase and settings as JSON
    Status,
    /// Skip to the next phase
    Next,
    /// Zero the cycle count and return to Pomodoro
    ResetCycle,
    /// Restore the default settings
    Reset,
}

fn open_controller() -> Result<
    (
        PhaseController,
        tokio::sync::mpsc::UnboundedReceiver<pomoflow_core::WorkerEvent>,
    ),
    Box<dyn std::error::Error>,
> {
    let store = TomlSettingsStore::open_default()?;
    let (handle, events) = CountdownWorker::spawn();
    Ok((PhaseController::new(Box::new(store), handle), events))
}

fn print_status(controller: &PhaseController) -> Result<(), Box<dyn std::error::Error>> {
    let info = controller.phase_info();
    let status = serde_json::json!({
        "phase_title": info.phase_title,
        "page_title": info.page_title,
        "remaining_secs": controller.remaining_secs(),
        "progress_percent": controller.progress_percent(),
        "settings": controller.settings(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut events) = open_controller()?;

    match action {
        TimerAction::Run { phases } => {
            let mut completed = 0u32;
            println!("{}", controller.phase_info().phase_title);
            controller.start()?;

            while let Some(event) = events.recv().await {
                match controller.handle_event(&event)? {
                    EventOutcome::Ticked { remaining_secs } => {
                        println!(
                            "{}  {:>3}%",
                            format_clock(remaining_secs),
                            controller.progress_percent()
                        );
                    }
                    EventOutcome::PhaseCompleted { auto_started, .. } => {
                        completed += 1;
                        println!("{}", controller.phase_info().phase_title);
                        if completed >= phases {
                            break;
                        }
                        if !auto_started {
                            controller.start()?;
                        }
                    }
                    EventOutcome::Faulted { message } => eprintln!("worker error: {message}"),
                    EventOutcome::Stale => {}
                }
            }
            controller.stop()?;
        }
        TimerAction::Status => print_status(&controller)?,
        TimerAction::Next => {
            let phase = controller.next_phase()?;
            println!("{} ({})", controller.phase_info().phase_title, phase.label());
        }
        TimerAction::ResetCycle => {
            controller.reset_cycle()?;
            println!("{}", controller.phase_info().phase_title);
        }
        TimerAction::Reset => {
            controller.reset_app_state()?;
            println!("settings restored to defaults");
        }
    }
    Ok(())
}
