//! Signal handling for shutdown and suspend/resume lifecycle

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

/// Suspend/resume lifecycle stimuli delivered by the host environment
///
/// Power-management hooks signal the daemon around system sleep: SIGUSR1
/// before the clock stops, SIGUSR2 once it is ticking again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Suspend,
    Resume,
}

/// Map a raw signal number to its lifecycle meaning
pub fn classify_lifecycle_signal(signal: i32) -> Option<LifecycleSignal> {
    match signal {
        s if s == signal_hook::consts::SIGUSR1 => Some(LifecycleSignal::Suspend),
        s if s == signal_hook::consts::SIGUSR2 => Some(LifecycleSignal::Resume),
        _ => None,
    }
}

/// Stream of suspend/resume lifecycle signals (SIGUSR1, SIGUSR2)
pub fn lifecycle_signals() -> Signals {
    Signals::new([
        signal_hook::consts::SIGUSR1,
        signal_hook::consts::SIGUSR2,
    ])
    .expect("Failed to create lifecycle signal handler")
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])
    .expect("Failed to create signal handler");

    while let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_signals_classify_to_suspend_and_resume() {
        assert_eq!(
            classify_lifecycle_signal(signal_hook::consts::SIGUSR1),
            Some(LifecycleSignal::Suspend)
        );
        assert_eq!(
            classify_lifecycle_signal(signal_hook::consts::SIGUSR2),
            Some(LifecycleSignal::Resume)
        );
        assert_eq!(classify_lifecycle_signal(signal_hook::consts::SIGTERM), None);
    }
}
