//! Configuration and CLI argument handling

use clap::Parser;

use crate::engine::{EngineError, TimerConfig};

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "interval-bell")]
#[command(about = "A state-managed HTTP server for interval-training timers")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20853")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Work phase duration in seconds
    #[arg(short, long, default_value = "30")]
    pub work: u32,

    /// Rest phase duration in seconds
    #[arg(short, long, default_value = "10")]
    pub rest: u32,

    /// Number of work+rest rounds per run
    #[arg(long, default_value = "4")]
    pub rounds: u32,

    /// Disable the audible alert bell (alerts are still logged)
    #[arg(long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Validate the timer durations into an engine configuration
    pub fn timer_config(&self) -> Result<TimerConfig, EngineError> {
        TimerConfig::new(self.work, self.rest, self.rounds)
    }
}
