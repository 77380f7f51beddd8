use clap::Parser;

#[derive(clap::ValueEnum, Clone)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Parser)]
#[command(version = "0.1")]
pub struct CliOpts {
    /// Sets the custom configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Path of the recipient list, a JSON array of recipients.
    #[arg(short, long, value_name = "FILE")]
    pub recipients: String,

    /// Human-readable name for the batch.
    #[arg(short, long)]
    pub batch_name: String,

    /// Reuse an existing batch id instead of generating a fresh one.
    #[arg(long)]
    pub batch_id: Option<String>,

    /// Recipients per group (1-50).
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Minutes to pause between groups (0-60).
    #[arg(long)]
    pub interval_minutes: Option<u64>,

    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}
