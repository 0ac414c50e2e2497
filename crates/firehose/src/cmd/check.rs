//! Check command - validate and print the effective configuration
//!
//! # Usage
//!
//! ```bash
//! firehose check --config configs/firehose.toml
//! firehose check --quiet
//! ```

use anyhow::Result;
use clap::Args;
use firehose_config::Config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Quiet mode - only report success or failure
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: CheckArgs, config: &Config) -> Result<()> {
    if args.quiet {
        println!("ok");
        return Ok(());
    }

    print!("{}", render(config));
    Ok(())
}

/// Effective configuration in the same TOML layout it is read from
fn render(config: &Config) -> String {
    let max_sources = match config.history.max_sources {
        0 => "unlimited".to_string(),
        n => n.to_string(),
    };
    let eviction = match config.stream.max_consecutive_drops {
        0 => "never".to_string(),
        n => format!("after {n} consecutive drops"),
    };

    let mut out = format!(
        "[log]\n\
         level = \"{}\"\n\
         format = \"{}\"\n",
        config.log.level.as_str(),
        config.log.format.as_str(),
    );
    if !config.log.targets.is_empty() {
        out.push_str("\n[log.targets]\n");
        for (target, level) in &config.log.targets {
            out.push_str(&format!("{target} = \"{}\"\n", level.as_str()));
        }
    }

    out.push_str(&format!(
        "\n\
         [history]\n\
         capacity = {}\n\
         max_sources = {}  # {}\n\
         \n\
         [stream]\n\
         queue_capacity = {}\n\
         max_subscribers = {}\n\
         max_consecutive_drops = {}  # evict {}\n\
         cleanup_interval_secs = {}\n",
        config.history.capacity,
        config.history.max_sources,
        max_sources,
        config.stream.queue_capacity,
        config.stream.max_subscribers,
        config.stream.max_consecutive_drops,
        eviction,
        config.stream.cleanup_interval_secs,
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_render_defaults() {
        let out = render(&Config::default());
        assert!(out.contains("capacity = 100\n"));
        assert!(out.contains("max_sources = 0  # unlimited"));
        assert!(out.contains("queue_capacity = 256"));
        assert!(out.contains("# evict never"));
    }

    #[test]
    fn test_render_is_parseable() {
        let config = Config::from_str(
            "[log.targets]\nfirehose_tap = \"debug\"\n\n[stream]\nmax_consecutive_drops = 9",
        )
        .unwrap();
        let reparsed = Config::from_str(&render(&config)).unwrap();
        assert_eq!(reparsed, config);
    }
}
