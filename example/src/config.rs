use std::{fs, path::Path};

use anyhow::Context;
use date_selector::{DateSelectorArgs, px::Px};

use crate::Cli;

/// Builds the selector arguments: defaults, then the optional TOML file,
/// then command-line overrides.
pub fn load(cli: &Cli) -> anyhow::Result<DateSelectorArgs> {
    let mut args = match &cli.config {
        Some(path) => from_file(path)?,
        None => DateSelectorArgs::default(),
    };
    if let Some(width) = cli.item_width {
        args.item_width = Px(width);
    }
    if let Some(threshold) = cli.edge_threshold {
        args.edge_threshold = threshold;
    }
    if let Some(chunk) = cli.chunk_days {
        args.chunk_days = chunk;
    }
    args.validate()?;
    Ok(args)
}

fn from_file(path: &Path) -> anyhow::Result<DateSelectorArgs> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use date_selector::ResetPolicy;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let args: DateSelectorArgs = toml::from_str(
            r#"
            chunk_days = 180
            item_width = 40
            reset_retry_delay = 250

            [reset_policy]
            kind = "outside_comfort_range"
            margin_days = 45
            "#,
        )
        .unwrap();

        assert_eq!(args.chunk_days, 180);
        assert_eq!(args.item_width, Px(40));
        assert_eq!(args.reset_retry_delay, Duration::from_millis(250));
        assert_eq!(
            args.reset_policy,
            ResetPolicy::OutsideComfortRange { margin_days: 45 }
        );
        assert_eq!(args.days_before, 182);
        assert_eq!(args.item_spacing, Px(8));
    }
}
