//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat};
use crate::{
    config::{OutputFormat, RemovalConfig},
    utils::ConfigValidator,
};
use anyhow::{Context, Result};

/// Convert CLI arguments to `RemovalConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `RemovalConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        let config = RemovalConfig::builder()
            .output_format(Self::output_format(cli.format))
            .jpeg_quality(cli.jpeg_quality)
            .webp_quality(cli.webp_quality)
            .flatten_input_alpha(!cli.keep_alpha)
            .debug(cli.verbose >= 2)
            .build()
            .context("Invalid configuration")?;

        Ok(config)
    }

    pub(crate) fn output_format(format: CliOutputFormat) -> OutputFormat {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Webp => OutputFormat::WebP,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
            CliOutputFormat::Rgba8 => OutputFormat::Rgba8,
        }
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        ConfigValidator::validate_quality_settings(cli.jpeg_quality, cli.webp_quality)
            .context("Invalid quality settings")?;

        if let Some(pattern) = &cli.pattern {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid file name pattern: {}", pattern))?;
        }

        let uses_stdin = cli.input.iter().any(|input| input == "-");
        if uses_stdin && cli.input.len() > 1 {
            anyhow::bail!("stdin (-) cannot be combined with other inputs");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trimbg").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_config_conversion() {
        let cli = parse(&["photo.jpg"]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.webp_quality, 85);
        assert!(config.flatten_input_alpha);
        assert!(!config.debug);
    }

    #[test]
    fn test_cli_flags_map_to_config() {
        let cli = parse(&["-f", "webp", "--webp-quality", "70", "--keep-alpha", "-vv", "a.png"]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.output_format, OutputFormat::WebP);
        assert_eq!(config.webp_quality, 70);
        assert!(!config.flatten_input_alpha);
        assert!(config.debug);
    }

    #[test]
    fn test_cli_validation() {
        let mut cli = parse(&["photo.jpg"]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());

        cli.jpeg_quality = 150;
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        cli.jpeg_quality = 90;
        cli.pattern = Some("[unclosed".to_string());
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());
    }

    #[test]
    fn test_stdin_must_be_alone() {
        let cli = parse(&["-", "other.png"]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_err());

        let cli = parse(&["-"]);
        assert!(CliConfigBuilder::validate_cli(&cli).is_ok());
    }
}
