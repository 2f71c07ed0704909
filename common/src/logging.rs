use eyre::WrapErr;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Setup logging and error reporting
///
/// More specific targets can be enabled through the `RUST_LOG` environment variable using
/// tracing directives, i.e. `RUST_LOG=info,event_types=debug`.
pub fn init(default_level: Level, format: Format) -> eyre::Result<()> {
    let debug = cfg!(debug_assertions);

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let output = match format {
        Format::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        Format::Pretty => tracing_subscriber::fmt::layer()
            .with_file(debug)
            .with_line_number(debug)
            .with_target(true)
            .boxed(),
    };

    Registry::default()
        .with(filter)
        .with(output)
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("failed to initialize logging")
}

/// How log lines are written to stdout
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    /// Human readable, multi-field lines
    #[default]
    Pretty,
    /// One JSON object per line, for log collectors
    Json,
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

/// The requested log format is not supported
#[derive(Debug)]
pub struct UnknownFormat(String);

impl Display for UnknownFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log format {:?}, expected one of: pretty, json", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

#[cfg(test)]
mod tests {
    use super::Format;

    #[test]
    fn parses_known_formats() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("text".parse::<Format>().unwrap(), Format::Pretty);
    }

    #[test]
    fn rejects_unknown_format() {
        let error = "yaml".parse::<Format>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "unknown log format \"yaml\", expected one of: pretty, json"
        );
    }
}
