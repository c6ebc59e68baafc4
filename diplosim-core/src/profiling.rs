//! Optional Tracy spans for the turn loop.
//!
//! Build with `--features tracy` and call [`init_tracy`] before the first
//! turn. Decay sweeps and pact cascades show up as spans; [`frame_mark_turn`]
//! separates turns.

/// How much span detail reaches Tracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceLevel {
    /// Turn and cascade spans
    #[default]
    Info,
    /// Adds per-registry decay
    Debug,
    Trace,
}

impl std::str::FromStr for TraceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(TraceLevel::Info),
            "debug" => Ok(TraceLevel::Debug),
            "trace" => Ok(TraceLevel::Trace),
            other => Err(format!("unknown trace level '{}' (info, debug, trace)", other)),
        }
    }
}

/// Install the Tracy layer as the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
#[cfg(feature = "tracy")]
pub fn init_tracy(level: TraceLevel) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let filter = match level {
        TraceLevel::Info => LevelFilter::INFO,
        TraceLevel::Debug => LevelFilter::DEBUG,
        TraceLevel::Trace => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_tracy::TracyLayer::default())
        .with(filter)
        .init();
}

#[cfg(not(feature = "tracy"))]
pub fn init_tracy(_level: TraceLevel) {}

/// Close the current turn's frame.
#[cfg(feature = "tracy")]
#[inline]
pub fn frame_mark_turn() {
    tracy_client::secondary_frame_mark!("turn");
}

#[cfg(not(feature = "tracy"))]
#[inline]
pub fn frame_mark_turn() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace_level() {
        assert_eq!("DEBUG".parse::<TraceLevel>(), Ok(TraceLevel::Debug));
        assert_eq!("info".parse::<TraceLevel>(), Ok(TraceLevel::Info));
        assert!("verbose".parse::<TraceLevel>().is_err());
    }
}
