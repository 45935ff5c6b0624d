//! Spot the build scan URL in the console output recorded by the log.
//!
//! When the Develocity plugin publishes a build scan it prints a
//! "Publishing build scan..." line, and the next line it prints is the scan
//! URL. Both arrive as styled text progress events.

use super::record::{BuildOperationProgress, Details};

/// Progress details class of a line of console output.
pub const STYLED_TEXT_OUTPUT_EVENT: &str = "org.gradle.internal.logging.events.StyledTextOutputEvent";

/// Logging category used by the Develocity Gradle plugin.
pub const DEVELOCITY_PLUGIN_CATEGORY: &str = "com.gradle.develocity.agent.gradle.DevelocityPlugin";

/// Lines announcing that the next line will be the scan URL. Older plugin
/// versions use the first spelling.
const PUBLISHING_PREFIXES: [&str; 3] = [
    "Publishing build scan...",
    "Publishing Build Scan...",
    "Publishing Build Scan to Develocity...",
];

#[derive(Debug, Default)]
pub struct BuildScanDetector {
    expecting_url: bool,
}

impl BuildScanDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one progress event. Returns the URL when this event completes the
    /// announce-then-URL sequence.
    pub fn observe(&mut self, progress: &BuildOperationProgress) -> Option<String> {
        if progress.details_class_name.as_deref() != Some(STYLED_TEXT_OUTPUT_EVENT) {
            return None;
        }
        let text = plugin_output(progress.details.as_ref()?)?;

        if PUBLISHING_PREFIXES.iter().any(|p| text.starts_with(p)) {
            self.expecting_url = true;
            None
        } else if std::mem::take(&mut self.expecting_url) && text.starts_with("http") {
            Some(text.to_string())
        } else {
            None
        }
    }

    pub fn is_expecting_url(&self) -> bool {
        self.expecting_url
    }
}

/// Text of the first span of a Develocity plugin console line.
fn plugin_output(details: &Details) -> Option<&str> {
    if details.get("category")?.as_str()? != DEVELOCITY_PLUGIN_CATEGORY {
        return None;
    }
    details
        .get("spans")?
        .as_list()?
        .first()?
        .as_map()?
        .get("text")?
        .as_str()
}
