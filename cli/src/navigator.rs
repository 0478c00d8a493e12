use std::io::Write;

use insight_client::{Navigation, Navigator};

/// Reports guard redirects on stderr.
///
/// A terminal has no views to switch, so the redirect becomes a notice
/// telling the user the backend is still busy and which view they were
/// sent back to.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, navigation: Navigation) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{} (returning to {})",
            navigation.message, navigation.path
        );
    }
}
