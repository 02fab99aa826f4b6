use std::path::Path;

use chrono::NaiveDateTime;
use eqlog_types::ClassifierSettings;
use hashbrown::HashSet;

/// Per-log classification parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyContext {
    pub player: Option<String>,
    pub server: Option<String>,
    /// Lines stamped before this are dropped.
    pub min_date: NaiveDateTime,
    /// Lines stamped after this are dropped.
    pub max_date: Option<NaiveDateTime>,
    /// Exact message texts to drop.
    pub ignore: HashSet<String>,
}

impl Default for ClassifyContext {
    fn default() -> Self {
        Self::from_settings(&ClassifierSettings::default())
    }
}

impl ClassifyContext {
    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self {
            player: settings.player.clone(),
            server: settings.server.clone(),
            min_date: settings.min_date,
            max_date: settings.max_date,
            ignore: settings.ignore.iter().cloned().collect(),
        }
    }

    /// Fill player and server from a log file named `eqlog_<Player>_<server>.txt`.
    /// Values already configured are kept.
    pub fn apply_log_filename(&mut self, path: &Path) -> bool {
        let Some((player, server)) = Self::from_log_filename(path) else {
            return false;
        };
        self.player.get_or_insert(player);
        self.server.get_or_insert(server);
        true
    }

    /// Player and server encoded in an `eqlog_<Player>_<server>.txt` file name.
    pub fn from_log_filename(path: &Path) -> Option<(String, String)> {
        let stem = path.file_stem()?.to_str()?;
        let rest = stem.strip_prefix("eqlog_")?;
        let (player, server) = rest.split_once('_')?;
        if player.is_empty() || server.is_empty() {
            return None;
        }
        Some((player.to_string(), server.to_string()))
    }

    pub(crate) fn in_range(&self, ts: NaiveDateTime) -> bool {
        ts >= self.min_date && self.max_date.is_none_or(|max| ts <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_log_filename() {
        let parsed = ClassifyContext::from_log_filename(Path::new("/logs/eqlog_Rumstil_erollisi.txt"));
        assert_eq!(parsed, Some(("Rumstil".to_string(), "erollisi".to_string())));

        assert!(ClassifyContext::from_log_filename(Path::new("dbg.txt")).is_none());
        assert!(ClassifyContext::from_log_filename(Path::new("eqlog_Rumstil.txt")).is_none());
    }

    #[test]
    fn test_apply_log_filename_keeps_configured_player() {
        let mut ctx = ClassifyContext {
            player: Some("Configured".to_string()),
            ..Default::default()
        };
        assert!(ctx.apply_log_filename(Path::new("eqlog_Rumstil_erollisi.txt")));
        assert_eq!(ctx.player.as_deref(), Some("Configured"));
        assert_eq!(ctx.server.as_deref(), Some("erollisi"));
    }
}
