//! Per-repository exception tables
//!
//! Some reports misrender warden names, and bots are credited on issues
//! without appearing in the roster. Both tables are keyed by repository name
//! and default to empty for unknown repositories.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Ledger name prefix for bot identities.
pub const BOT_PREFIX: &str = "bot-";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownReplacements {
    /// repo -> (misrendered name -> corrected name)
    #[serde(default)]
    pub typos: HashMap<String, HashMap<String, String>>,
    /// repo -> bot names credited in that report
    #[serde(default)]
    pub bots: HashMap<String, Vec<String>>,
}

impl KnownReplacements {
    /// Tables for the reports known to need them.
    pub fn builtin() -> Self {
        Self {
            typos: HashMap::from([(
                "2022-11-size".to_string(),
                HashMap::from([("_141345_".to_string(), "__141345__".to_string())]),
            )]),
            bots: HashMap::from([
                ("2023-10-wildcat".to_string(), vec!["henry".to_string()]),
                ("2023-08-dopex".to_string(), vec!["IllIllI".to_string()]),
            ]),
        }
    }

    pub fn typos_for(&self, repo_name: &str) -> HashMap<String, String> {
        self.typos.get(repo_name).cloned().unwrap_or_default()
    }

    pub fn bots_for(&self, repo_name: &str) -> Vec<String> {
        self.bots.get(repo_name).cloned().unwrap_or_default()
    }
}

/// Ledger name for a bot.
pub fn bot_name(name: &str) -> String {
    format!("{}{}", BOT_PREFIX, name)
}
