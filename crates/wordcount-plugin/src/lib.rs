//! Word count plugin: reports lines, words and bytes of the open document.

use anyhow::{bail, Result};
use notepad::plugin::{Plugin, PluginContext, PluginMenuItem};
use std::path::{Path, PathBuf};

pub const MENU_LABEL: &str = "Word Count";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub lines: usize,
    pub words: usize,
    pub bytes: usize,
}

impl Stats {
    /// Words are runs of bytes other than space and tab. Line breaks are
    /// not counted as bytes.
    pub fn count<L: AsRef<[u8]>>(lines: &[L]) -> Self {
        let mut stats = Stats {
            lines: lines.len(),
            ..Stats::default()
        };
        for line in lines {
            let line = line.as_ref();
            stats.bytes += line.len();
            stats.words += line
                .split(|&b| b == b' ' || b == b'\t')
                .filter(|word| !word.is_empty())
                .count();
        }
        stats
    }
}

#[derive(Default)]
pub struct WordCountPlugin {
    ctx: Option<PluginContext>,
    last_path: Option<PathBuf>,
}

impl WordCountPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn summary(&self, stats: Stats) -> String {
        let counts = format!(
            "Lines: {}  Words: {}  Characters: {}",
            stats.lines, stats.words, stats.bytes
        );
        match self.last_path.as_deref().and_then(Path::file_name) {
            Some(name) => format!("{}: {counts}", name.to_string_lossy()),
            None => counts,
        }
    }
}

impl Plugin for WordCountPlugin {
    fn name(&self) -> &str {
        "WordCount"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Counts the lines, words and characters of the document."
    }

    fn initialize(&mut self, ctx: PluginContext) {
        self.ctx = Some(ctx);
    }

    fn menu_items(&self) -> Vec<PluginMenuItem> {
        vec![PluginMenuItem::new(MENU_LABEL, "Plugins")]
    }

    fn execute(&mut self, action: &str) -> Result<()> {
        if action != MENU_LABEL {
            bail!("unknown action '{action}'");
        }
        let Some(ctx) = &self.ctx else {
            bail!("plugin not initialized");
        };
        let Some(stats) = ctx.document.with_lines(|lines| Stats::count(lines)) else {
            bail!("document is not available");
        };

        log::debug!("Word count: {stats:?}");
        ctx.app.message(self.summary(stats));
        Ok(())
    }

    fn on_open(&mut self, path: &Path) -> Result<()> {
        self.last_path = Some(path.to_path_buf());
        Ok(())
    }

    fn on_save(&mut self, path: &Path) -> Result<()> {
        self.last_path = Some(path.to_path_buf());
        Ok(())
    }
}

notepad::declare_plugin!(WordCountPlugin, WordCountPlugin::new);
