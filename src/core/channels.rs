use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

use crate::core::pipeline::ColorTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    X,
    LinkedIn,
    Instagram,
    Facebook,
    Threads,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::X,
        Channel::LinkedIn,
        Channel::Instagram,
        Channel::Facebook,
        Channel::Threads,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::LinkedIn => "li",
            Channel::Instagram => "ig",
            Channel::Facebook => "fb",
            Channel::Threads => "th",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::X => "X",
            Channel::LinkedIn => "LinkedIn",
            Channel::Instagram => "Instagram",
            Channel::Facebook => "Facebook",
            Channel::Threads => "Threads",
        }
    }

    pub fn color(self) -> ColorTag {
        match self {
            Channel::X | Channel::Threads => ColorTag::Slate,
            Channel::LinkedIn => ColorTag::Blue,
            Channel::Instagram => ColorTag::Pink,
            Channel::Facebook => ColorTag::Indigo,
        }
    }

    /// Key that toggles this channel in the dashboard.
    pub fn hotkey(self) -> char {
        match self {
            Channel::X => 'x',
            Channel::LinkedIn => 'l',
            Channel::Instagram => 'i',
            Channel::Facebook => 'f',
            Channel::Threads => 't',
        }
    }

    pub fn from_hotkey(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|c| c.hotkey() == key)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.id() == needle || c.name().to_lowercase() == needle)
            .ok_or_else(|| anyhow!("Unknown distribution channel '{}'", s))
    }
}

/// Selected channels in the order they were picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    selected: Vec<Channel>,
}

impl Default for ChannelSelection {
    fn default() -> Self {
        Self {
            selected: vec![Channel::X, Channel::LinkedIn],
        }
    }
}

impl ChannelSelection {
    pub fn empty() -> Self {
        Self { selected: vec![] }
    }

    /// Adds `channel` when absent, removes it when present.
    pub fn toggle(&mut self, channel: Channel) {
        if let Some(pos) = self.selected.iter().position(|c| *c == channel) {
            self.selected.remove(pos);
        } else {
            self.selected.push(channel);
        }
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.selected.contains(&channel)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        self.selected.iter().copied()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.iter().map(Channel::id).collect()
    }

    /// Display names joined for prompts, e.g. `"X, LinkedIn"`.
    pub fn joined_names(&self) -> String {
        self.iter().map(Channel::name).collect::<Vec<_>>().join(", ")
    }

    /// Parses a comma-separated id list such as `"x,li,ig"`. Duplicates are kept once.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut selection = Self::empty();
        for raw in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let channel: Channel = raw.parse()?;
            if !selection.contains(channel) {
                selection.selected.push(channel);
            }
        }
        Ok(selection)
    }
}

impl FromIterator<Channel> for ChannelSelection {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut selection = Self::empty();
        for channel in iter {
            if !selection.contains(channel) {
                selection.selected.push(channel);
            }
        }
        selection
    }
}
