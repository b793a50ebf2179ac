//! Built-in command catalog, shown when `!help` is answered locally.

pub const HELP_TITLE: &str = "\u{1f3ad} Roleplay Bot Commands";
pub const HELP_DESCRIPTION: &str = "Commands for interacting with your Shapes.inc character";
pub const HELP_FOOTER: &str = "Powered by Shapes.inc API";
pub const HELP_COLOUR: u32 = 0x0099FF;

/// One help entry: label, description, render inline.
pub struct HelpEntry {
    pub label: &'static str,
    pub description: &'static str,
    pub inline: bool,
}

pub const HELP_ENTRIES: &[HelpEntry] = &[
    HelpEntry {
        label: "\u{1f4ac} Chat",
        description: "Mention me or send a DM to chat with the character",
        inline: false,
    },
    HelpEntry {
        label: "\u{1f504} !reset",
        description: "Reset the character's long-term memory",
        inline: true,
    },
    HelpEntry {
        label: "\u{1f634} !sleep",
        description: "Generate long-term memory on demand",
        inline: true,
    },
    HelpEntry {
        label: "\u{1f4ca} !dashboard",
        description: "Access the character's dashboard",
        inline: true,
    },
    HelpEntry {
        label: "\u{2139}\u{fe0f} !info",
        description: "Get information about the character",
        inline: true,
    },
    HelpEntry {
        label: "\u{1f310} !web",
        description: "Search the web (e.g., !web cats)",
        inline: true,
    },
    HelpEntry {
        label: "\u{1f3a8} !imagine",
        description: "Generate images (e.g., !imagine sunset)",
        inline: true,
    },
    HelpEntry {
        label: "\u{1f9e0} !wack",
        description: "Reset short-term memory",
        inline: true,
    },
    HelpEntry {
        label: "\u{2753} !help",
        description: "Show this help message",
        inline: true,
    },
];

/// Plain-text rendering of the catalog, for channels where embeds fail.
pub fn render_text() -> String {
    let mut out = format!("**{}**\n{}\n", HELP_TITLE, HELP_DESCRIPTION);
    for entry in HELP_ENTRIES {
        out.push_str(&format!("- **{}**: {}\n", entry.label, entry.description));
    }
    out.push_str(&format!("_{}_", HELP_FOOTER));
    out
}
