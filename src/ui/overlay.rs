//! Renders the retained messages as a self-contained HTML page, suitable as
//! a browser source that reloads the file.

use crate::{
    app::config::OverlaySettings,
    models::message::{ChatMessage, Segment},
    utils::text_processing::{css_color, html_escape},
};
use eyre::Context;
use std::{collections::HashSet, fmt::Write as _, path::PathBuf};

/// Columns taken by a badge or emote image.
const IMAGE_COLUMNS: usize = 2;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="1">
<style>
body { margin: 0; background: transparent; font-family: sans-serif; color: #fff; }
#container { position: absolute; bottom: 0; width: 100%; }
.chat-message { padding: 2px 4px; }
.chat-message-author { font-weight: bold; }
.chat-message-timestamp { color: #808080; }
.chat-message-author-badge { height: 1em; vertical-align: middle; margin-right: 2px; }
.chat-message-body img { height: 1.5em; vertical-align: middle; }
</style>
</head>
<body>
<div id="container">
"#;

const PAGE_TAIL: &str = "</div>\n</body>\n</html>\n";

/// Fixed-size text grid pinned to the newest message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub rows: usize,
    pub columns: usize,
}

impl Viewport {
    /// Estimated number of rows a message wraps to.
    pub fn height_of(&self, unit: &ChatMessage) -> usize {
        let header = unit.sender_name.chars().count() + 2 + unit.badges.len() * IMAGE_COLUMNS;
        let body: usize = unit
            .segments
            .iter()
            .map(|s| match s {
                Segment::Text(text) => text.chars().count(),
                Segment::Asset { .. } => IMAGE_COLUMNS,
            })
            .sum();
        (header + body).div_ceil(self.columns.max(1)).max(1)
    }

    /// Ids of the units with at least one row on screen. Units are laid out
    /// oldest first with the newest touching the bottom edge.
    pub fn visible_ids(&self, units: &[ChatMessage]) -> HashSet<u64> {
        let mut visible = HashSet::new();
        let mut rows_below = 0;

        for unit in units.iter().rev() {
            if rows_below >= self.rows {
                break;
            }
            visible.insert(unit.id);
            rows_below += self.height_of(unit);
        }

        visible
    }
}

pub struct HtmlOverlay {
    output: PathBuf,
    show_timestamps: bool,
}

impl HtmlOverlay {
    pub fn new(settings: &OverlaySettings) -> Self {
        Self {
            output: settings.output.clone(),
            show_timestamps: settings.show_timestamps,
        }
    }

    pub fn render(&self, units: &[ChatMessage]) -> String {
        let mut html = String::from(PAGE_HEAD);
        for unit in units {
            self.render_unit(&mut html, unit);
        }
        html.push_str(PAGE_TAIL);
        html
    }

    /// Replaces the output file with the rendered page.
    pub async fn write(&self, units: &[ChatMessage]) -> Result<(), eyre::Report> {
        let html = self.render(units);
        let tmp = self.output.with_extension("html.tmp");

        tokio::fs::write(&tmp, html)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, &self.output)
            .await
            .with_context(|| format!("Failed to replace {:?}", self.output))?;

        tracing::trace!("Overlay written with {} messages", units.len());
        Ok(())
    }

    fn render_unit(&self, html: &mut String, unit: &ChatMessage) {
        html.push_str("<div class=\"chat-message-container\"><div class=\"chat-message\">");

        if self.show_timestamps {
            let _ = write!(
                html,
                "<span class=\"chat-message-timestamp\">{}</span>",
                unit.timestamp.format("[%H:%M:%S] ")
            );
        }

        html.push_str("<span class=\"chat-message-author\">");
        for icon in &unit.badges {
            let _ = write!(
                html,
                "<img class=\"chat-message-author-badge\" src=\"{}\" alt=\"{}\">",
                icon.handle.data_url,
                html_escape(&icon.description)
            );
        }
        let _ = write!(
            html,
            "<span style=\"color: {}\">{}</span>: </span>",
            css_color(&unit.sender_color),
            html_escape(&unit.sender_name)
        );

        html.push_str("<span class=\"chat-message-body\">");
        for segment in &unit.segments {
            match segment {
                Segment::Text(text) => {
                    let _ = write!(html, "<span>{}</span>", html_escape(text));
                }
                Segment::Asset { name, handle } => {
                    let _ = write!(
                        html,
                        "<img src=\"{}\" alt=\"{}\" title=\"{}\">",
                        handle.data_url,
                        html_escape(name),
                        html_escape(name)
                    );
                }
            }
        }
        html.push_str("</span></div></div>\n");
    }
}
