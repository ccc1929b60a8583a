//! Terminal rendering of the session view.

use walrus_core::{Activity, InterpretedResult};

pub const BANNER: &str = "Workshop Walrus 1.0";
pub const GREETING: &str = "Oh hello there ya blubberin' bumble but. Won't ya describe the type of workshop you'd like to build?";
pub const LOADING: &str = "Loading...";
pub const NOTE_HEADING: &str = "ChatGPT Response:";
pub const ACTIVITIES_HEADING: &str = "Workshop Activities:";

/// Banner and greeting shown when a session starts.
pub fn header() -> String {
    format!("{}\n{}\n\n{}", BANNER, "=".repeat(BANNER.len()), GREETING)
}

/// Render a result as the note panel or the card list.
///
/// An empty activity list renders nothing.
pub fn render_result(result: &InterpretedResult) -> String {
    match result {
        InterpretedResult::Note { text } => format!("{}\n{}\n", NOTE_HEADING, text),
        InterpretedResult::Activities { items } if items.is_empty() => String::new(),
        InterpretedResult::Activities { items } => render_cards(items),
        InterpretedResult::Error { message } => {
            render_cards(&[Activity::new("error", "Error", message.clone())])
        }
    }
}

fn render_cards(items: &[Activity]) -> String {
    let mut out = format!("{}\n", ACTIVITIES_HEADING);
    for (i, activity) in items.iter().enumerate() {
        out.push_str(&format!("\n[{}] {}\n", i + 1, activity.title));
        for line in activity.description.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}
