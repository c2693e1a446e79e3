use client_core::events::{PickerEvent, StatusKind};

/// One console line per event.
pub fn render(event: &PickerEvent) -> Option<String> {
    let line = match event {
        PickerEvent::Status { text, kind } => match kind {
            StatusKind::Ok => format!("[status] {text}"),
            StatusKind::Warn => format!("[status!] {text}"),
        },
        PickerEvent::InputsChanged { from, to } => {
            format!("[inputs] from: {} | to: {}", or_dash(from), or_dash(to))
        }
        PickerEvent::DriversUpdated { count } => format!("[drivers] {count} nearby"),
        PickerEvent::SearchResults(results) if results.is_empty() => return None,
        PickerEvent::SearchResults(results) => {
            let mut out = String::from("[search]");
            for (i, result) in results.iter().enumerate() {
                out.push_str(&format!("\n  {}. {}", i + 1, result.display_name));
            }
            out
        }
        PickerEvent::Alert(text) => format!("[alert] {text}"),
        PickerEvent::ThemeApplied(theme) => {
            format!("[theme] bg {} fg {} button {}", theme.bg, theme.fg, theme.btn)
        }
        PickerEvent::OrderSubmitted { delivered: true } => "[order] sent to the chat".into(),
        PickerEvent::OrderSubmitted { delivered: false } => "[order] logged locally".into(),
    };
    Some(line)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
