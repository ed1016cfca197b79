//! Renders lookup outcomes as chat text.

use teloxide::utils::markdown;

use crate::dictionary::{DefinitionEntry, LookupOutcome};
use crate::platform::RenderMode;

pub fn render_outcome(query: &str, outcome: &LookupOutcome, mode: RenderMode) -> String {
    match outcome {
        LookupOutcome::Found(entry) => render_entry(entry, mode),
        LookupOutcome::NotFound => {
            render_notice(&format!("❌ No definition found for \"{}\".", query), mode)
        }
        LookupOutcome::ServiceError(message) => {
            render_notice(&format!("⚠️ An error occurred: {}", message), mode)
        }
    }
}

/// One line per present field, header first.
pub fn render_entry(entry: &DefinitionEntry, mode: RenderMode) -> String {
    let mut lines = vec![field_line("🔤 Word:", &entry.word, mode)];

    if let Some(phonetic) = &entry.phonetic {
        lines.push(field_line("🔊 Phonetics:", phonetic, mode));
    }
    if let Some(origin) = &entry.origin {
        lines.push(field_line("📜 Origin:", origin, mode));
    }
    if let Some(part_of_speech) = &entry.part_of_speech {
        lines.push(field_line("📖 Part of Speech:", part_of_speech, mode));
    }
    if let Some(definition) = &entry.definition {
        lines.push(field_line("📚 Definition:", definition, mode));
        if let Some(example) = &entry.example {
            lines.push(field_line("📝 Example:", example, mode));
        }
    }

    lines.join("\n")
}

fn field_line(label: &str, value: &str, mode: RenderMode) -> String {
    match mode {
        RenderMode::Plain => format!("{} {}", label, value),
        RenderMode::Markdown => format!(
            "{} {}",
            markdown::escape(label),
            markdown::bold(&markdown::escape(value))
        ),
    }
}

fn render_notice(text: &str, mode: RenderMode) -> String {
    match mode {
        RenderMode::Plain => text.to_string(),
        RenderMode::Markdown => markdown::escape(text),
    }
}
