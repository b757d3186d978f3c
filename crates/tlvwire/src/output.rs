use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tlvwire_frame::Payload;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput {
    index: usize,
    action: u8,
    content_size: usize,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

impl MessageOutput {
    fn new(index: usize, payload: &Payload, fields: Option<&[Bytes]>) -> Self {
        Self {
            index,
            action: payload.action,
            content_size: payload.content.len(),
            content: preview(&payload.content),
            fields: fields.map(|fields| fields.iter().map(|f| preview(f)).collect()),
        }
    }
}

/// Print one decoded message. `fields` is set when the content was split as
/// a sub-field block.
pub fn print_message(
    index: usize,
    payload: &Payload,
    fields: Option<&[Bytes]>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput::new(index, payload, fields);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            match fields {
                Some(fields) => {
                    table.set_header(vec!["#", "ACTION", "FIELD", "SIZE", "VALUE"]);
                    for (i, field) in fields.iter().enumerate() {
                        table.add_row(vec![
                            index.to_string(),
                            format!("0x{:02x}", payload.action),
                            i.to_string(),
                            field.len().to_string(),
                            preview(field),
                        ]);
                    }
                }
                None => {
                    table
                        .set_header(vec!["#", "ACTION", "SIZE", "CONTENT"])
                        .add_row(vec![
                            index.to_string(),
                            format!("0x{:02x}", payload.action),
                            payload.content.len().to_string(),
                            preview(&payload.content),
                        ]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!(
                "#{index} action=0x{:02x} size={}",
                payload.action,
                payload.content.len()
            );
            match fields {
                Some(fields) => {
                    for (i, field) in fields.iter().enumerate() {
                        let _ = write!(line, " field[{i}]={}", preview(field));
                    }
                }
                None => {
                    let _ = write!(line, " content={}", preview(&payload.content));
                }
            }
            println!("{line}");
        }
        OutputFormat::Raw => print_raw(&payload.content),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex without separators.
pub fn hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn preview(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", data.len()),
    }
}
