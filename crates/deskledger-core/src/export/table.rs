//! Per-conversation CSV table.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::{ConversationRecord, format_timestamp};

/// Column titles, in output order.
pub const COLUMNS: [&str; 9] = [
    "Id da Thread",
    "Remetente (Usuário)",
    "Setor do Chamado",
    "Chamado Fechado",
    "Chamado em Aberto",
    "Chamado em Andamento",
    "Data de Abertura",
    "Primeira Resposta (Atendimento)",
    "Tempo de Resposta em Horas",
];

/// Placeholder for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Localized yes/no for a status flag.
#[must_use]
pub const fn yes_no(flag: bool) -> &'static str {
    if flag { "Sim" } else { "Não" }
}

fn row(record: &ConversationRecord) -> [String; 9] {
    let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let sender = if record.sender.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        record.sender.clone()
    };
    [
        record.id.clone(),
        sender,
        record.sector.clone(),
        yes_no(record.resolved).to_string(),
        yes_no(record.open).to_string(),
        yes_no(record.in_progress).to_string(),
        or_na(record.opened_at.as_ref().map(format_timestamp)),
        or_na(record.responded_at.as_ref().map(format_timestamp)),
        or_na(record.response_hours.map(|h| h.to_string())),
    ]
}

/// Writes the header row and one row per record to `writer`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_records<W: Write>(records: &[ConversationRecord], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(COLUMNS)?;
    for record in records {
        out.write_record(row(record))?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the conversation table to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_records_csv(records: &[ConversationRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records(records, file)?;
    info!("CSV table written to {} ({} rows)", path.display(), records.len());
    Ok(())
}
