//! `graphcal uid`

use graphcal_core::GlobalObjectId;
use serde::Serialize;

use crate::error::ClientResult;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct UidOutput<'a> {
    ical_uid: &'a str,
    global_object_id: &'a str,
}

/// Converts a hex `iCalUId` to its base64 `GlobalObjectId` and prints it.
pub fn run(hex: &str, format: OutputFormat) -> ClientResult<GlobalObjectId> {
    let id = GlobalObjectId::from_ical_uid(hex)?;
    match format {
        OutputFormat::Json => output::print_json(&UidOutput {
            ical_uid: hex,
            global_object_id: id.as_str(),
        })?,
        OutputFormat::Text => println!("{}", id),
    }
    Ok(id)
}
