use crate::error::SubmitError;
use crate::session::{LogEvent, SessionContext};

/// Reserve a barcode for the current folder session.
///
/// The used set is updated before the `RESERVED` line is written, so a second
/// attempt for the same code is rejected regardless of how the write went.
/// Codes with inner whitespace are refused: the log stores `barcode=<token>`
/// and such a code would not be recovered whole on reload.
/// Returns the trimmed barcode.
pub async fn reserve(ctx: &mut SessionContext, code: &str) -> Result<String, SubmitError> {
    let barcode = code.trim();
    if barcode.is_empty() {
        return Err(SubmitError::EmptyBarcode);
    }

    if barcode.contains(char::is_whitespace) {
        return Err(SubmitError::InvalidBarcode(barcode.to_string()));
    }

    if !ctx.used_mut().insert(barcode) {
        return Err(SubmitError::DuplicateBarcode(barcode.to_string()));
    }

    ctx.activity_mut()
        .info(format!("Barcode {} reserved", barcode));
    ctx.record(LogEvent::Reserved {
        barcode: barcode.to_string(),
    })
    .await;

    Ok(barcode.to_string())
}
