use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use block_hopper_core::LevelRecord;

const TRANSFER_DOMAIN: &str = "level";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const TRANSFER_HEADER: &str = "level:v1";
/// Delimiter used to separate the prefix, canvas dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a level record into a single-line string suitable for sharing.
pub(crate) fn encode(record: &LevelRecord) -> Result<String, LayoutTransferError> {
    let rendering = record.layout.rendering;
    let json = serde_json::to_vec(record).map_err(LayoutTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        rendering.canvas_width_blocks, rendering.canvas_height_blocks
    ))
}

/// Decodes a level record from its transfer string.
///
/// The record is not re-validated here.
pub(crate) fn decode(value: &str) -> Result<LevelRecord, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let record: LevelRecord =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    let rendering = record.layout.rendering;
    if (rendering.canvas_width_blocks, rendering.canvas_height_blocks) != (columns, rows) {
        return Err(LayoutTransferError::InvalidDimensions(dimensions.to_owned()));
    }
    Ok(record)
}

/// Errors that can occur while encoding or decoding level transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The canvas dimensions were missing.
    #[error("transfer string is missing the canvas dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The prefix segment was not the level prefix.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version identifier is not supported.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The dimensions could not be parsed or disagree with the payload.
    #[error("could not use canvas dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be (de)serialised.
    #[error("could not parse transfer payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_hopper_system_level_seeding::built_in_levels;

    fn level_four() -> LevelRecord {
        built_in_levels()
            .into_iter()
            .find(|record| record.level.as_str() == "4")
            .expect("level four ships with the game")
    }

    #[test]
    fn encoded_level_decodes_to_same_record() {
        let record = level_four();

        let encoded = encode(&record).expect("record encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:24x10:")));
        assert_eq!(decode(&encoded).expect("record decodes"), record);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let encoded = encode(&level_four()).expect("record encodes");
        let tampered = encoded.replacen(":24x10:", ":20x10:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(LayoutTransferError::InvalidDimensions(dimensions)) if dimensions == "20x10"
        ));
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        assert!(matches!(
            decode("stage:v1:24x10:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "stage"
        ));
        assert!(matches!(decode("   "), Err(LayoutTransferError::EmptyPayload)));
        assert!(matches!(
            decode("level:v1"),
            Err(LayoutTransferError::MissingDimensions)
        ));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(matches!(
            decode("level:v1:24x10:!!!"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            decode("level:v1:24x10:e30"),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }
}
