//! Keyword records: the link targets of the Text record they follow.

use super::reader::RecordReader;
use super::record::{RecordHeader, RecordType};
use crate::error::{Error, Result};
use crate::model::KeywordRecord;
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::io::{Read, Seek};

/// A keyword record together with the truncation found while reading it, if any.
#[derive(Debug)]
pub struct KeywordRead {
    pub record: KeywordRecord,
    pub problem: Option<Error>,
}

/// Reads the Keyword record at the current position.
///
/// Returns `None` when the input ends or the next record is of another type.
pub fn read_keyword_record<R: Read + Seek>(
    reader: &mut RecordReader<R>,
) -> Result<Option<KeywordRead>> {
    let offset = reader.position()?;
    let Some(header) = RecordHeader::read_opt(reader)? else {
        debug!("No keyword record at offset {}: end of input", offset);
        return Ok(None);
    };
    if header.record_type() != RecordType::Keyword {
        debug!(
            "No keyword record at offset {}: found {:?}",
            offset,
            header.record_type()
        );
        return Ok(None);
    }

    let payload_offset = offset + RecordHeader::SIZE;
    let payload = reader.read_up_to(usize::from(header.length))?;
    Ok(Some(parse_keyword_payload(payload_offset, usize::from(header.length), &payload)))
}

/// Decodes a Keyword payload, keeping every id that is fully present.
pub fn parse_keyword_payload(offset: u64, declared: usize, payload: &[u8]) -> KeywordRead {
    let word = |index: usize| {
        payload
            .get(index * 2..index * 2 + 2)
            .map(LittleEndian::read_u16)
    };

    let mut record = KeywordRecord::default();
    let (Some(up), Some(down), Some(count)) = (word(0), word(1), word(2)) else {
        return KeywordRead {
            record,
            problem: Some(Error::ShortRead {
                offset,
                expected: 6,
                got: payload.len(),
            }),
        };
    };
    record.up = up;
    record.down = down;
    record.contexts = (0..usize::from(count)).map_while(|i| word(3 + i)).collect();

    let expected = 6 + usize::from(count) * 2;
    let problem = if record.contexts.len() < usize::from(count) {
        Some(Error::ShortRead {
            offset,
            expected,
            got: payload.len(),
        })
    } else if payload.len() < declared {
        Some(Error::ShortRead {
            offset,
            expected: declared,
            got: payload.len(),
        })
    } else {
        None
    };

    KeywordRead { record, problem }
}
