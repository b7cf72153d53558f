//! Record Decoder - full twelve-field decode of one line
//!
//! Records are decoded lazily: the indexing pass never materializes one,
//! only queries do, and only for the offsets their index lookup selected.
//! Decoding is a pure function over the line bytes and is safe to call
//! concurrently from query workers.

use crate::store::error::{StoreError, StoreResult};
use crate::store::extract::parse_uint;

/// Number of delimiter-separated fields in every record line
pub const FIELD_COUNT: usize = 12;

/// Field positions within a record line, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Field {
    Click = 0,
    Impression,
    DisplayUrl,
    AdId,
    AdvertiserId,
    Depth,
    Position,
    QueryId,
    KeywordId,
    TitleId,
    DescriptionId,
    UserId,
}

/// One fully decoded click/impression event
///
/// Immutable once decoded. A record has no id of its own; its identity is
/// the byte offset of its line in the [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub click: u16,
    pub impression: u32,
    pub display_url: u64,
    pub ad_id: u32,
    pub advertiser_id: u16,
    pub depth: u8,
    pub position: u8,
    pub query_id: u32,
    pub keyword_id: u32,
    pub title_id: u32,
    pub description_id: u32,
    pub user_id: u32,
}

impl Record {
    /// Decode one line into a record
    ///
    /// Fails with [`StoreError::MalformedRecord`] when the line has fewer
    /// than twelve fields or a non-numeric byte, and with
    /// [`StoreError::ValueOverflow`] when a value does not fit its field
    /// width. Fields past the twelfth are ignored.
    pub fn parse(line: &[u8], delim: u8) -> StoreResult<Self> {
        let mut values = [0u64; FIELD_COUNT];
        let mut count = 0;

        for raw in line.split(|&b| b == delim) {
            if count == FIELD_COUNT {
                break;
            }
            values[count] = parse_uint(raw, count)?;
            count += 1;
        }

        if count < FIELD_COUNT {
            return Err(StoreError::MalformedRecord(format!(
                "line has {} of {} fields",
                count, FIELD_COUNT
            )));
        }

        Ok(Self {
            click: narrow(values[Field::Click as usize], Field::Click)?,
            impression: narrow(values[Field::Impression as usize], Field::Impression)?,
            display_url: values[Field::DisplayUrl as usize],
            ad_id: narrow(values[Field::AdId as usize], Field::AdId)?,
            advertiser_id: narrow(values[Field::AdvertiserId as usize], Field::AdvertiserId)?,
            depth: narrow(values[Field::Depth as usize], Field::Depth)?,
            position: narrow(values[Field::Position as usize], Field::Position)?,
            query_id: narrow(values[Field::QueryId as usize], Field::QueryId)?,
            keyword_id: narrow(values[Field::KeywordId as usize], Field::KeywordId)?,
            title_id: narrow(values[Field::TitleId as usize], Field::TitleId)?,
            description_id: narrow(values[Field::DescriptionId as usize], Field::DescriptionId)?,
            user_id: narrow(values[Field::UserId as usize], Field::UserId)?,
        })
    }

    /// Check an exact match on the `get` filter tuple
    pub fn matches(&self, ad_id: u32, query_id: u32, position: u8, depth: u8) -> bool {
        self.ad_id == ad_id
            && self.query_id == query_id
            && self.position == position
            && self.depth == depth
    }

    /// Check if this event was clicked at least once
    pub fn is_clicked(&self) -> bool {
        self.click > 0
    }

    /// The creative tuple grouped by `impressed`
    pub fn creative(&self) -> (u16, u32, u32, u32) {
        (
            self.advertiser_id,
            self.keyword_id,
            self.title_id,
            self.description_id,
        )
    }
}

/// Narrow a parsed `u64` to the field's declared width
fn narrow<T: TryFrom<u64>>(value: u64, field: Field) -> StoreResult<T> {
    T::try_from(value).map_err(|_| StoreError::ValueOverflow {
        field: field as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &[u8] = b"1\t42\t900000000000\t305\t12\t2\t1\t77\t88\t99\t100\t123456";

    #[test]
    fn test_parse_full_record() {
        let record = Record::parse(LINE, b'\t').unwrap();

        assert_eq!(record.click, 1);
        assert_eq!(record.impression, 42);
        assert_eq!(record.display_url, 900000000000);
        assert_eq!(record.ad_id, 305);
        assert_eq!(record.advertiser_id, 12);
        assert_eq!(record.depth, 2);
        assert_eq!(record.position, 1);
        assert_eq!(record.query_id, 77);
        assert_eq!(record.keyword_id, 88);
        assert_eq!(record.title_id, 99);
        assert_eq!(record.description_id, 100);
        assert_eq!(record.user_id, 123456);
    }

    #[test]
    fn test_parse_too_few_fields() {
        let err = Record::parse(b"1\t2\t3", b'\t').unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord(_)));
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(matches!(
            Record::parse(b"", b'\t'),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_parse_non_numeric() {
        let line = b"1\t42\tabc\t305\t12\t2\t1\t77\t88\t99\t100\t123456";
        assert!(matches!(
            Record::parse(line, b'\t'),
            Err(StoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_parse_width_overflow() {
        // click is u16; 70000 does not fit
        let line = b"70000\t42\t9\t305\t12\t2\t1\t77\t88\t99\t100\t123456";
        assert!(matches!(
            Record::parse(line, b'\t'),
            Err(StoreError::ValueOverflow { field: 0 })
        ));

        // depth is u8
        let line = b"1\t42\t9\t305\t12\t300\t1\t77\t88\t99\t100\t123456";
        assert!(matches!(
            Record::parse(line, b'\t'),
            Err(StoreError::ValueOverflow { field: 5 })
        ));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let line = b"1\t42\t9\t305\t12\t2\t1\t77\t88\t99\t100\t123456\t999";
        let record = Record::parse(line, b'\t').unwrap();
        assert_eq!(record.user_id, 123456);
    }

    #[test]
    fn test_matches_and_projections() {
        let record = Record::parse(LINE, b'\t').unwrap();

        assert!(record.matches(305, 77, 1, 2));
        assert!(!record.matches(305, 77, 2, 2));
        assert!(record.is_clicked());
        assert_eq!(record.creative(), (12, 88, 99, 100));
    }
}
