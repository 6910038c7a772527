//! Decoding of the SMART READ DATA attribute table.
//!
//! The response block starts with a two byte revision number followed by 30
//! fixed-size attribute entries of 12 bytes each:
//!
//! | offset | field                          |
//! |--------|--------------------------------|
//! | 0      | attribute id (0 = unused slot) |
//! | 1..=2  | status flags                   |
//! | 3      | normalized value               |
//! | 4      | worst value                    |
//! | 5..=10 | raw value, little endian       |
//! | 11     | reserved                       |
//!
//! Attribute 194 (temperature) keeps three separate readings in the raw
//! bytes instead of one number.

use std::fmt;

use crate::names::AttributeNames;


pub const SMART_DATA_LEN: usize = 512;

pub const TABLE_OFFSET: usize = 2;
pub const ENTRY_LEN: usize = 12;
/// The walk continues while the entry offset is below this bound.
pub const TABLE_END: usize = 361;
pub const MAX_ATTRIBUTES: usize = 30;

pub const TEMPERATURE_ID: u8 = 194;

const STATUS_ONLINE_COLLECTION: u8 = 0x02;

// Bytes 0..=10 of an entry; the reserved byte is never read.
const ENTRY_USED_LEN: usize = 11;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue {
    /// 48-bit raw value.
    Raw(u64),
    Temperature { current: u8, min: u8, max: u8 },
}

impl AttributeValue {
    /// Single number reported to metrics sinks: the raw value, or the current
    /// reading for temperature.
    pub fn metric(&self) -> u64 {
        match *self {
            AttributeValue::Raw(raw) => raw,
            AttributeValue::Temperature { current, .. } => current as u64,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Raw(raw) => write!(f, "{}", raw),
            AttributeValue::Temperature { current, min, max } => {
                write!(f, "{} (Min/Max {}/{})", current, min, max)
            }
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord<'n> {
    pub id: u8,
    pub online_collection: bool,
    pub value: AttributeValue,
    pub description: &'n str,
}


/// Iterator over the used slots of an attribute table, in table order.
pub struct Attributes<'a, 'n> {
    data: &'a [u8; SMART_DATA_LEN],
    names: &'n AttributeNames,
    offset: usize,
}

impl<'a, 'n> Attributes<'a, 'n> {
    pub fn new(data: &'a [u8; SMART_DATA_LEN], names: &'n AttributeNames) -> Self {
        Attributes { data, names, offset: TABLE_OFFSET }
    }

    fn decode(&self, entry: &[u8]) -> AttributeRecord<'n> {
        let id = entry[0];

        let value = if id == TEMPERATURE_ID {
            AttributeValue::Temperature {
                current: entry[5],
                min: entry[7],
                max: entry[9],
            }
        } else {
            let raw = entry[5..=10]
                .iter()
                .enumerate()
                .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << (8 * i)));

            AttributeValue::Raw(raw)
        };

        AttributeRecord {
            id,
            online_collection: entry[1] & STATUS_ONLINE_COLLECTION != 0,
            value,
            description: self.names.lookup(id),
        }
    }
}

impl<'a, 'n> Iterator for Attributes<'a, 'n> {
    type Item = AttributeRecord<'n>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < TABLE_END {
            let entry = &self.data[self.offset..self.offset + ENTRY_USED_LEN];
            self.offset += ENTRY_LEN;

            if entry[0] != 0 {
                return Some(self.decode(entry));
            }
        }

        None
    }
}

pub fn parse_attributes<'n>(data: &[u8; SMART_DATA_LEN], names: &'n AttributeNames) -> Vec<AttributeRecord<'n>> {
    Attributes::new(data, names).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::UNKNOWN_ATTRIBUTE;

    fn slot(buf: &mut [u8; SMART_DATA_LEN], index: usize, id: u8, status: u8, raw: [u8; 6]) {
        let off = TABLE_OFFSET + index * ENTRY_LEN;
        buf[off] = id;
        buf[off + 1] = status;
        buf[off + 5..off + 11].copy_from_slice(&raw);
    }

    #[test]
    fn empty_table() {
        let buf = [0u8; SMART_DATA_LEN];
        assert!(parse_attributes(&buf, &AttributeNames::standard()).is_empty());
    }

    #[test]
    fn single_raw_attribute() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 9, 0x02, [100, 0, 0, 0, 0, 0]);

        let records = parse_attributes(&buf, &names);
        assert_eq!(
            records,
            vec![AttributeRecord {
                id: 9,
                online_collection: true,
                value: AttributeValue::Raw(100),
                description: "Power-On Hours",
            }]
        );
    }

    #[test]
    fn temperature_triple() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 194, 0x22, [35, 0xaa, 20, 0xbb, 60, 0xcc]);

        let records = parse_attributes(&buf, &names);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, AttributeValue::Temperature { current: 35, min: 20, max: 60 });
        assert_eq!(records[0].value.metric(), 35);
        assert!(records[0].online_collection);
    }

    #[test]
    fn raw_value_is_48_bit_little_endian() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 241, 0x00, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        slot(&mut buf, 1, 5, 0x00, [0xff; 6]);

        let records = parse_attributes(&buf, &names);
        assert_eq!(records[0].value, AttributeValue::Raw(0x0605_0403_0201));
        assert_eq!(records[1].value, AttributeValue::Raw(0xffff_ffff_ffff));
    }

    #[test]
    fn neighbouring_bytes_do_not_leak_into_raw() {
        let names = AttributeNames::standard();
        let mut buf = [0xeeu8; SMART_DATA_LEN];
        // Clear all slot ids except the one under test.
        for i in 0..MAX_ATTRIBUTES {
            buf[TABLE_OFFSET + i * ENTRY_LEN] = 0;
        }
        slot(&mut buf, 3, 1, 0x00, [7, 0, 0, 0, 0, 0]);

        let records = parse_attributes(&buf, &names);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, AttributeValue::Raw(7));
    }

    #[test]
    fn online_collection_flag() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 1, 0x02, [0; 6]);
        slot(&mut buf, 1, 3, 0x01, [0; 6]);
        slot(&mut buf, 2, 4, 0x03, [0; 6]);
        slot(&mut buf, 3, 7, 0xfd, [0; 6]);

        let flags: Vec<bool> = Attributes::new(&buf, &names).map(|r| r.online_collection).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn unused_slots_are_skipped_in_table_order() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 12, 0, [1, 0, 0, 0, 0, 0]);
        slot(&mut buf, 4, 1, 0, [2, 0, 0, 0, 0, 0]);
        slot(&mut buf, 29, 200, 0, [3, 0, 0, 0, 0, 0]);

        let ids: Vec<u8> = Attributes::new(&buf, &names).map(|r| r.id).collect();
        assert_eq!(ids, vec![12, 1, 200]);
    }

    #[test]
    fn full_table() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        for i in 0..MAX_ATTRIBUTES {
            slot(&mut buf, i, (i + 1) as u8, 0, [i as u8, 0, 0, 0, 0, 0]);
        }

        let records = parse_attributes(&buf, &names);
        assert_eq!(records.len(), MAX_ATTRIBUTES);
        assert_eq!(records[29].id, 30);
        assert_eq!(records[29].value, AttributeValue::Raw(29));
    }

    #[test]
    fn walk_stops_at_table_end() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];

        // Last slot starts at 350; byte 361 is its reserved byte and must not
        // be folded into the raw value.
        slot(&mut buf, 29, 9, 0, [1, 0, 0, 0, 0, 0]);
        buf[361] = 0xff;
        // Something that looks like a 31st slot.
        buf[362] = 9;
        buf[367] = 42;

        let records = parse_attributes(&buf, &names);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, AttributeValue::Raw(1));
    }

    #[test]
    fn unknown_description() {
        let names = AttributeNames::standard();
        let mut buf = [0u8; SMART_DATA_LEN];
        slot(&mut buf, 0, 99, 0, [0; 6]);

        let records = parse_attributes(&buf, &names);
        assert_eq!(records[0].description, UNKNOWN_ATTRIBUTE);
    }

    #[test]
    fn value_display() {
        assert_eq!(AttributeValue::Raw(1234).to_string(), "1234");
        assert_eq!(
            AttributeValue::Temperature { current: 35, min: 20, max: 60 }.to_string(),
            "35 (Min/Max 20/60)"
        );
    }
}
