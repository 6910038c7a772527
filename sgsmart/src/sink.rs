//! Destinations for the records of a poll cycle.

use std::io::{self, Write};

use serde::Serialize;
use tracing::info;

use crate::attribute::AttributeRecord;
use crate::cycle::Snapshot;


pub const MEASUREMENT: &str = "smart";
pub const DEFAULT_DATABASE: &str = "smart_mon";
/// Timestamps are always written in milliseconds.
pub const TIME_PRECISION: &str = "ms";


pub trait Sink {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        (**self).emit(snapshot)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        (**self).emit(snapshot)
    }
}


/// Prints a table with one line per attribute.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        writeln!(self.out, "ID\t\tONLINE-OFFLINE\t\tRAW-VALUE\t\tDESCRIPTION")?;

        for record in &snapshot.records {
            let collection = if record.online_collection { "ONLINE+OFFLINE" } else { "OFFLINE" };

            writeln!(
                self.out,
                "{}\t\t{:<14}\t\t{:<16}\t{}",
                record.id, collection, record.value.to_string(), record.description
            )?;
        }

        self.out.flush()
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointTags {
    pub id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointFields {
    pub value: u64,
    pub description: String,
}

/// One metrics-database point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Point {
    pub measurement: &'static str,
    pub tags: PointTags,
    pub fields: PointFields,
    pub time: i64,
}

impl Point {
    pub fn from_record(record: &AttributeRecord<'_>, timestamp_ms: i64) -> Self {
        Point {
            measurement: MEASUREMENT,
            tags: PointTags { id: record.id },
            fields: PointFields {
                value: record.value.metric(),
                description: record.description.to_owned(),
            },
            time: timestamp_ms,
        }
    }
}


/// Client side of a metrics database. Connection handling is up to the
/// implementation.
pub trait PointWriter {
    fn write_points(&mut self, database: &str, points: &[Point]) -> io::Result<()>;
}

impl<P: PointWriter + ?Sized> PointWriter for &mut P {
    fn write_points(&mut self, database: &str, points: &[Point]) -> io::Result<()> {
        (**self).write_points(database, points)
    }
}


#[derive(Serialize)]
struct WriteRequest<'a> {
    database: &'a str,
    precision: &'static str,
    points: &'a [Point],
}

/// Writes every batch as a single line of JSON.
#[derive(Debug)]
pub struct JsonPointWriter<W> {
    out: W,
}

impl<W: Write> JsonPointWriter<W> {
    pub fn new(out: W) -> Self {
        JsonPointWriter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PointWriter for JsonPointWriter<W> {
    fn write_points(&mut self, database: &str, points: &[Point]) -> io::Result<()> {
        let request = WriteRequest { database, precision: TIME_PRECISION, points };

        serde_json::to_writer(&mut self.out, &request)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}


/// Turns each snapshot into a batch of points for a named database.
#[derive(Debug)]
pub struct MetricsSink<P> {
    writer: P,
    database: String,
}

impl<P: PointWriter> MetricsSink<P> {
    pub fn new(writer: P, database: impl Into<String>) -> Self {
        MetricsSink { writer, database: database.into() }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn into_inner(self) -> P {
        self.writer
    }
}

impl<P: PointWriter> Sink for MetricsSink<P> {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let points: Vec<Point> = snapshot
            .records
            .iter()
            .map(|record| Point::from_record(record, snapshot.timestamp_ms))
            .collect();

        self.writer.write_points(&self.database, &points)?;
        info!(points = points.len(), database = %self.database, "sent points");

        Ok(())
    }
}
