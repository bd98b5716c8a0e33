/*
 * This Source Code Form is subject to the terms of the Mozilla Public License,
 * v. 2.0. If a copy of the MPL was not distributed with this file, You can
 * obtain one at http://mozilla.org/MPL/2.0/.
 *
 *
 * Copyright (c) 2019-2021, Clemens Lutz <lutzcle@cml.li>
 * Author: Clemens Lutz <clemens.lutz@dfki.de>
 */

use crate::error::{ErrorKind, Result};
use csv::{Terminator, WriterBuilder};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::ser::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Output file, optionally gzip-compressed.
enum Sink {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl Sink {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        let sink = if path.extension().map_or(false, |ext| ext == "gz") {
            Sink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Sink::Plain(file)
        };
        Ok(sink)
    }

    fn finish(self) -> io::Result<()> {
        match self {
            Sink::Plain(mut file) => file.flush(),
            Sink::Gzip(encoder) => encoder.finish().and_then(|mut file| file.flush()),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(file) => file.write(buf),
            Sink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(file) => file.flush(),
            Sink::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Writes table tuples as delimited text, one tuple per line.
///
/// The file is truncated on creation and has no header. Paths with a `gz`
/// extension are gzip-compressed. If writing fails midway, the tuples
/// written so far remain in the file.
pub struct TableWriter {
    writer: csv::Writer<Sink>,
    records: usize,
}

impl TableWriter {
    pub fn create<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let sink = Sink::create(path.as_ref())?;
        let writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(sink);

        Ok(Self { writer, records: 0 })
    }

    pub fn write_records<I, S>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Serialize,
    {
        let before = self.records;
        for record in records {
            self.writer.serialize(record)?;
            self.records += 1;
        }
        Ok(self.records - before)
    }

    /// Number of tuples written so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flushes all buffered tuples and closes the file.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        let sink = self.writer.into_inner().map_err(|e| {
            ErrorKind::IoError(io::Error::new(e.error().kind(), e.error().to_string()))
        })?;
        sink.finish()?;
        Ok(self.records)
    }
}
