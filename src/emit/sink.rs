//! Output sinks for emitted facts.

use std::fmt::Write as _;
use std::io::{self, Write};
use tracing::debug;

use crate::models::{Fact, Term};

/// Receiver of the ordered fact stream.
pub trait FactSink {
    fn accept(&mut self, fact: Fact) -> io::Result<()>;

    /// Called once after the last fact
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FactSink for Vec<Fact> {
    fn accept(&mut self, fact: Fact) -> io::Result<()> {
        self.push(fact);
        Ok(())
    }
}

/// Buffered N-Triples serializer
pub struct NTriplesWriter<W: Write> {
    writer: W,
    batch_size: usize,
    buffer: Vec<Fact>,
    total_written: usize,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(writer: W, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            writer,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            total_written: 0,
        }
    }

    /// Add a fact to the buffer, writing the batch out if it is full
    pub fn add(&mut self, fact: Fact) -> io::Result<()> {
        self.buffer.push(fact);
        if self.buffer.len() >= self.batch_size {
            self.write_buffer()?;
        }
        Ok(())
    }

    fn write_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let facts = std::mem::take(&mut self.buffer);
        debug!("Writing {} triples", facts.len());

        let mut out = String::with_capacity(facts.len() * 128);
        for fact in &facts {
            out.push_str(&format_triple(fact));
            out.push('\n');
        }
        self.writer.write_all(out.as_bytes())?;

        self.total_written += facts.len();
        self.buffer = Vec::with_capacity(self.batch_size);
        Ok(())
    }

    /// Write everything out and hand back the writer with the triple count
    pub fn finish(mut self) -> io::Result<(W, usize)> {
        FactSink::flush(&mut self)?;
        Ok((self.writer, self.total_written))
    }

    pub fn total_written(&self) -> usize {
        self.total_written
    }
}

impl<W: Write> FactSink for NTriplesWriter<W> {
    fn accept(&mut self, fact: Fact) -> io::Result<()> {
        self.add(fact)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_buffer()?;
        self.writer.flush()
    }
}

/// One N-Triples line, without the newline.
pub fn format_triple(fact: &Fact) -> String {
    format!(
        "{} {} {} .",
        format_iri(&fact.subject),
        format_iri(&fact.predicate),
        format_term(&fact.object)
    )
}

fn format_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format_iri(iri),
        Term::Literal {
            value,
            lang,
            datatype,
        } => {
            let mut out = format!("\"{}\"", escape_literal(value));
            if let Some(lang) = lang {
                out.push('@');
                out.push_str(lang);
            } else if let Some(datatype) = datatype {
                out.push_str("^^");
                out.push_str(&format_iri(datatype));
            }
            out
        }
    }
}

fn format_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len() + 2);
    out.push('<');
    for ch in iri.chars() {
        match ch {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                let _ = write!(out, "\\u{:04X}", ch as u32);
            }
            c if c <= ' ' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('>');
    out
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
