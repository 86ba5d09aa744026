//! HTML report writer.
//!
//! A report is a single page: every layer becomes a `<div>` of `<img>` tiles, one
//! line per row, followed by the remainder carried into the next layer. Tile
//! images are referenced as `img/<name>.png`; the core only supplies size and tone.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::errors::ClassicoError;
use crate::layout::{Catalog, Layout, Piece, PieceSize, RemainderVector, RowComposition, Tone};
use crate::service::LayerSink;

/// Background classes alternated between consecutive layers.
const LAYER_CLASSES: [&str; 2] = ["odd", "even"];

/// Image base name for a placed piece.
pub fn image_name(piece: Piece) -> &'static str {
    match (piece.size, piece.tone) {
        (PieceSize::Large, Tone::Primary) => "large",
        (PieceSize::Medium, Tone::Primary) => "medium",
        (PieceSize::Small, Tone::Primary) => "small",
        (PieceSize::Large, Tone::Alt) => "large2",
        (PieceSize::Medium, Tone::Alt) => "medium2",
        (PieceSize::Small, Tone::Alt) => "small2",
    }
}

/// Streams a report page to any writer.
pub struct ReportWriter<W: Write> {
    out: W,
    layers_written: usize,
}

impl ReportWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the page header.
    pub fn create(path: &Path, title: &str) -> Result<Self, ClassicoError> {
        let file = File::create(path)?;
        info!("Writing report to {}", path.display());
        Self::new(BufWriter::new(file), title)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(mut out: W, title: &str) -> Result<Self, ClassicoError> {
        write!(
            out,
            "<html><head><title>{}</title><style>\n\
             .odd {{ background-color: #EEFFEE; }}\n\
             .even {{ background-color: #FFEEEE; }}</style></head><body>",
            escape_html(title)
        )?;
        Ok(Self {
            out,
            layers_written: 0,
        })
    }

    /// Writes one block of rows. With a class, the remainder line follows the block.
    pub fn write_layout(
        &mut self,
        rows: &[RowComposition],
        class: Option<&str>,
        remainder: &RemainderVector,
    ) -> Result<(), ClassicoError> {
        write!(self.out, r#"<div class="{}">"#, class.unwrap_or(""))?;
        for row in rows {
            for piece in &row.pieces {
                write!(self.out, r#"<img src="img/{}.png">"#, image_name(*piece))?;
            }
            writeln!(self.out, "<br>")?;
        }
        writeln!(self.out, "</div>")?;

        if class.is_some() {
            write!(self.out, r#"<div style="margin: 10px 0 20px;">"#)?;
            for (piece, count) in remainder.slots().filter(|&(_, count)| count > 0) {
                write!(
                    self.out,
                    r#"<img src="img/{}.png"> = {count}&nbsp;&nbsp;&nbsp;"#,
                    image_name(piece)
                )?;
            }
            write!(self.out, "</div>")?;
        }
        Ok(())
    }

    /// Closes the page and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, ClassicoError> {
        writeln!(self.out, "</body></html>")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> LayerSink for ReportWriter<W> {
    fn accept(
        &mut self,
        layout: Layout,
        remainder: &RemainderVector,
    ) -> Result<(), ClassicoError> {
        let class = LAYER_CLASSES[self.layers_written % LAYER_CLASSES.len()];
        self.write_layout(&layout, Some(class), remainder)?;
        self.layers_written += 1;
        Ok(())
    }
}

/// Writes the catalog page ("Base matrix") listing every row composition.
pub fn write_catalog(catalog: &Catalog, path: &Path) -> Result<(), ClassicoError> {
    let mut writer = ReportWriter::create(path, "Base matrix")?;
    writer.write_layout(&catalog.rows, None, &RemainderVector::default())?;
    writer.finish()?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
