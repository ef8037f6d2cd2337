use std::fmt::{self, Display, Formatter};

use super::symtab::SymbolTable;
use super::types::LineNumber;

/// Most code bytes shown on one listing row.
const BYTES_PER_ROW: usize = 4;

/// What the listing shows for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingRecord {
    /// The location counter at the start of the statement, if the
    /// statement has an address worth showing.
    pub(crate) pc: Option<u16>,
    pub(crate) bytes: Vec<u8>,
    /// A value to show instead of code bytes (for `EQU`).
    pub(crate) value: Option<u16>,
    /// Not assembled because of conditional assembly.
    pub(crate) suppressed: bool,
    pub(crate) line: LineNumber,
    pub(crate) text: String,
}

fn code_cells(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X} ")).collect()
}

impl Display for ListingRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (first, rest) = self.bytes.split_at(self.bytes.len().min(BYTES_PER_ROW));
        let address = match self.pc {
            Some(pc) => format!("{pc:04X} "),
            None => String::new(),
        };
        let code = match self.value {
            Some(value) if first.is_empty() => format!("={value:04X}"),
            _ => code_cells(first),
        };
        let marker = if self.suppressed { "S" } else { "" };
        let row = format!(
            "{address:5}{code:12}{marker:3}{line:>5} {text}",
            line = self.line,
            text = self.text
        );
        f.write_str(row.trim_end())?;
        for chunk in rest.chunks(BYTES_PER_ROW) {
            let continuation = format!("     {}", code_cells(chunk));
            write!(f, "\n{}", continuation.trim_end())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListingLine {
    Statement(ListingRecord),
    PageEject { subtitle: Option<String> },
    Blank(u16),
    Rule { ch: char, width: u16 },
    Subtitle(String),
}

impl Display for ListingLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ListingLine::Statement(record) => writeln!(f, "{record}"),
            ListingLine::PageEject { subtitle } => {
                f.write_str("\x0c")?;
                match subtitle {
                    Some(text) => writeln!(f, "{text}"),
                    None => Ok(()),
                }
            }
            ListingLine::Blank(count) => {
                for _ in 0..*count {
                    writeln!(f)?;
                }
                Ok(())
            }
            ListingLine::Rule { ch, width } => {
                let rule: String = std::iter::repeat(*ch).take(usize::from(*width)).collect();
                writeln!(f, "{rule}")
            }
            ListingLine::Subtitle(text) => writeln!(f, "{text}"),
        }
    }
}

/// The assembly listing, built up during the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Listing {
    output: Vec<ListingLine>,
    /// Cleared by `LST OFF`.
    enabled: bool,
    /// Cleared by `LSTDO OFF`.
    show_suppressed: bool,
    rule_char: char,
    subtitle: Option<String>,
}

impl Default for Listing {
    fn default() -> Listing {
        Listing {
            output: Vec::new(),
            enabled: true,
            show_suppressed: true,
            rule_char: '-',
            subtitle: None,
        }
    }
}

impl Listing {
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_show_suppressed(&mut self, show: bool) {
        self.show_suppressed = show;
    }

    fn push_line(&mut self, line: ListingLine) {
        if self.enabled {
            self.output.push(line);
        }
    }

    pub(crate) fn record(&mut self, record: ListingRecord) {
        if record.suppressed && !self.show_suppressed {
            return;
        }
        self.push_line(ListingLine::Statement(record));
    }

    pub(crate) fn page(&mut self) {
        self.push_line(ListingLine::PageEject {
            subtitle: self.subtitle.clone(),
        });
    }

    pub(crate) fn skip(&mut self, count: u16) {
        self.push_line(ListingLine::Blank(count));
    }

    pub(crate) fn rule(&mut self, width: u16) {
        self.push_line(ListingLine::Rule {
            ch: self.rule_char,
            width,
        });
    }

    pub(crate) fn set_rule_char(&mut self, ch: char) {
        self.rule_char = ch;
    }

    pub(crate) fn subtitle(&mut self, text: String) {
        self.subtitle = Some(text.clone());
        self.push_line(ListingLine::Subtitle(text));
    }

    pub(crate) fn render(&self, symbols: &SymbolTable) -> String {
        ListingWithSymbols {
            listing: self,
            symbols,
        }
        .to_string()
    }
}

struct ListingWithSymbols<'a> {
    listing: &'a Listing,
    symbols: &'a SymbolTable,
}

impl Display for ListingWithSymbols<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for line in &self.listing.output {
            write!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "Symbol Table:")?;
        write!(f, "{}", self.symbols)
    }
}
