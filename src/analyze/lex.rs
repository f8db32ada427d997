use std::{ops::Range, rc::Rc};

use crate::{
    analyze::{Error, ErrorKind, lex::token::Token},
    config::Config,
};

pub mod token;

/// One tokenized source line: `[label:] mnemonic [op1 [op2 [op3]]]`.
///
/// The mnemonic is kept as raw text; deciding whether it names a real instruction is the
/// encoder's job.
#[derive(Debug, Clone)]
pub struct Line {
    /// 0-based position in the source, which is also the word index in the program image.
    pub index: usize,
    pub label: Option<Token>,
    pub mnemonic: Token,
    pub operands: Vec<Token>,
    pub range: Range<usize>,
    source_name: Rc<String>,
}

impl Line {
    pub fn operand(&self, n: usize) -> Option<&Token> {
        self.operands.get(n)
    }

    /// Mnemonic and operands separated by single spaces.
    pub fn assembly(&self) -> String {
        std::iter::once(&self.mnemonic)
            .chain(&self.operands)
            .map(Token::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn error(&self, kind: ErrorKind) -> Error {
        self.error_at(self.range.clone(), kind)
    }

    pub fn error_at(&self, range: Range<usize>, kind: ErrorKind) -> Error {
        Error::new(
            self.index,
            kind,
            (self.source_name.clone(), range),
            self.assembly(),
        )
    }
}

pub struct Lexer<'c> {
    source_name: Rc<String>,
    config: &'c Config,
}

impl<'c> Lexer<'c> {
    pub fn new(source_name: Rc<String>, config: &'c Config) -> Self {
        Self {
            source_name,
            config,
        }
    }

    /// Splits `source` into lines and tokenizes each. Stops at the first malformed line.
    pub fn lex(&self, source: &str) -> Result<Vec<Line>, Error> {
        let mut lines = Vec::new();
        let mut offset = 0;

        for (index, raw) in source.split_inclusive('\n').enumerate() {
            let text = raw.trim_end_matches(['\n', '\r']);
            let range = offset..(offset + text.len());
            offset += raw.len();

            if index >= self.config.max_program_len {
                return Err(self.error(
                    index,
                    range,
                    text,
                    ErrorKind::ProgramTooLong(self.config.max_program_len),
                ));
            }

            lines.push(self.lex_line(index, text, range)?);
        }

        Ok(lines)
    }

    fn lex_line(&self, index: usize, text: &str, range: Range<usize>) -> Result<Line, Error> {
        let start = range.start;

        if text.chars().count() > self.config.max_line_len {
            return Err(self.error(
                index,
                range,
                text,
                ErrorKind::parse(format!(
                    "line is longer than {} characters",
                    self.config.max_line_len
                )),
            ));
        }

        let (label, rest, rest_offset) = match text.find(':') {
            Some(colon) => {
                let name = text[..colon].trim();
                let name_start = start + text[..colon].find(name).unwrap_or(0);
                let name_range = name_start..(name_start + name.len());

                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(self.error(
                        index,
                        start..(start + colon + 1),
                        text,
                        ErrorKind::parse("label must be a single non-empty word"),
                    ));
                }

                let label = Token::new(name, name_range);
                (Some(label), &text[(colon + 1)..], start + colon + 1)
            }
            None => (None, text, start),
        };

        let mut tokens = split_tokens(rest, rest_offset).into_iter();

        let Some(mnemonic) = tokens.next() else {
            return Err(self.error(index, range, text, ErrorKind::parse("missing mnemonic")));
        };

        let operands: Vec<Token> = tokens.collect();
        if operands.len() > 3 {
            let extra = operands[3].range.start..range.end;
            return Err(self.error(
                index,
                extra,
                text,
                ErrorKind::parse(format!("expected at most 3 operands, found {}", operands.len())),
            ));
        }

        for token in label.iter().chain([&mnemonic]).chain(&operands) {
            if token.text.chars().count() > self.config.max_token_len {
                return Err(self.error(
                    index,
                    token.range.clone(),
                    text,
                    ErrorKind::parse(format!(
                        "`{}` is longer than {} characters",
                        token.text, self.config.max_token_len
                    )),
                ));
            }
        }

        Ok(Line {
            index,
            label,
            mnemonic,
            operands,
            range,
            source_name: self.source_name.clone(),
        })
    }

    fn error(&self, index: usize, range: Range<usize>, text: &str, kind: ErrorKind) -> Error {
        Error::new(index, kind, (self.source_name.clone(), range), text.trim())
    }
}

/// Splits on whitespace and commas, keeping byte ranges relative to the whole source.
fn split_tokens(text: &str, offset: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        let separator = c.is_whitespace() || c == ',';
        match (separator, start) {
            (true, Some(s)) => {
                tokens.push(Token::new(&text[s..i], (offset + s)..(offset + i)));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }

    if let Some(s) = start {
        tokens.push(Token::new(&text[s..], (offset + s)..(offset + text.len())));
    }

    tokens
}
