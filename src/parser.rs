//! Statement parser for go.mod manifests
//!
//! Consumes lexer atoms through a small state machine. `module`, `require`,
//! `replace` and `exclude` may wrap several records in a parenthesized block,
//! one record per line. Any other keyword is kept verbatim as a custom
//! directive. A `//` comment swallows atoms up to the end of its line; the
//! newline itself is then handled by the current state as usual.

use crate::error::{ManifestError, Position};
use crate::lexer::{Atom, AtomKind, Lexer};
use crate::model::{Manifest, ModuleRef, Statement};

/// Directives that carry module records and support `( ... )` blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Module,
    Require,
    Replace,
    Exclude,
}

impl Directive {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "module" => Some(Directive::Module),
            "require" => Some(Directive::Require),
            "replace" => Some(Directive::Replace),
            "exclude" => Some(Directive::Exclude),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Directive::Module => "module",
            Directive::Require => "require",
            Directive::Replace => "replace",
            Directive::Exclude => "exclude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<'a> {
    /// Between statements, looking for a keyword
    Scan,
    Grouped(Directive),
    Custom(&'a str),
}

/// Parser for go.mod manifest text
#[derive(Debug, Default)]
pub struct ManifestParser;

impl ManifestParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the whole manifest. Any malformed statement fails the entire parse.
    pub fn parse(&self, content: &str) -> Result<Manifest, ManifestError> {
        let mut machine = StateMachine::new();

        let result = Lexer::new(content)
            .try_for_each(|atom| atom.and_then(|atom| machine.feed(atom)))
            .and_then(|()| machine.finish(content));

        match result {
            Ok(()) => {
                let manifest = Manifest::from_statements(machine.statements);
                tracing::debug!(
                    "Parsed manifest: {} statements from {} bytes",
                    manifest.len(),
                    content.len()
                );
                Ok(manifest)
            }
            Err(e) => {
                tracing::debug!("Manifest parse failed: {e}");
                Err(e)
            }
        }
    }
}

struct StateMachine<'a> {
    state: State<'a>,
    bracket: bool,
    in_comment: bool,
    tokens: Vec<&'a str>,
    /// Start of the record currently being buffered
    record_start: Position,
    statements: Vec<Statement>,
}

impl<'a> StateMachine<'a> {
    fn new() -> Self {
        Self {
            state: State::Scan,
            bracket: false,
            in_comment: false,
            tokens: Vec::with_capacity(8),
            record_start: Position::start(),
            statements: Vec::with_capacity(32),
        }
    }

    fn feed(&mut self, atom: Atom<'a>) -> Result<(), ManifestError> {
        if self.in_comment {
            if !atom.is_newline() {
                return Ok(());
            }
            self.in_comment = false;
        }

        match self.state {
            State::Scan => self.scan(atom),
            State::Grouped(directive) => self.grouped(directive, atom),
            State::Custom(keyword) => self.custom(keyword, atom),
        }
    }

    fn scan(&mut self, atom: Atom<'a>) -> Result<(), ManifestError> {
        match atom.kind {
            AtomKind::Whitespace => {}
            AtomKind::Comment => self.in_comment = true,
            AtomKind::Word | AtomKind::Quoted => {
                let keyword = atom.value();
                self.tokens.clear();
                self.bracket = false;
                self.record_start = atom.position;
                self.state = match Directive::from_keyword(keyword) {
                    Some(directive) => State::Grouped(directive),
                    None => State::Custom(keyword),
                };
            }
            AtomKind::OpenParen | AtomKind::CloseParen | AtomKind::Arrow => {
                return Err(ManifestError::structural(
                    atom.position,
                    format!("unexpected '{}' before any directive", atom.text),
                ));
            }
        }
        Ok(())
    }

    fn grouped(&mut self, directive: Directive, atom: Atom<'a>) -> Result<(), ManifestError> {
        match atom.kind {
            AtomKind::OpenParen => {
                if self.bracket {
                    return Err(ManifestError::structural(
                        atom.position,
                        format!("duplicated opening bracket in {}", directive.keyword()),
                    ));
                }
                if !self.tokens.is_empty() {
                    return Err(ManifestError::structural(
                        atom.position,
                        format!(
                            "unexpected tokens {:?} before bracket in {}",
                            self.tokens,
                            directive.keyword()
                        ),
                    ));
                }
                self.bracket = true;
            }
            AtomKind::CloseParen => {
                if !self.bracket {
                    return Err(ManifestError::structural(
                        atom.position,
                        format!("unexpected closing bracket in {}", directive.keyword()),
                    ));
                }
                self.bracket = false;
                if !self.tokens.is_empty() {
                    self.flush_record(directive)?;
                }
                self.state = State::Scan;
            }
            AtomKind::Comment => self.in_comment = true,
            AtomKind::Whitespace if atom.is_newline() => self.end_of_line(directive)?,
            AtomKind::Whitespace => {}
            AtomKind::Word | AtomKind::Quoted | AtomKind::Arrow => {
                if self.tokens.is_empty() {
                    self.record_start = atom.position;
                }
                self.tokens.push(atom.value());
            }
        }
        Ok(())
    }

    fn end_of_line(&mut self, directive: Directive) -> Result<(), ManifestError> {
        if self.bracket {
            if !self.tokens.is_empty() {
                self.flush_record(directive)?;
            }
        } else {
            self.flush_record(directive)?;
            self.state = State::Scan;
        }
        Ok(())
    }

    fn custom(&mut self, keyword: &'a str, atom: Atom<'a>) -> Result<(), ManifestError> {
        match atom.kind {
            AtomKind::OpenParen => {
                if self.bracket {
                    return Err(ManifestError::structural(
                        atom.position,
                        format!("duplicated opening bracket in {keyword}"),
                    ));
                }
                self.bracket = true;
                self.tokens.push(atom.text);
            }
            AtomKind::CloseParen => {
                if !self.bracket {
                    return Err(ManifestError::structural(
                        atom.position,
                        format!("unexpected closing bracket in {keyword}"),
                    ));
                }
                self.bracket = false;
                self.tokens.push(atom.text);
                self.flush_custom(keyword);
            }
            AtomKind::Comment => self.in_comment = true,
            AtomKind::Whitespace => {
                if atom.is_newline() && !self.bracket {
                    self.flush_custom(keyword);
                }
            }
            // verbatim: quoted tokens keep their quotes
            AtomKind::Word | AtomKind::Quoted | AtomKind::Arrow => self.tokens.push(atom.text),
        }
        Ok(())
    }

    /// End of input flushes whatever record is still buffered
    fn finish(&mut self, content: &str) -> Result<(), ManifestError> {
        if self.bracket {
            tracing::warn!(
                "Unclosed bracket at end of manifest ({} bytes), keeping buffered records",
                content.len()
            );
        }
        match self.state {
            State::Scan => {}
            // a bare keyword at end of input adds nothing
            State::Grouped(directive) => {
                if !self.tokens.is_empty() {
                    self.flush_record(directive)?;
                }
            }
            State::Custom(keyword) => self.flush_custom(keyword),
        }
        Ok(())
    }

    fn flush_custom(&mut self, keyword: &'a str) {
        let tokens: Vec<String> = self.tokens.drain(..).map(str::to_string).collect();
        tracing::trace!("Custom directive {keyword} with {} tokens", tokens.len());
        self.statements.push(Statement::Custom {
            keyword: keyword.to_string(),
            tokens,
        });
        self.state = State::Scan;
    }

    fn flush_record(&mut self, directive: Directive) -> Result<(), ManifestError> {
        let position = self.record_start;
        let tokens = std::mem::take(&mut self.tokens);

        let statement = match directive {
            Directive::Module => match tokens.as_slice() {
                [name] => Statement::Module(
                    ModuleRef::try_new(*name)
                        .map_err(|_| ManifestError::record_shape(position, "module", &tokens))?,
                ),
                _ => return Err(ManifestError::record_shape(position, "module", &tokens)),
            },
            Directive::Require => Statement::Require(module_ref(&tokens, "require", position)?),
            Directive::Exclude => Statement::Exclude(module_ref(&tokens, "exclude", position)?),
            Directive::Replace => {
                let (from, to) = replace_refs(&tokens, position)?;
                Statement::Replace { from, to }
            }
        };

        tracing::trace!("Flushed record: {statement}");
        self.statements.push(statement);
        Ok(())
    }
}

/// A record of exactly one (name) or two (name, version) tokens
fn module_ref(
    tokens: &[&str],
    directive: &'static str,
    position: Position,
) -> Result<ModuleRef, ManifestError> {
    let module = match tokens {
        [name] => ModuleRef::try_new(*name),
        [name, version] => ModuleRef::try_with_version(*name, *version),
        _ => return Err(ManifestError::record_shape(position, directive, tokens)),
    };
    module.map_err(|_| ManifestError::record_shape(position, directive, tokens))
}

/// Split a `replace` record on `=>` into its source and target
fn replace_refs(
    tokens: &[&str],
    position: Position,
) -> Result<(ModuleRef, ModuleRef), ManifestError> {
    let mut groups = tokens.split(|t| *t == "=>");
    let from = groups.next().unwrap_or_default();
    let Some(to) = groups.next() else {
        return Err(ManifestError::replace_target_missing(position, tokens));
    };
    if groups.next().is_some() {
        return Err(ManifestError::record_shape(position, "replace", tokens));
    }
    if to.is_empty() {
        return Err(ManifestError::replace_target_missing(position, tokens));
    }

    let from = module_ref(from, "replace", position)
        .map_err(|_| ManifestError::record_shape(position, "replace", tokens))?;
    let to = module_ref(to, "replace", position)
        .map_err(|_| ManifestError::record_shape(position, "replace", tokens))?;
    Ok((from, to))
}
