//! The document shape of a [`MatchState`] record.
//!
//! A record maps to a small element tree:
//!
//! ```text
//! JogoDaVelha
//! ├── id          X | O
//! ├── status      aguarde | jogue | ganhou | perdeu | empate | wo
//! ├── jogada      empty, or 0..=8
//! └── tabuleiro
//!     ├── p0      empty, X or O
//!     ├── ...
//!     └── p8
//! ```
//!
//! Every child appears exactly once. Order is free when reading; writing
//! always uses the order above. Leaves hold text only, and the two inner
//! elements hold elements only.
//!
//! This module is independent of the concrete markup library: codecs parse
//! text into an [`Element`] tree, then call [`to_state`]; and build a tree
//! with [`from_state`], then serialize it.

use velha_engine::{Board, Cell, Mark};

use crate::{MatchState, MatchStatus, ProtocolError};

pub const ROOT: &str = "JogoDaVelha";
pub const ID: &str = "id";
pub const STATUS: &str = "status";
pub const POSITION: &str = "jogada";
pub const BOARD: &str = "tabuleiro";

const FIELDS: [&str; 4] = [ID, STATUS, POSITION, BOARD];
const CELLS: [&str; Board::SIZE] = ["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8"];

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

/// A parsed element: its name, its (unescaped) text, and its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An element holding only text.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// An element holding only children.
    pub fn with_children(name: impl Into<String>, children: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children,
        }
    }

    /// The first child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Element, ProtocolError> {
        self.child(name)
            .ok_or_else(|| schema_error(format!("<{}> is missing <{name}>", self.name)))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks that `root` describes a record.
///
/// # Errors
/// [`ProtocolError::Schema`] naming the first violation found.
pub fn validate(root: &Element) -> Result<(), ProtocolError> {
    if root.name != ROOT {
        return Err(schema_error(format!(
            "root element is <{}>, expected <{ROOT}>",
            root.name
        )));
    }
    expect_no_text(root)?;
    expect_exactly(root, &FIELDS)?;

    for field in &root.children {
        if field.name == BOARD {
            expect_no_text(field)?;
            expect_exactly(field, &CELLS)?;
            for cell in &field.children {
                expect_leaf(cell)?;
                parse_cell(&cell.text)?;
            }
        } else {
            expect_leaf(field)?;
        }
    }

    parse_mark(&root.required(ID)?.text)?;
    parse_status(&root.required(STATUS)?.text)?;
    parse_position(&root.required(POSITION)?.text)?;
    Ok(())
}

fn expect_no_text(element: &Element) -> Result<(), ProtocolError> {
    if element.text.is_empty() {
        Ok(())
    } else {
        Err(schema_error(format!("<{}> must not contain text", element.name)))
    }
}

fn expect_leaf(element: &Element) -> Result<(), ProtocolError> {
    if element.children.is_empty() {
        Ok(())
    } else {
        Err(schema_error(format!(
            "<{}> must not contain elements",
            element.name
        )))
    }
}

/// Every child of `parent` is in `names`, and every name appears once.
fn expect_exactly(parent: &Element, names: &[&str]) -> Result<(), ProtocolError> {
    if let Some(unknown) = parent
        .children
        .iter()
        .find(|c| !names.contains(&c.name.as_str()))
    {
        return Err(schema_error(format!(
            "unexpected <{}> in <{}>",
            unknown.name, parent.name
        )));
    }
    for name in names {
        match parent.children.iter().filter(|c| c.name == *name).count() {
            0 => {
                return Err(schema_error(format!(
                    "<{}> is missing <{name}>",
                    parent.name
                )));
            }
            1 => {}
            _ => {
                return Err(schema_error(format!(
                    "<{name}> appears more than once in <{}>",
                    parent.name
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

fn parse_mark(text: &str) -> Result<Mark, ProtocolError> {
    Mark::from_str_ignore_case(text)
        .ok_or_else(|| schema_error(format!("<{ID}> must be X or O, got {text:?}")))
}

fn parse_status(text: &str) -> Result<MatchStatus, ProtocolError> {
    MatchStatus::from_token(text)
        .ok_or_else(|| schema_error(format!("unknown <{STATUS}> {text:?}")))
}

fn parse_position(text: &str) -> Result<Option<usize>, ProtocolError> {
    if text.is_empty() {
        return Ok(None);
    }
    let invalid = || schema_error(format!("<{POSITION}> must be empty or 0-8, got {text:?}"));
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match text.parse::<usize>() {
        Ok(pos) if pos < Board::SIZE => Ok(Some(pos)),
        _ => Err(invalid()),
    }
}

fn parse_cell(text: &str) -> Result<Cell, ProtocolError> {
    if text.is_empty() {
        return Ok(Cell::Empty);
    }
    Mark::from_str_ignore_case(text)
        .map(Cell::from)
        .ok_or_else(|| schema_error(format!("cell must be empty, X or O, got {text:?}")))
}

fn schema_error(message: String) -> ProtocolError {
    ProtocolError::Schema(message)
}

// ---------------------------------------------------------------------------
// Record <-> tree
// ---------------------------------------------------------------------------

/// Validates `root` and builds the record it describes.
///
/// # Errors
/// [`ProtocolError::Schema`] if validation fails. No partial record is ever
/// returned.
pub fn to_state(root: &Element) -> Result<MatchState, ProtocolError> {
    validate(root)?;

    let board_element = root.required(BOARD)?;
    let mut cells = [Cell::Empty; Board::SIZE];
    for (cell, name) in cells.iter_mut().zip(CELLS) {
        *cell = parse_cell(&board_element.required(name)?.text)?;
    }

    Ok(MatchState {
        id: parse_mark(&root.required(ID)?.text)?,
        status: parse_status(&root.required(STATUS)?.text)?,
        position: parse_position(&root.required(POSITION)?.text)?,
        board: Board::from_cells(cells),
    })
}

/// Builds the tree for `state`, children in canonical order.
///
/// The tree is not validated here; codecs validate before writing.
pub fn from_state(state: &MatchState) -> Element {
    let cells = state
        .board
        .cells()
        .iter()
        .zip(CELLS)
        .map(|(cell, name)| match cell.mark() {
            Some(mark) => Element::leaf(name, mark.as_char().to_string()),
            None => Element::new(name),
        })
        .collect();

    Element::with_children(
        ROOT,
        vec![
            Element::leaf(ID, state.id.as_char().to_string()),
            Element::leaf(STATUS, state.status.token()),
            Element::leaf(
                POSITION,
                state.position.map(|p| p.to_string()).unwrap_or_default(),
            ),
            Element::with_children(BOARD, cells),
        ],
    )
}
