//! Parser for `systemctl show --property=...` output.
//!
//! One `Key=Value` line per property, with a blank line between units:
//!
//! ```text
//! Id=nginx.service
//! ActiveState=active
//!
//! Id=smartd.service
//! ActiveState=failed
//! ```

use super::atoms::{ParseError, ParseErrorReason};
use std::collections::HashMap;

const SOURCE_ID: &str = "systemctl show";

/// Properties of a single unit, keyed by property name.
pub type PropertyBlock = HashMap<String, String>;

/// Parsed property blocks, in output order, plus lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBlocks {
    pub blocks: Vec<PropertyBlock>,
    pub issues: Vec<ParseError>,
}

/// Split `systemctl show` output into per-unit property blocks.
///
/// Lines without `=` and blocks without an `Id` are skipped and reported as
/// issues.
pub fn parse_property_blocks(output: &str) -> PropertyBlocks {
    let mut parsed = PropertyBlocks::default();
    let mut current = PropertyBlock::new();

    for (idx, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            finish_block(&mut parsed, &mut current, idx);
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                current.insert(key.to_string(), value.to_string());
            }
            None => parsed.issues.push(
                ParseError::new(SOURCE_ID, ParseErrorReason::MalformedRow, line).with_line(idx + 1),
            ),
        }
    }
    finish_block(&mut parsed, &mut current, output.lines().count());

    parsed
}

fn finish_block(parsed: &mut PropertyBlocks, current: &mut PropertyBlock, line_num: usize) {
    if current.is_empty() {
        return;
    }
    let block = std::mem::take(current);
    if block.contains_key("Id") {
        parsed.blocks.push(block);
    } else {
        parsed.issues.push(
            ParseError::new(
                SOURCE_ID,
                ParseErrorReason::MissingColumn("Id".to_string()),
                "",
            )
            .with_line(line_num),
        );
    }
}
