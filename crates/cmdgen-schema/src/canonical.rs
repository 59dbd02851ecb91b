//! Reader for previously emitted command tables.
//!
//! Accepted lines:
//! - `COMMAND(<ident>, "<name>", NULL, <arity>, <method>, <pos>)`
//! - `COMMAND(<ident>, "<name>", "<subcommand>", <arity>, <method>, <pos>)`
//! - blank lines, `/* ... */` comment lines and `#` preprocessor lines
//!
//! The identifier column is not trusted; it is re-derived on emission.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, char as pchar, digit1, multispace0},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value},
    sequence::{delimited, pair},
    IResult,
};

use crate::error::SchemaError;
use crate::model::{FirstKey, FirstKeyMethod, ResolvedCommand};

fn is_ignorable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || (line.starts_with("/*") && line.ends_with("*/"))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parses one `COMMAND(...)` declaration.
pub fn parse_declaration(line: &str) -> Result<ResolvedCommand, String> {
    fn comma(input: &str) -> IResult<&str, ()> {
        let (input, _) = multispace0(input)?;
        let (input, _) = pchar(',')(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, ()))
    }

    fn quoted(input: &str) -> IResult<&str, &str> {
        delimited(
            pchar('"'),
            take_while1(|c: char| c != '"'),
            pchar('"'),
        )(input)
    }

    fn subcommand(input: &str) -> IResult<&str, Option<&str>> {
        alt((value(None, tag("NULL")), map(quoted, Some)))(input)
    }

    fn arity(input: &str) -> IResult<&str, i64> {
        map_res(recognize(pair(opt(pchar('-')), digit1)), |s: &str| {
            s.parse::<i64>()
        })(input)
    }

    fn method(input: &str) -> IResult<&str, FirstKeyMethod> {
        map_opt(alpha1, FirstKeyMethod::from_token)(input)
    }

    fn position(input: &str) -> IResult<&str, u32> {
        map_res(digit1, |s: &str| s.parse::<u32>())(input)
    }

    fn parser(input: &str) -> IResult<&str, ResolvedCommand> {
        let (input, _) = tag("COMMAND")(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = pchar('(')(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _ident) = take_while1(is_ident_char)(input)?;
        let (input, _) = comma(input)?;
        let (input, name) = quoted(input)?;
        let (input, _) = comma(input)?;
        let (input, subcommand) = subcommand(input)?;
        let (input, _) = comma(input)?;
        let (input, arity) = arity(input)?;
        let (input, _) = comma(input)?;
        let (input, method) = method(input)?;
        let (input, _) = comma(input)?;
        let (input, position) = position(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = pchar(')')(input)?;
        let (input, _) = multispace0(input)?;
        Ok((
            input,
            ResolvedCommand {
                display_name: name.to_string(),
                subcommand: subcommand.map(str::to_string),
                arity,
                first_key: FirstKey { method, position },
            },
        ))
    }

    all_consuming(parser)(line.trim())
        .map(|(_, v)| v)
        .map_err(|_| {
            "expected `COMMAND(<ident>, \"<name>\", NULL|\"<subcommand>\", <arity>, <method>, <pos>)`"
                .to_string()
        })
}

/// Reads a whole canonical table, in file order.
///
/// The first line that is neither a declaration nor ignorable aborts the read
/// with its 1-based line number.
pub fn parse_command_table(
    source_name: &str,
    text: &str,
) -> Result<Vec<ResolvedCommand>, SchemaError> {
    let mut commands = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if is_ignorable(line) {
            continue;
        }
        let command = parse_declaration(line).map_err(|message| SchemaError::Declaration {
            source_name: source_name.to_string(),
            line: i + 1,
            text: line.to_string(),
            message,
        })?;
        commands.push(command);
    }
    Ok(commands)
}
