//! Literal rendering and the matching literal reader.
//!
//! The reader understands every literal form the built-in dialects emit:
//!
//! ```text
//! NULL  CAST(NULL AS type)  TRUE  FALSE  42  -1.5e3
//! 'text'  N'text'  #2024-01-31#  TO_DATE('2024-01-31', 'YYYY-MM-DD')
//! X'0A0B'  0x0A0B  '\x0a0b'::bytea  BLOB(X'0A0B')
//! ```

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until, take_while},
    character::complete::{char, digit1, multispace0, multispace1, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use crate::ast::{ColumnType, Value};
use crate::error::{PolyError, PolyResult};
use crate::transpiler::traits::SqlDialect;

/// Render `value` as a literal of `ty` through the dialect's per-type hooks.
pub fn render_literal<D: SqlDialect + ?Sized>(
    dialect: &D,
    value: &Value,
    ty: ColumnType,
) -> PolyResult<String> {
    let ty = if ty == ColumnType::Unknown { value.column_type() } else { ty };
    let value = value.clone().coerce(ty)?;
    match &value {
        Value::Null => dialect.null_literal(ty),
        Value::Bool(b) => Ok(dialect.bool_literal(*b)),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(f) => {
            if f.is_finite() {
                Ok(f.to_string())
            } else {
                Err(PolyError::invalid("float literal", format!("{} has no SQL form", f)))
            }
        }
        Value::Money(d) => Ok(d.to_string()),
        Value::String(s) => Ok(dialect.string_literal(s)),
        Value::Date(d) => Ok(dialect.date_literal(*d)),
        Value::Time(t) => Ok(dialect.time_literal(*t)),
        Value::DateTime(dt) => Ok(dialect.datetime_literal(*dt)),
        Value::Guid(g) => Ok(dialect.guid_literal(g)),
        Value::Binary(b) => dialect.binary_literal(b),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Lit {
    Null,
    Bool(bool),
    Number(String),
    Text(String),
    Hex(String),
}

/// Read a literal back into a value of `ty` (`Unknown` infers the type).
pub fn parse_literal(text: &str, ty: ColumnType) -> PolyResult<Value> {
    let input = text.trim();
    let lit = match parse_lit(input) {
        Ok(("", lit)) => lit,
        Ok((remaining, _)) => {
            return Err(PolyError::literal(
                input.len() - remaining.len(),
                format!("unexpected trailing content: '{}'", remaining),
            ));
        }
        Err(e) => return Err(PolyError::literal(0, format!("not a literal: {:?}", e))),
    };
    lit_to_value(lit, ty)
}

fn lit_to_value(lit: Lit, ty: ColumnType) -> PolyResult<Value> {
    let raw = match lit {
        Lit::Null => return Ok(Value::Null),
        Lit::Bool(b) => Value::Bool(b),
        Lit::Number(s) if ty == ColumnType::Unknown => match s.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| PolyError::literal(0, format!("bad number '{}'", s)))?,
        },
        Lit::Number(s) | Lit::Text(s) => Value::String(s),
        Lit::Hex(h) => Value::Binary(decode_hex(&h)?),
    };
    raw.coerce(ty)
}

fn decode_hex(h: &str) -> PolyResult<Vec<u8>> {
    if let Some(pos) = h.find(|c: char| !c.is_ascii_hexdigit()) {
        return Err(PolyError::literal(pos, format!("bad hex digits in '{}'", h)));
    }
    if h.len() % 2 != 0 {
        return Err(PolyError::literal(0, format!("odd hex digit count in '{}'", h)));
    }
    h.as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or_else(|| PolyError::literal(i * 2, format!("bad hex digits in '{}'", h)))
        })
        .collect()
}

fn parse_lit(input: &str) -> IResult<&str, Lit> {
    alt((
        value(Lit::Null, tag_no_case("NULL")),
        parse_typed_null,
        value(Lit::Bool(true), tag_no_case("TRUE")),
        value(Lit::Bool(false), tag_no_case("FALSE")),
        parse_conversion,
        parse_blob_call,
        map(preceded(tag_no_case("0x"), take_while(|c: char| c.is_ascii_hexdigit())), |h: &str| {
            Lit::Hex(h.to_string())
        }),
        map(preceded(tag_no_case("X"), parse_quoted), Lit::Hex),
        parse_bytea,
        map(preceded(opt(tag_no_case("N")), parse_quoted), Lit::Text),
        map(delimited(char('#'), is_not("#"), char('#')), |s: &str| Lit::Text(s.to_string())),
        map(parse_number, |s: &str| Lit::Number(s.to_string())),
    ))(input)
}

/// `'it''s'` with doubled quotes.
fn parse_quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('\''),
            many0(alt((map(is_not("'"), String::from), value("'".to_string(), tag("''"))))),
            char('\''),
        ),
        |parts| parts.concat(),
    )(input)
}

fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(tuple((char('.'), digit1))),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// `CAST(NULL AS type)`
fn parse_typed_null(input: &str) -> IResult<&str, Lit> {
    let (input, _) = tuple((
        tag_no_case("CAST"),
        multispace0,
        char('('),
        multispace0,
        tag_no_case("NULL"),
        multispace1,
        tag_no_case("AS"),
        multispace1,
    ))(input)?;
    let (input, _) = terminated(take_until(")"), char(')'))(input)?;
    Ok((input, Lit::Null))
}

/// `TO_DATE('value', 'format')` and `TO_TIMESTAMP(...)`; the format is ignored.
fn parse_conversion(input: &str) -> IResult<&str, Lit> {
    let (input, (_, _, _, _, text, _, _, _, _, _, _)) = tuple((
        alt((tag_no_case("TO_TIMESTAMP"), tag_no_case("TO_DATE"))),
        multispace0,
        char('('),
        multispace0,
        parse_quoted,
        multispace0,
        char(','),
        multispace0,
        parse_quoted,
        multispace0,
        char(')'),
    ))(input)?;
    Ok((input, Lit::Text(text)))
}

/// `BLOB(X'..')`
fn parse_blob_call(input: &str) -> IResult<&str, Lit> {
    let (input, hex) = delimited(
        tuple((tag_no_case("BLOB"), multispace0, char('('), multispace0, tag_no_case("X"))),
        parse_quoted,
        tuple((multispace0, char(')'))),
    )(input)?;
    Ok((input, Lit::Hex(hex)))
}

/// `'\x0a0b'::bytea`
fn parse_bytea(input: &str) -> IResult<&str, Lit> {
    let (input, text) = terminated(parse_quoted, tag_no_case("::bytea"))(input)?;
    let hex = text.strip_prefix("\\x").unwrap_or(&text);
    Ok((input, Lit::Hex(hex.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_parse_quoted_escapes() {
        assert_eq!(
            parse_literal("'it''s'", ColumnType::String).unwrap(),
            Value::String("it's".to_string())
        );
        assert_eq!(parse_literal("N''", ColumnType::String).unwrap(), Value::String(String::new()));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_literal("42", ColumnType::Unknown).unwrap(), Value::Int(42));
        assert_eq!(parse_literal("-1.5", ColumnType::Unknown).unwrap(), Value::Float(-1.5));
        assert_eq!(parse_literal("1", ColumnType::Boolean).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_parse_dates() {
        let d = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(parse_literal("'20240131'", ColumnType::Date).unwrap(), d);
        assert_eq!(parse_literal("#2024-01-31#", ColumnType::Date).unwrap(), d);
        assert_eq!(parse_literal("#01/31/2024#", ColumnType::Date).unwrap(), d);
        assert_eq!(
            parse_literal("TO_DATE('2024-01-31', 'YYYY-MM-DD')", ColumnType::Date).unwrap(),
            d
        );
    }

    #[test]
    fn test_parse_blobs() {
        let b = Value::Binary(vec![0x0a, 0xff]);
        assert_eq!(parse_literal("X'0AFF'", ColumnType::Binary).unwrap(), b);
        assert_eq!(parse_literal("0x0aff", ColumnType::Binary).unwrap(), b);
        assert_eq!(parse_literal("'\\x0aff'::bytea", ColumnType::Binary).unwrap(), b);
        assert_eq!(parse_literal("BLOB(X'0AFF')", ColumnType::Binary).unwrap(), b);
        assert_eq!(parse_literal("0x", ColumnType::Binary).unwrap(), Value::Binary(vec![]));
    }

    #[test]
    fn test_malformed_hex_is_an_error() {
        let err = parse_literal("X'aé1'", ColumnType::Binary).unwrap_err();
        assert!(matches!(err, PolyError::LiteralParse { position: 1, .. }));
        assert!(parse_literal("X'0G'", ColumnType::Binary).is_err());
        let err = parse_literal("X'ABC'", ColumnType::Binary).unwrap_err();
        assert!(err.to_string().contains("odd hex digit count"));
    }

    #[test]
    fn test_parse_guid_forms() {
        let g = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        assert_eq!(
            parse_literal("'{6f9619ff-8b86-d011-b42d-00c04fc964ff}'", ColumnType::Guid).unwrap(),
            Value::Guid(g)
        );
        let le = crate::transpiler::traits::hex(&g.to_bytes_le());
        assert_eq!(parse_literal(&format!("X'{}'", le), ColumnType::Guid).unwrap(), Value::Guid(g));
    }

    #[test]
    fn test_parse_nulls() {
        assert_eq!(parse_literal("NULL", ColumnType::Integer).unwrap(), Value::Null);
        assert_eq!(parse_literal("CAST(NULL AS BIGINT)", ColumnType::Integer).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_trailing_content() {
        let err = parse_literal("'a' || 'b'", ColumnType::String).unwrap_err();
        assert!(matches!(err, PolyError::LiteralParse { position: 3, .. }));
    }
}
