/// Characters a spreadsheet treats as the start of a formula.
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Escapes one CSV field. Fields that a spreadsheet would evaluate get a
/// leading `'`; fields with a delimiter, quote, or line break are quoted.
/// `None` and empty values become an empty field.
pub fn escape_field(value: Option<&str>) -> String {
    let v = match value {
        None | Some("") => return String::new(),
        Some(v) => v,
    };

    let neutralized = if v.starts_with(FORMULA_PREFIXES) {
        format!("'{}", v)
    } else {
        v.to_string()
    };

    if neutralized.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", neutralized.replace('"', "\"\""))
    } else {
        neutralized
    }
}

/// Appends one record, terminated with CRLF.
pub fn write_row<'a, I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let row = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}
