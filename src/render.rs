//! HTML rendering for the entry form and the compiled table.
//!
//! Pure projection of headers and accumulated rows into display markup;
//! no business logic beyond pass-through. Cell text is HTML-escaped.

use crate::fields::{FieldSet, HEADERS};

/// Entry page with the paper input form.
/// The form posts parallel `link`/`text` lists to `/compile`.
const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Paper Citation Compiler</title>
<style>
body { font-family: sans-serif; margin: 2em; }
textarea { width: 100%; height: 6em; }
input[type=url], input[type=text] { width: 100%; }
.paper-row { margin-bottom: 1.5em; }
.actions form { display: inline-block; margin-right: 1em; }
</style>
</head>
<body>
<h1>Paper Citation Compiler</h1>
<p>Paste a paper link and its details below. Add more rows as needed, then compile.</p>
<form method="post" action="/compile" id="paper-form">
<div id="papers">
<div class="paper-row">
<label>Link: <input type="url" name="link" placeholder="https://..."></label>
<label>Text: <textarea name="text" placeholder="Paper details..."></textarea></label>
</div>
</div>
<button type="button" onclick="addRow()">Add row</button>
<button type="submit">Compile</button>
</form>
<div class="actions">
<form method="post" action="/process"><button type="submit">Download Excel</button></form>
<form method="post" action="/delete_data"><button type="submit">Clear data</button></form>
</div>
<script>
function addRow() {
  var row = document.querySelector('.paper-row').cloneNode(true);
  row.querySelectorAll('input, textarea').forEach(function (el) { el.value = ''; });
  document.getElementById('papers').appendChild(row);
}
</script>
</body>
</html>
"#;

/// Compiled-table page. Placeholders: {header_cells}, {body_rows}
const COMPILED_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Compiled Papers</title>
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #999; padding: 0.4em; text-align: left; vertical-align: top; }
th { background: #eee; }
.actions { margin-top: 1em; }
.actions form, .actions a { display: inline-block; margin-right: 1em; }
</style>
</head>
<body>
<h1>Compiled Papers</h1>
<table>
<thead><tr>{header_cells}</tr></thead>
<tbody>
{body_rows}</tbody>
</table>
<div class="actions">
<a href="/">Add more papers</a>
<form method="post" action="/process"><button type="submit">Download Excel</button></form>
<form method="post" action="/delete_data"><button type="submit">Clear data</button></form>
</div>
</body>
</html>
"#;

/// Render the entry form page
pub fn index_page() -> String {
    INDEX_TEMPLATE.to_string()
}

/// Render the compiled table page for the accumulated rows
pub fn compiled_page(rows: &[FieldSet]) -> String {
    let header_cells: String = HEADERS
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape::encode_text(h)))
        .collect();

    let body_rows: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .values()
                .iter()
                .map(|v| format!("<td>{}</td>", html_escape::encode_text(v)))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();

    COMPILED_TEMPLATE
        .replace("{header_cells}", &header_cells)
        .replace("{body_rows}", &body_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldSet, FIELD_COUNT};

    #[test]
    fn test_index_page_has_form() {
        let page = index_page();
        assert!(page.contains(r#"action="/compile""#));
        assert!(page.contains(r#"name="link""#));
        assert!(page.contains(r#"name="text""#));
    }

    #[test]
    fn test_compiled_page_headers_and_rows() {
        let values: [String; FIELD_COUNT] = std::array::from_fn(|i| format!("v{}", i + 1));
        let page = compiled_page(&[FieldSet::from(values)]);
        assert!(page.contains("<th>LINKS OF THE PAPER</th>"));
        assert!(page.contains("<th>FUTURE WORK</th>"));
        assert!(page.contains("<td>v1</td>"));
        assert!(page.contains("<td>v14</td>"));
    }

    #[test]
    fn test_compiled_page_escapes_cells() {
        let mut values: [String; FIELD_COUNT] = Default::default();
        values[1] = "<script>alert(1)</script>".to_string();
        let page = compiled_page(&[FieldSet::from(values)]);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_compiled_page_empty_table() {
        let page = compiled_page(&[]);
        assert!(page.contains("<thead>"));
        assert!(!page.contains("<td>"));
    }
}
