//! Tag scanner. Cuts comment blocks out of source text and (tag, content)
//! pairs out of each block.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_C_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*\n?(.+?)\n?\s*\*/").unwrap());

static RE_C_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ ]?").unwrap());

static RE_PY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"""\n?(.+?)\n?\s*""""#).unwrap());

static RE_RUBY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)=begin\n?(.+?)\n?\s*=end").unwrap());

static RE_HASH_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)#\*\*\n?(.+?)\n?\s*#\*").unwrap());

static RE_HASH_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#[ ]?").unwrap());

// Tag line: optional blanks/asterisks, then @name, then the rest of the line
static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t*]*@([A-Za-z][A-Za-z0-9_-]*)(.*)$").unwrap());

// -- Comment syntax -----------------------------------------------------------

/// How documentation blocks are delimited in a source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSyntax {
    /// `/** ... */` with optional leading `*` on each line.
    CStyle,
    /// `""" ... """` docstrings.
    Python,
    /// `=begin ... =end`.
    Ruby,
    /// `#** ... #*` with leading `#` on each line.
    Hash,
}

impl CommentSyntax {
    pub fn for_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("py") => Self::Python,
            Some("rb") => Self::Ruby,
            Some("pl" | "pm" | "sh" | "bash") => Self::Hash,
            _ => Self::CStyle,
        }
    }

    fn block_regex(self) -> &'static Regex {
        match self {
            Self::CStyle => &RE_C_BLOCK,
            Self::Python => &RE_PY_BLOCK,
            Self::Ruby => &RE_RUBY_BLOCK,
            Self::Hash => &RE_HASH_BLOCK,
        }
    }

    fn inline_regex(self) -> &'static Regex {
        match self {
            Self::CStyle => &RE_C_INLINE,
            Self::Python | Self::Ruby | Self::Hash => &RE_HASH_INLINE,
        }
    }
}

/// One `@tag content` element inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name, used for lookup.
    pub name: String,
    /// Tag name as written.
    pub source_name: String,
    /// Text after the tag, continuing over following non-tag lines.
    pub content: String,
    /// The element's lines as written, for diagnostics.
    pub source: String,
}

// -- Public API ---------------------------------------------------------------

/// Split source text into comment blocks with comment markers stripped.
pub fn find_blocks(src: &str, syntax: CommentSyntax) -> Vec<String> {
    let src = src.replace("\r\n", "\n");
    syntax
        .block_regex()
        .captures_iter(&src)
        .map(|caps| {
            syntax
                .inline_regex()
                .replace_all(&caps[1], "")
                .into_owned()
        })
        .collect()
}

/// Split a block into ordered elements. Text before the first tag is ignored.
pub fn find_elements(block: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();

    for line in block.lines() {
        if let Some(caps) = RE_TAG_LINE.captures(line) {
            let source_name = caps[1].to_string();
            elements.push(Element {
                name: source_name.to_ascii_lowercase(),
                source_name,
                content: caps[2].trim_start().to_string(),
                source: line.trim_start().to_string(),
            });
        } else if let Some(current) = elements.last_mut() {
            current.content.push('\n');
            current.content.push_str(line);
            current.source.push('\n');
            current.source.push_str(line);
        }
    }

    for element in &mut elements {
        let trimmed = element.content.trim_end().len();
        element.content.truncate(trimmed);
        let trimmed = element.source.trim_end().len();
        element.source.truncate(trimmed);
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_style_blocks() {
        let src = "/**\n * @api {get} /notes Get notes\n * @apiName GetNotes\n */\nfunction a() {}\n/** plain */\n";
        let blocks = find_blocks(src, CommentSyntax::CStyle);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "@api {get} /notes Get notes\n@apiName GetNotes");
    }

    #[test]
    fn crlf_is_normalized() {
        let src = "/**\r\n * @apiName A\r\n */";
        let blocks = find_blocks(src, CommentSyntax::CStyle);
        assert_eq!(blocks, ["@apiName A"]);
    }

    #[test]
    fn python_and_hash_blocks() {
        let py = "\"\"\"\n@api {get} /x X\n\"\"\"\n";
        assert_eq!(find_blocks(py, CommentSyntax::Python), ["@api {get} /x X"]);

        let pl = "#**\n# @api {get} /y Y\n#*\n";
        assert_eq!(find_blocks(pl, CommentSyntax::Hash), ["@api {get} /y Y"]);
    }

    #[test]
    fn syntax_from_extension() {
        assert_eq!(CommentSyntax::for_path("app/models.py"), CommentSyntax::Python);
        assert_eq!(CommentSyntax::for_path("lib/api.RB"), CommentSyntax::Ruby);
        assert_eq!(CommentSyntax::for_path("src/main.rs"), CommentSyntax::CStyle);
    }

    #[test]
    fn elements_with_continuation() {
        let block = "@api {post} /notes Create\n@apiDescription First line\n  second line\n@apiPrivate";
        let elements = find_elements(block);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].name, "api");
        assert_eq!(elements[0].content, "{post} /notes Create");
        assert_eq!(elements[1].source_name, "apiDescription");
        assert_eq!(elements[1].content, "First line\n  second line");
        assert_eq!(elements[2].name, "apiprivate");
        assert_eq!(elements[2].content, "");
    }

    #[test]
    fn tag_names_are_lowercased_and_attached_braces_split() {
        let elements = find_elements("@APIPARAM{String} id\n@api{get} /x");
        assert_eq!(elements[0].name, "apiparam");
        assert_eq!(elements[0].content, "{String} id");
        assert_eq!(elements[1].content, "{get} /x");
    }

    #[test]
    fn leading_free_text_is_ignored() {
        let elements = find_elements("Some prose\nmore prose\n@apiName X");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, "X");
    }
}
