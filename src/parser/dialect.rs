//! Surface syntaxes and host-language embeddings.

use std::fmt;

/// The surface syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Brace-based syntax (`.scss`).
    #[default]
    Scss,
    /// Indentation-based syntax (`.sass`).
    Sass,
    /// Plain CSS, parsed with the brace grammar.
    Css,
    /// Host documents embedding `<style lang="scss|sass">` blocks.
    Vue,
    Svelte,
    Astro,
    Html,
}

impl Dialect {
    /// Infer the dialect from an editor language id.
    pub fn from_language_id(id: &str) -> Option<Self> {
        match id {
            "scss" => Some(Self::Scss),
            "sass" | "sass-indented" => Some(Self::Sass),
            "css" => Some(Self::Css),
            "vue" => Some(Self::Vue),
            "svelte" => Some(Self::Svelte),
            "astro" => Some(Self::Astro),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Infer the dialect from a path or URI extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        Self::from_language_id(&ext.to_ascii_lowercase())
    }

    /// Whether documents of this dialect embed styles in a host language.
    pub fn is_host(self) -> bool {
        matches!(self, Self::Vue | Self::Svelte | Self::Astro | Self::Html)
    }

    /// File extensions the link resolver tries for extension-less targets.
    pub const STYLESHEET_EXTENSIONS: [&'static str; 2] = ["scss", "sass"];
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scss => "scss",
            Self::Sass => "sass",
            Self::Css => "css",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::Astro => "astro",
            Self::Html => "html",
        };
        f.write_str(name)
    }
}

/// Extract the stylesheet text from a host document.
///
/// Every byte outside `<style lang="scss">` / `<style lang="sass">` blocks is
/// replaced by a space (newlines are kept), so offsets into the returned text
/// are offsets into the host document. Returns the blanked text and the
/// dialect of the embedded blocks.
pub fn extract_embedded(text: &str) -> (String, Dialect) {
    let lower = text.to_ascii_lowercase();
    let mut keep: Vec<(usize, usize)> = Vec::new();
    let mut dialect = Dialect::Scss;
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("<style") {
        let tag_start = cursor + found;
        let Some(tag_len) = lower[tag_start..].find('>') else {
            break;
        };
        let tag = &lower[tag_start..tag_start + tag_len];
        let body_start = tag_start + tag_len + 1;
        let body_end = lower[body_start..]
            .find("</style")
            .map(|i| body_start + i)
            .unwrap_or(text.len());

        match style_lang(tag) {
            Some(Dialect::Sass) => {
                dialect = Dialect::Sass;
                keep.push((body_start, body_end));
            }
            Some(Dialect::Scss) => keep.push((body_start, body_end)),
            _ => {}
        }
        cursor = body_end;
    }

    let mut out = String::with_capacity(text.len());
    let mut ranges = keep.iter().peekable();
    for (idx, c) in text.char_indices() {
        while ranges.peek().is_some_and(|(_, end)| idx >= *end) {
            ranges.next();
        }
        let inside = ranges
            .peek()
            .is_some_and(|(start, end)| idx >= *start && idx < *end);
        if inside || c == '\n' || c == '\r' {
            out.push(c);
        } else {
            // keep byte offsets stable for multi-byte characters
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    }
    (out, dialect)
}

fn style_lang(tag: &str) -> Option<Dialect> {
    for key in ["lang=", "type="] {
        if let Some(pos) = tag.find(key) {
            let value = tag[pos + key.len()..]
                .trim_start_matches(['"', '\''])
                .split(['"', '\'', ' ', '>'])
                .next()
                .unwrap_or_default();
            return match value.trim_start_matches("text/") {
                "scss" => Some(Dialect::Scss),
                "sass" => Some(Dialect::Sass),
                _ => None,
            };
        }
    }
    None
}
