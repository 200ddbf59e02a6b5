use tracing::{debug, info};

/// Class fragment of the block holding the schedule pictures
pub const CONTAINER_MARKER: &str = "white-box padding-box";

/// The only images that make up the schedule of the second building
pub const ALLOWED_IMAGES: [&str; 4] = [
    "/upload/images/index--img(391).png",
    "/upload/images/index--img(389).png",
    "/upload/images/index--img(398).png",
    "/upload/images/index--img(399).png",
];

/// Elements whose content is raw text and must not be tokenized
const RAW_TEXT_TAGS: [&str; 4] = ["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    EndTag {
        name: String,
    },
}

impl Token {
    /// Attribute value with entities decoded; a repeated key yields its last value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::StartTag { attrs, .. } => attrs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Token::EndTag { .. } => None,
        }
    }
}

/// Forward-only tag tokenizer. Text, comments and doctypes are skipped.
/// Iteration ends at end of input or at the first unterminated construct.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    /// Position just past the next `needle` at or after `from`
    fn skip_past(&self, from: usize, needle: &str) -> Option<usize> {
        self.input
            .get(from..)?
            .find(needle)
            .map(|i| from + i + needle.len())
    }

    fn read_name(&self, mut i: usize) -> (String, usize) {
        let bytes = self.bytes();
        let start = i;
        while i < bytes.len() && !is_name_end(bytes[i]) {
            i += 1;
        }
        // Tag syntax is ASCII, so `start..i` is on char boundaries
        (self.input[start..i].to_ascii_lowercase(), i)
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        let bytes = self.bytes();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }

    /// Parse attributes up to the closing `>`; returns them with the position after it.
    fn read_attributes(&self, mut i: usize) -> Option<(Vec<(String, String)>, usize)> {
        let bytes = self.bytes();
        let mut attrs = Vec::new();

        loop {
            while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
                i += 1;
            }
            match bytes.get(i)? {
                b'>' => return Some((attrs, i + 1)),
                b'=' => {
                    // Stray '=' with no name, skip it
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let (key, after_key) = self.read_name(i);
            i = self.skip_whitespace(after_key);

            let mut value = "";
            if bytes.get(i) == Some(&b'=') {
                i = self.skip_whitespace(i + 1);
                match bytes.get(i)? {
                    quote @ (b'"' | b'\'') => {
                        let start = i + 1;
                        let len = self.input.get(start..)?.find(*quote as char)?;
                        value = &self.input[start..start + len];
                        i = start + len + 1;
                    }
                    _ => {
                        let start = i;
                        while i < bytes.len()
                            && !bytes[i].is_ascii_whitespace()
                            && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        value = &self.input[start..i];
                    }
                }
            }

            attrs.push((key, html_escape::decode_html_entities(value).into_owned()));
        }
    }

    /// Move to the `</tag` that closes a raw-text element, matching the name
    /// without regard to case.
    fn skip_raw_text(&mut self, tag: &str) -> Option<()> {
        let bytes = self.bytes();
        let mut from = self.pos;
        loop {
            let start = from + self.input.get(from..)?.find("</")?;
            let name = bytes.get(start + 2..start + 2 + tag.len());
            if name.is_some_and(|n| n.eq_ignore_ascii_case(tag.as_bytes())) {
                self.pos = start;
                return Some(());
            }
            from = start + 2;
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(tag) = self.raw_text.take() {
            self.skip_raw_text(&tag)?;
        }

        let bytes = self.bytes();
        loop {
            let start = self.pos + self.input.get(self.pos..)?.find('<')?;
            match bytes.get(start + 1)? {
                b'!' => {
                    self.pos = if self.input[start..].starts_with("<!--") {
                        self.skip_past(start + 4, "-->")?
                    } else {
                        self.skip_past(start, ">")?
                    };
                }
                b'?' => self.pos = self.skip_past(start, ">")?,
                b'/' => match bytes.get(start + 2)? {
                    c if c.is_ascii_alphabetic() => {
                        let (name, after) = self.read_name(start + 2);
                        self.pos = self.skip_past(after, ">")?;
                        return Some(Token::EndTag { name });
                    }
                    _ => self.pos = self.skip_past(start, ">")?,
                },
                c if c.is_ascii_alphabetic() => {
                    let (name, after) = self.read_name(start + 1);
                    let (attrs, end) = self.read_attributes(after)?;
                    self.pos = end;
                    if RAW_TEXT_TAGS.contains(&name.as_str()) {
                        self.raw_text = Some(name.clone());
                    }
                    return Some(Token::StartTag { name, attrs });
                }
                // A lone '<' is plain text
                _ => self.pos = start + 1,
            }
        }
    }
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>' || b == b'='
}

/// Finds allow-listed `<img>` sources inside the schedule container.
///
/// The container is tracked with a single flag: the first `</div>` after
/// entering clears it, so a `<div>` nested inside the container ends the
/// scan region early. Images after such a nested block are not reported.
#[derive(Debug, Clone)]
pub struct ImageScanner {
    container_tag: String,
    marker: String,
    allow_list: Vec<String>,
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new("div", CONTAINER_MARKER, &ALLOWED_IMAGES)
    }
}

impl ImageScanner {
    pub fn new(container_tag: &str, marker: &str, allow_list: &[&str]) -> Self {
        Self {
            container_tag: container_tag.to_string(),
            marker: marker.to_string(),
            allow_list: allow_list.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Allow-listed image references in document order, duplicates kept.
    pub fn scan(&self, html: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut in_container = false;

        for token in Tokenizer::new(html) {
            match &token {
                Token::StartTag { name, .. } if *name == self.container_tag => {
                    if token
                        .attr("class")
                        .is_some_and(|class| class.contains(&self.marker))
                    {
                        in_container = true;
                    }
                }
                Token::StartTag { name, .. } if name == "img" && in_container => {
                    if let Some(src) = token.attr("src") {
                        if self.allow_list.iter().any(|allowed| allowed == src) {
                            debug!("Matched schedule image: {}", src);
                            found.push(src.to_string());
                        }
                    }
                }
                Token::EndTag { name } if *name == self.container_tag && in_container => {
                    in_container = false;
                }
                _ => {}
            }
        }

        if found.is_empty() {
            info!("No schedule images found in page");
        } else {
            info!("Found {} schedule image(s)", found.len());
        }
        found
    }
}
