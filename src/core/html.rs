// src/core/html.rs
//
// Minimal HTML tokenizer: start tags with attributes, end tags, text runs.
// Enough for the two page shapes the chart serves; not a spec-grade parser.
// Tag and attribute names are lowercased at parse time so consumers can
// compare them directly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(Tag),
    End(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    // Set after <script>/<style>: their content is opaque text up to the
    // matching end tag, '<' inside does not open a tag.
    raw_end: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Tokenizer { src, pos: 0, raw_end: None }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn raw_text(&mut self, end_tag: &str) -> Token {
        let rest = self.rest();
        let lower = rest.to_ascii_lowercase();
        match lower.find(end_tag) {
            Some(i) => {
                let text = &rest[..i];
                self.pos += i;
                if text.is_empty() {
                    // Nothing between open and close; emit the end tag now.
                    self.raw_end = None;
                    self.pos += rest[i..].find('>').map(|g| g + 1).unwrap_or(rest.len() - i);
                    Token::End(end_tag[2..].to_string())
                } else {
                    Token::Text(decode_entities(text))
                }
            }
            None => {
                self.raw_end = None;
                self.pos = self.src.len();
                Token::Text(decode_entities(rest))
            }
        }
    }

    fn end_tag(&mut self) -> Token {
        // self.pos is at "</"
        let rest = self.rest();
        let name: String = rest[2..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        match rest.find('>') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.src.len(),
        }
        Token::End(name.to_ascii_lowercase())
    }

    fn start_tag(&mut self) -> Token {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let name = self.src[name_start..i].to_ascii_lowercase();

        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    i += 1;
                }
                _ => {
                    let key_start = i;
                    while i < bytes.len()
                        && !bytes[i].is_ascii_whitespace()
                        && bytes[i] != b'='
                        && bytes[i] != b'>'
                        && bytes[i] != b'/'
                    {
                        i += 1;
                    }
                    let key = self.src[key_start..i].to_ascii_lowercase();
                    let mut val = String::new();
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if i < bytes.len() && bytes[i] == b'=' {
                        i += 1;
                        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                            i += 1;
                        }
                        if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                            let quote = bytes[i];
                            i += 1;
                            let val_start = i;
                            while i < bytes.len() && bytes[i] != quote {
                                i += 1;
                            }
                            val = decode_entities(&self.src[val_start..i]);
                            if i < bytes.len() {
                                i += 1; // closing quote
                            }
                        } else {
                            let val_start = i;
                            while i < bytes.len()
                                && !bytes[i].is_ascii_whitespace()
                                && bytes[i] != b'>'
                            {
                                i += 1;
                            }
                            val = decode_entities(&self.src[val_start..i]);
                        }
                    }
                    if !key.is_empty() {
                        attrs.push((key, val));
                    }
                }
            }
        }
        self.pos = i;

        if !self_closing {
            match name.as_str() {
                "script" => self.raw_end = Some("</script"),
                "style" => self.raw_end = Some("</style"),
                _ => {}
            }
        }
        Token::Start(Tag { name, attrs })
    }

    fn text(&mut self) -> Option<Token> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        // Stop at the next '<' that actually opens markup.
        let mut end = rest.len();
        let mut search = 0;
        while let Some(i) = rest[search..].find('<').map(|i| i + search) {
            let next = bytes.get(i + 1);
            if matches!(next, Some(c) if c.is_ascii_alphabetic())
                || matches!(next, Some(b'/') | Some(b'!') | Some(b'?'))
            {
                end = i;
                break;
            }
            search = i + 1;
        }
        self.pos += end.max(1);
        if end == 0 {
            // Lone '<' at the start of the run; swallow it.
            return None;
        }
        Some(Token::Text(decode_entities(&rest[..end])))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.pos >= self.src.len() {
                return None;
            }
            if let Some(end_tag) = self.raw_end {
                return Some(self.raw_text(end_tag));
            }

            let rest = self.rest();
            if !rest.starts_with('<') {
                match self.text() {
                    Some(t) => return Some(t),
                    None => continue,
                }
            }

            if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(i) => self.pos += i + 3,
                    None => self.pos = self.src.len(),
                }
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                match rest.find('>') {
                    Some(i) => self.pos += i + 1,
                    None => self.pos = self.src.len(),
                }
                continue;
            }
            if rest.starts_with("</") {
                return Some(self.end_tag());
            }
            if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Some(self.start_tag());
            }

            // '<' followed by junk: plain text.
            match self.text() {
                Some(t) => return Some(t),
                None => continue,
            }
        }
    }
}

/// Decode the handful of entities the chart actually uses, plus numeric refs.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let end = match rest.find(';') {
            Some(e) if e <= 10 => e,
            _ => {
                out.push('&');
                rest = &rest[1..];
                continue;
            }
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix('#')
                .and_then(|n| {
                    if let Some(hx) = n.strip_prefix('x').or_else(|| n.strip_prefix('X')) {
                        u32::from_str_radix(hx, 16).ok()
                    } else {
                        n.parse::<u32>().ok()
                    }
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
