use crate::registry::UserRecord;

/// Telegram rejects messages above 4096 UTF-16 code units; keep a margin for markup
pub const MAX_CHUNK_LEN: usize = 4000;

const RECORD_SEPARATOR: &str = "\n---\n\n";
const MISSING: &str = "нет";

/// Render one registry row for an HTML-formatted message
pub fn format_user(user: &UserRecord) -> String {
    let handle = user.handle.as_deref().filter(|h| !h.is_empty()).unwrap_or(MISSING);
    let name = if user.display_name.is_empty() {
        MISSING
    } else {
        user.display_name.as_str()
    };

    format!(
        "ID: <code>{}</code>\nUsername: @{}\nName: {}\nCreated: {}",
        user.id,
        html_escape::encode_text(handle),
        html_escape::encode_text(name),
        user.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Packs records into messages of at most `limit` UTF-16 code units
pub struct Paginator {
    limit: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(MAX_CHUNK_LEN)
    }
}

impl Paginator {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// `header` opens the first chunk. Each record is followed by a separator;
    /// a record that does not fit starts a new chunk. With no records the
    /// single chunk is `header` followed by `empty_notice`.
    pub fn paginate(&self, header: &str, records: &[String], empty_notice: &str) -> Vec<String> {
        if records.is_empty() {
            return vec![format!("{}{}", header, empty_notice)];
        }

        let mut chunks = Vec::new();
        let mut current = header.to_string();
        let mut current_len = text_len(&current);

        for record in records {
            let piece = format!("{}{}", record, RECORD_SEPARATOR);
            let piece_len = text_len(&piece);

            if current_len + piece_len > self.limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }

        chunks.push(current);
        chunks
    }
}

/// Length as Telegram counts it
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}
